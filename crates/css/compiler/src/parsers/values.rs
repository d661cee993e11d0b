//! Shared value conversion.
//! Spec: <https://www.w3.org/TR/css-values-4/>
//!
//! Lengths, numbers, angles, times and colors are lowered to literal
//! descriptors when they can be computed now. Anything that depends on
//! runtime state (`var()`, viewport and font-relative units, platform
//! functions) is lowered to a [`StyleFunction`] tree instead.

use crate::options::CompileOptions;
use core::mem;
use crate::warnings::{Warning, WarningKind};
use css_color::{ColorContext, parse_color};
use css_syntax::{ComponentValue, split_commas, to_css, trim};
use style_ir::calc;
use style_ir::{CURRENT_COLOR_VARIABLE, StyleDescriptor, format_number, round};

/// CSS color functions that can be re-evaluated at runtime once their
/// arguments are known.
const COLOR_FUNCTIONS: &[&str] = &[
    "rgb", "rgba", "hsl", "hsla", "hwb", "lab", "lch", "oklab", "oklch", "color",
];

#[inline]
pub(crate) fn percentage(percent: f64) -> StyleDescriptor {
    StyleDescriptor::String(format!("{}%", format_number(round(percent))))
}

#[inline]
pub(crate) fn unit_function(name: &str, value: f64) -> StyleDescriptor {
    StyleDescriptor::function(name, vec![StyleDescriptor::Number(round(value))])
}

/// `var(--name)` with an optional fallback; `name` is given without `--`.
pub(crate) fn var_function(name: &str, fallback: Option<StyleDescriptor>) -> StyleDescriptor {
    let mut args = vec![StyleDescriptor::string(name)];
    args.extend(fallback);
    StyleDescriptor::function("var", args)
}

/// The value when it is a single non-whitespace component.
#[inline]
pub(crate) fn single(values: &[ComponentValue]) -> Option<&ComponentValue> {
    match trim(values) {
        [value] => Some(value),
        _ => None,
    }
}

/// Whitespace-separated components, ignoring whitespace tokens.
pub(crate) fn significant(values: &[ComponentValue]) -> Vec<&ComponentValue> {
    values.iter().filter(|value| !value.is_whitespace()).collect()
}

/// `kebab-case` to `camelCase`.
pub(crate) fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for character in name.chars() {
        if character == '-' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(character.to_uppercase());
            upper = false;
        } else {
            out.push(character);
        }
    }
    out
}

/// Converts the component values of one declaration and collects the
/// warnings raised on the way.
pub(crate) struct Converter<'opts> {
    options: &'opts CompileOptions,
    property: &'opts str,
    color_context: ColorContext,
    warnings: Vec<Warning>,
}

impl<'opts> Converter<'opts> {
    pub(crate) fn new(options: &'opts CompileOptions, property: &'opts str, dark: bool) -> Self {
        Self {
            options,
            property,
            color_context: ColorContext {
                dark,
                saw_light_dark: false,
            },
            warnings: Vec::new(),
        }
    }

    pub(crate) fn warn(&mut self, kind: WarningKind, detail: impl Into<String>) {
        self.warnings.push(Warning {
            kind,
            property: self.property.to_owned(),
            detail: detail.into(),
        });
    }

    #[inline]
    pub(crate) fn warn_value(&mut self, values: &[ComponentValue]) {
        self.warn(WarningKind::Value, to_css(trim(values)));
    }

    #[inline]
    pub(crate) fn warn_token(&mut self, value: &ComponentValue) {
        self.warn(WarningKind::Value, value.to_string());
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<Warning> {
        mem::take(&mut self.warnings)
    }

    #[inline]
    pub(crate) const fn saw_light_dark(&self) -> bool {
        self.color_context.saw_light_dark
    }

    /// `<length-percentage>`, plain numbers included.
    /// Spec: <https://www.w3.org/TR/css-values-4/#lengths>
    pub(crate) fn length(&mut self, value: &ComponentValue) -> Option<StyleDescriptor> {
        match value {
            ComponentValue::Number(number) => Some(StyleDescriptor::Number(round(*number))),
            ComponentValue::Percentage(percent) => Some(percentage(*percent)),
            ComponentValue::Dimension { value, unit } => self.dimension(*value, unit),
            ComponentValue::Function { name, args } => self.function(name, args),
            _ => {
                self.warn_token(value);
                None
            }
        }
    }

    /// A length that may also be the keyword `auto`.
    pub(crate) fn length_or_auto(&mut self, value: &ComponentValue) -> Option<StyleDescriptor> {
        if value.is_ident("auto") {
            return Some(StyleDescriptor::string("auto"));
        }
        self.length(value)
    }

    /// Length units. Absolute units become pixels, `rem` is inlined when
    /// configured, font and viewport relative units stay runtime functions.
    fn dimension(&mut self, value: f64, unit: &str) -> Option<StyleDescriptor> {
        let pixels = |scale: f64| Some(StyleDescriptor::Number(round(value * scale)));
        match unit {
            "px" => pixels(1.0),
            "in" => pixels(96.0),
            "cm" => pixels(96.0 / 2.54),
            "mm" => pixels(96.0 / 25.4),
            "q" => pixels(96.0 / 101.6),
            "pt" => pixels(96.0 / 72.0),
            "pc" => pixels(16.0),
            "rem" => match self.options.inline_rem {
                Some(multiplier) => pixels(multiplier),
                None => Some(unit_function("rem", value)),
            },
            "em" | "vw" | "vh" => Some(unit_function(unit, value)),
            _ => {
                self.warn(WarningKind::Value, format!("{}{unit}", format_number(value)));
                None
            }
        }
    }

    /// `<number>`.
    pub(crate) fn number(&mut self, value: &ComponentValue) -> Option<StyleDescriptor> {
        match value {
            ComponentValue::Number(number) => Some(StyleDescriptor::Number(round(*number))),
            ComponentValue::Function { name, args } => self.function(name, args),
            _ => {
                self.warn_token(value);
                None
            }
        }
    }

    /// `<number> | <percentage>` as a plain number (`50%` is `0.5`).
    pub(crate) fn number_or_percentage(&mut self, value: &ComponentValue) -> Option<StyleDescriptor> {
        match value {
            ComponentValue::Percentage(percent) => Some(StyleDescriptor::Number(round(percent / 100.0))),
            other => self.number(other),
        }
    }

    /// `<angle>` as a string in `deg`, or `rad` when written in radians.
    /// Spec: <https://www.w3.org/TR/css-values-4/#angles>
    pub(crate) fn angle(&mut self, value: &ComponentValue) -> Option<StyleDescriptor> {
        let degrees = |amount: f64| Some(StyleDescriptor::String(format!("{}deg", format_number(round(amount)))));
        match value {
            ComponentValue::Dimension { value, unit } => match unit.as_str() {
                "deg" => degrees(*value),
                "grad" => degrees(value * 0.9),
                "turn" => degrees(value * 360.0),
                "rad" => Some(StyleDescriptor::String(format!("{}rad", format_number(round(*value))))),
                _ => {
                    self.warn_token(&ComponentValue::Dimension {
                        value: *value,
                        unit: unit.clone(),
                    });
                    None
                }
            },
            ComponentValue::Number(number) if *number == 0.0 => degrees(0.0),
            ComponentValue::Function { name, args } => self.function(name, args),
            _ => {
                self.warn_token(value);
                None
            }
        }
    }

    /// `<time>` in milliseconds.
    /// Spec: <https://www.w3.org/TR/css-values-4/#time>
    pub(crate) fn time(&mut self, value: &ComponentValue) -> Option<StyleDescriptor> {
        match value {
            ComponentValue::Dimension { value, unit } if unit == "s" => {
                Some(StyleDescriptor::Number(round(value * 1000.0)))
            }
            ComponentValue::Dimension { value, unit } if unit == "ms" => Some(StyleDescriptor::Number(round(*value))),
            ComponentValue::Number(number) if *number == 0.0 => Some(StyleDescriptor::Number(0.0)),
            ComponentValue::Function { name, args } => self.function(name, args),
            _ => {
                self.warn_token(value);
                None
            }
        }
    }

    /// An identifier from `allowed`, compared case-insensitively.
    pub(crate) fn keyword(&mut self, value: &ComponentValue, allowed: &[&str]) -> Option<StyleDescriptor> {
        if let ComponentValue::Function { name, args } = value
            && name == "var"
        {
            return self.function(name, args);
        }
        match value.ident() {
            Some(ident) => {
                let lowered = ident.to_ascii_lowercase();
                if allowed.contains(&lowered.as_str()) {
                    return Some(StyleDescriptor::String(lowered));
                }
                self.warn_token(value);
                None
            }
            None => {
                self.warn_token(value);
                None
            }
        }
    }

    /// `<color>`.
    /// Spec: <https://www.w3.org/TR/css-color-4/#typedef-color>
    pub(crate) fn color(&mut self, value: &ComponentValue) -> Option<StyleDescriptor> {
        if let Some(color) = parse_color(value, &mut self.color_context) {
            return Some(StyleDescriptor::String(color.to_css(self.options.color_format())));
        }
        match value {
            ComponentValue::Ident(name) if name.eq_ignore_ascii_case("currentcolor") => {
                Some(var_function(CURRENT_COLOR_VARIABLE, None))
            }
            ComponentValue::Function { name, args } => self.color_function(name, args),
            _ => {
                self.warn_token(value);
                None
            }
        }
    }

    /// Color functions that could not be resolved statically.
    fn color_function(&mut self, name: &str, args: &[ComponentValue]) -> Option<StyleDescriptor> {
        match name {
            "light-dark" => {
                self.color_context.saw_light_dark = true;
                let branches = split_commas(args);
                let [light, dark] = branches.as_slice() else {
                    self.warn(WarningKind::Value, format!("light-dark({})", to_css(args)));
                    return None;
                };
                let chosen = if self.color_context.dark { dark } else { light };
                match single(chosen) {
                    Some(value) => self.color(value),
                    None => {
                        self.warn_value(chosen);
                        None
                    }
                }
            }
            "color-mix" => self.color_mix(args),
            _ if COLOR_FUNCTIONS.contains(&name) => {
                let tokens = self.tokens(args)?;
                Some(StyleDescriptor::function(name, tokens))
            }
            _ => self.function(name, args),
        }
    }

    /// `color-mix(in <space>, <color> <p>?, <color> <p>?)` with runtime operands,
    /// lowered to `[space, [color, p?], [color, p?]]`.
    fn color_mix(&mut self, args: &[ComponentValue]) -> Option<StyleDescriptor> {
        let parts = split_commas(args);
        let [method, first, second] = parts.as_slice() else {
            self.warn(WarningKind::Value, format!("color-mix({})", to_css(args)));
            return None;
        };
        let method = significant(method);
        let space = match method.as_slice() {
            [keyword, space, ..] if keyword.is_ident("in") => space.ident()?.to_ascii_lowercase(),
            _ => {
                self.warn(WarningKind::Value, format!("color-mix({})", to_css(args)));
                return None;
            }
        };
        let mut operands = vec![StyleDescriptor::String(space)];
        for operand in [first, second] {
            let mut items = Vec::new();
            for value in significant(operand) {
                match value {
                    ComponentValue::Percentage(percent) => items.push(percentage(*percent)),
                    other => items.push(self.color(other)?),
                }
            }
            operands.push(StyleDescriptor::Array(items));
        }
        Some(StyleDescriptor::function("color-mix", operands))
    }

    /// Functions understood by the runtime resolver.
    pub(crate) fn function(&mut self, name: &str, args: &[ComponentValue]) -> Option<StyleDescriptor> {
        match name {
            "var" => self.var(args),
            "calc" => self.calc(args),
            "min" | "max" => self.min_max(name, args),
            "clamp" => self.clamp(args),
            "hairlinewidth" => Some(StyleDescriptor::function("hairlineWidth", Vec::new())),
            "pixelratio" | "fontscale" => {
                let runtime_name = if name == "pixelratio" { "pixelRatio" } else { "fontScale" };
                let args = match single(args) {
                    Some(value) => vec![self.number(value)?],
                    None if trim(args).is_empty() => Vec::new(),
                    None => {
                        self.warn_value(args);
                        return None;
                    }
                };
                Some(StyleDescriptor::function(runtime_name, args))
            }
            "roundtonearestpixel" => {
                let Some(value) = single(args) else {
                    self.warn_value(args);
                    return None;
                };
                let value = self.length(value)?;
                Some(StyleDescriptor::function("roundToNearestPixel", vec![value]))
            }
            "platformcolor" => {
                let mut names = Vec::new();
                for part in split_commas(args) {
                    match single(part) {
                        Some(ComponentValue::Ident(color) | ComponentValue::String(color)) => {
                            names.push(StyleDescriptor::string(color.as_str()));
                        }
                        _ => {
                            self.warn_value(part);
                            return None;
                        }
                    }
                }
                Some(StyleDescriptor::function("platformColor", names))
            }
            _ if COLOR_FUNCTIONS.contains(&name) || name == "color-mix" || name == "light-dark" => {
                self.color(&ComponentValue::Function {
                    name: name.to_owned(),
                    args: args.to_vec(),
                })
            }
            _ => {
                self.warn(WarningKind::Function, name);
                None
            }
        }
    }

    /// `var(--name, fallback?)`.
    /// Spec: <https://www.w3.org/TR/css-variables-1/#using-variables>
    fn var(&mut self, args: &[ComponentValue]) -> Option<StyleDescriptor> {
        let comma = args.iter().position(|value| matches!(value, ComponentValue::Comma));
        let (head, fallback) = match comma {
            Some(index) => (args.get(..index)?, args.get(index + 1..)),
            None => (args, None),
        };
        let Some(name) = single(head)
            .and_then(ComponentValue::ident)
            .and_then(|name| name.strip_prefix("--"))
        else {
            self.warn(WarningKind::Value, format!("var({})", to_css(args)));
            return None;
        };
        let fallback = match fallback {
            Some(fallback) if !trim(fallback).is_empty() => Some(self.generic(fallback)?),
            _ => None,
        };
        Some(var_function(name, fallback))
    }

    /// `calc()`: statically evaluated when every operand is known.
    /// Spec: <https://www.w3.org/TR/css-values-4/#calc-func>
    fn calc(&mut self, args: &[ComponentValue]) -> Option<StyleDescriptor> {
        let mut tokens = Vec::new();
        self.calc_tokens(args, &mut tokens)?;
        if tokens.iter().any(StyleDescriptor::is_dynamic) {
            return Some(StyleDescriptor::function("calc", tokens));
        }
        let value = calc::evaluate(&tokens);
        if value.is_none() {
            self.warn(WarningKind::Value, format!("calc({})", to_css(args)));
        }
        value.map(calc::CalcValue::into_descriptor)
    }

    fn calc_tokens(&mut self, args: &[ComponentValue], out: &mut Vec<StyleDescriptor>) -> Option<()> {
        for value in args {
            match value {
                ComponentValue::Whitespace => {}
                ComponentValue::Delim(operator @ ('+' | '-' | '*' | '/')) => {
                    out.push(StyleDescriptor::String(operator.to_string()));
                }
                ComponentValue::ParenBlock(inner) => {
                    out.push(StyleDescriptor::string("("));
                    self.calc_tokens(inner, out)?;
                    out.push(StyleDescriptor::string(")"));
                }
                ComponentValue::Function { name, args: inner } if name == "calc" => {
                    out.push(StyleDescriptor::string("("));
                    self.calc_tokens(inner, out)?;
                    out.push(StyleDescriptor::string(")"));
                }
                other => out.push(self.length(other)?),
            }
        }
        Some(())
    }

    /// One comma-separated operand of `min()`/`max()`/`clamp()`.
    fn operand(&mut self, values: &[ComponentValue]) -> Option<StyleDescriptor> {
        match single(values) {
            Some(value) => self.length(value),
            None => self.calc(values),
        }
    }

    fn operands(&mut self, args: &[ComponentValue]) -> Option<Vec<StyleDescriptor>> {
        split_commas(args)
            .into_iter()
            .map(|part| self.operand(part))
            .collect()
    }

    /// Spec: <https://www.w3.org/TR/css-values-4/#comp-func>
    fn min_max(&mut self, name: &str, args: &[ComponentValue]) -> Option<StyleDescriptor> {
        let operands = self.operands(args)?;
        if operands.iter().any(StyleDescriptor::is_dynamic) {
            return Some(StyleDescriptor::function(name, operands));
        }
        let pick: fn(f64, f64) -> f64 = if name == "min" { f64::min } else { f64::max };
        let value = calc::select(&operands, pick);
        if value.is_none() {
            self.warn(WarningKind::Value, format!("{name}({})", to_css(args)));
        }
        value.map(calc::CalcValue::into_descriptor)
    }

    fn clamp(&mut self, args: &[ComponentValue]) -> Option<StyleDescriptor> {
        let operands = self.operands(args)?;
        if operands.len() != 3 {
            self.warn(WarningKind::Value, format!("clamp({})", to_css(args)));
            return None;
        }
        if operands.iter().any(StyleDescriptor::is_dynamic) {
            return Some(StyleDescriptor::function("clamp", operands));
        }
        let value = calc::clamp(&operands);
        if value.is_none() {
            self.warn(WarningKind::Value, format!("clamp({})", to_css(args)));
        }
        value.map(calc::CalcValue::into_descriptor)
    }

    /// One component of an untyped value (custom properties, fallbacks,
    /// function arguments).
    pub(crate) fn token(&mut self, value: &ComponentValue) -> Option<StyleDescriptor> {
        match value {
            ComponentValue::Number(number) => Some(StyleDescriptor::Number(round(*number))),
            ComponentValue::Percentage(percent) => Some(percentage(*percent)),
            ComponentValue::Dimension { unit, .. } => match unit.as_str() {
                "deg" | "rad" | "grad" | "turn" => self.angle(value),
                "s" | "ms" => self.time(value),
                _ => self.length(value),
            },
            ComponentValue::Ident(name) if name.eq_ignore_ascii_case("currentcolor") => {
                Some(var_function(CURRENT_COLOR_VARIABLE, None))
            }
            ComponentValue::Ident(name) | ComponentValue::String(name) | ComponentValue::Url(name) => {
                Some(StyleDescriptor::string(name.as_str()))
            }
            ComponentValue::Hash(hash) => Some(
                parse_color(value, &mut self.color_context).map_or_else(
                    || StyleDescriptor::String(format!("#{hash}")),
                    |color| StyleDescriptor::String(color.to_css(self.options.color_format())),
                ),
            ),
            ComponentValue::Delim(delim) => Some(StyleDescriptor::String(delim.to_string())),
            ComponentValue::Comma => Some(StyleDescriptor::string(",")),
            ComponentValue::Function { name, args } => {
                let known = matches!(
                    name.as_str(),
                    "var" | "calc" | "min" | "max" | "clamp" | "hairlinewidth" | "pixelratio" | "fontscale"
                        | "roundtonearestpixel" | "platformcolor" | "color-mix" | "light-dark"
                ) || COLOR_FUNCTIONS.contains(&name.as_str());
                if known {
                    self.function(name, args)
                } else if contains_var(args) {
                    self.warn(WarningKind::Function, name.as_str());
                    None
                } else {
                    Some(StyleDescriptor::String(value.to_string()))
                }
            }
            _ => {
                self.warn_token(value);
                None
            }
        }
    }

    /// Every non-whitespace component converted with [`Self::token`].
    pub(crate) fn tokens(&mut self, values: &[ComponentValue]) -> Option<Vec<StyleDescriptor>> {
        significant(values).into_iter().map(|value| self.token(value)).collect()
    }

    /// An untyped value: one component stays scalar, several become an array.
    pub(crate) fn generic(&mut self, values: &[ComponentValue]) -> Option<StyleDescriptor> {
        let mut items = self.tokens(values)?;
        match items.len() {
            0 => None,
            1 => items.pop(),
            _ => Some(StyleDescriptor::Array(items)),
        }
    }
}

/// Whether a `var()` appears anywhere in `values`.
pub(crate) fn contains_var(values: &[ComponentValue]) -> bool {
    values.iter().any(|value| match value {
        ComponentValue::Function { name, args } => name == "var" || contains_var(args),
        ComponentValue::ParenBlock(inner)
        | ComponentValue::SquareBlock(inner)
        | ComponentValue::CurlyBlock(inner) => contains_var(inner),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_values;

    fn with<R>(options: &CompileOptions, body: impl FnOnce(&mut Converter<'_>) -> R) -> (R, Vec<Warning>) {
        let mut converter = Converter::new(options, "width", false);
        let result = body(&mut converter);
        (result, converter.take_warnings())
    }

    fn length(text: &str) -> Option<StyleDescriptor> {
        let values = parse_values(text);
        with(&CompileOptions::default(), |converter| converter.length(single(&values)?)).0
    }

    #[test]
    fn lengths() {
        assert_eq!(length("10px"), Some(10.0.into()));
        assert_eq!(length("2rem"), Some(28.0.into()));
        assert_eq!(length("50%"), Some("50%".into()));
        assert_eq!(length("1in"), Some(96.0.into()));
        assert_eq!(length("0.33333333px"), Some(0.3333.into()));
        assert_eq!(length("10vw"), Some(unit_function("vw", 10.0)));
        assert_eq!(length("1.5em"), Some(unit_function("em", 1.5)));
    }

    #[test]
    fn rem_can_stay_dynamic() {
        let options = CompileOptions {
            inline_rem: None,
            ..CompileOptions::default()
        };
        let values = parse_values("2rem");
        let (value, _) = with(&options, |converter| converter.length(&values[0]));
        assert_eq!(value, Some(unit_function("rem", 2.0)));
    }

    #[test]
    fn unknown_units_warn() {
        let values = parse_values("3ch");
        let (value, warnings) = with(&CompileOptions::default(), |converter| converter.length(&values[0]));
        assert_eq!(value, None);
        assert_eq!(warnings[0].kind, WarningKind::Value);
        assert_eq!(warnings[0].detail, "3ch");
    }

    #[test]
    fn calc_is_folded_when_static() {
        assert_eq!(length("calc(10px + 2 * 5px)"), Some(20.0.into()));
        assert_eq!(length("calc((10% + 20%) / 2)"), None);
        assert_eq!(length("max(10px, 2rem)"), Some(28.0.into()));
        assert_eq!(length("clamp(10px, 50px, 30px)"), Some(30.0.into()));
        assert_eq!(
            length("calc(var(--gap) * 2)"),
            Some(StyleDescriptor::function(
                "calc",
                vec![var_function("gap", None), "*".into(), 2.0.into()]
            ))
        );
    }

    #[test]
    fn var_fallbacks_are_converted() {
        assert_eq!(
            length("var(--size, 1rem)"),
            Some(var_function("size", Some(14.0.into())))
        );
    }

    #[test]
    fn colors_and_current_color() {
        let values = parse_values("hsl(0 100% 50%) currentColor rgb(var(--r) 0 0)");
        let values = significant(&values);
        let (colors, _) = with(&CompileOptions::default(), |converter| {
            values.iter().map(|value| converter.color(value)).collect::<Vec<_>>()
        });
        assert_eq!(colors[0], Some("#ff0000".into()));
        assert_eq!(colors[1], Some(var_function(CURRENT_COLOR_VARIABLE, None)));
        assert_eq!(
            colors[2],
            Some(StyleDescriptor::function(
                "rgb",
                vec![var_function("r", None), 0.0.into(), 0.0.into()]
            ))
        );
    }

    #[test]
    fn camel_case_names() {
        assert_eq!(camel_case("background-color"), "backgroundColor");
        assert_eq!(camel_case("-webkit-line-clamp"), "webkitLineClamp");
        assert_eq!(camel_case("color"), "color");
    }
}

//! Evaluation of style functions against the current render context.
//! Spec: <https://www.w3.org/TR/css-variables-1/#substitute-a-var>
//! Spec: <https://www.w3.org/TR/css-values-4/#math>
//!
//! Every function the compiler can emit maps to one [`FunctionKind`];
//! anything else is a [`StyleError::UnknownFunction`]. Values that cannot be
//! computed (undefined variables, mismatched calc operands) resolve to
//! [`StyleDescriptor::Undefined`], which removes the property.

mod animation;
mod colors;
mod shorthands;

use crate::context::Context;
use crate::error::StyleError;
use core::cell::RefCell;
use log::debug;
use rustc_hash::FxHashMap;
use style_ir::calc::{self, CalcValue};
use style_ir::{
    CURRENT_COLOR_VARIABLE, EM_VARIABLE, REM_VARIABLE, StyleDescriptor, StyleFunction, StyleObject, VariableValue,
    format_number, round,
};

/// Closed set of runtime functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FunctionKind {
    Var,
    Calc,
    Min,
    Max,
    Clamp,
    Em,
    Rem,
    Vw,
    Vh,
    HairlineWidth,
    PixelRatio,
    FontScale,
    RoundToNearestPixel,
    PlatformColor,
    ColorMix,
    /// `rgb()`, `hsl()`, `oklch()`... with runtime arguments.
    Color,
    LinearGradient,
    RadialGradient,
    Join,
    Animation,
    AnimationName,
    Transform,
    Translate,
    Rotate,
    Scale,
    Border,
    BoxShadow,
    TextShadow,
    Filter,
}

impl FunctionKind {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "var" => Self::Var,
            "calc" => Self::Calc,
            "min" => Self::Min,
            "max" => Self::Max,
            "clamp" => Self::Clamp,
            "em" => Self::Em,
            "rem" => Self::Rem,
            "vw" => Self::Vw,
            "vh" => Self::Vh,
            "hairlineWidth" => Self::HairlineWidth,
            "pixelRatio" => Self::PixelRatio,
            "fontScale" => Self::FontScale,
            "roundToNearestPixel" => Self::RoundToNearestPixel,
            "platformColor" => Self::PlatformColor,
            "color-mix" => Self::ColorMix,
            "rgb" | "rgba" | "hsl" | "hsla" | "hwb" | "lab" | "lch" | "oklab" | "oklch" | "color" => Self::Color,
            "linear-gradient" => Self::LinearGradient,
            "radial-gradient" => Self::RadialGradient,
            "join" => Self::Join,
            "@animation" => Self::Animation,
            "@animationName" => Self::AnimationName,
            "@transform" => Self::Transform,
            "@translate" => Self::Translate,
            "@rotate" => Self::Rotate,
            "@scale" => Self::Scale,
            "@border" => Self::Border,
            "@boxShadow" => Self::BoxShadow,
            "@textShadow" => Self::TextShadow,
            "@filter" => Self::Filter,
            _ => return None,
        })
    }
}

/// How a resolved declaration is written.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Resolved {
    /// Assigned at the declaration path.
    Value(StyleDescriptor),
    /// Each entry is assigned next to the declaration path (shorthands).
    Expand(StyleObject),
    /// Entries merged into the sibling `transform` list, replacing entries
    /// that use one of `replaces` as their key.
    MergeTransform {
        replaces: &'static [&'static str],
        entries: Vec<StyleDescriptor>,
    },
}

impl Resolved {
    /// Collapse into a plain value for nested positions.
    fn into_value(self) -> StyleDescriptor {
        match self {
            Self::Value(value) => value,
            Self::Expand(object) => StyleDescriptor::Object(object),
            Self::MergeTransform { entries, .. } => StyleDescriptor::Array(entries),
        }
    }
}

/// Properties of the element being styled that functions may depend on.
#[derive(Clone, Debug, Default)]
pub(crate) struct ElementMetrics {
    pub(crate) font_size: Option<f64>,
    pub(crate) color: Option<StyleDescriptor>,
}

/// Resolves descriptors for one component render.
pub(crate) struct Resolver<'ctx, 'render> {
    pub(crate) context: &'ctx Context<'render>,
    /// Variables declared by the matched rules, later rules winning.
    own: FxHashMap<String, StyleDescriptor>,
    resolved: RefCell<FxHashMap<String, StyleDescriptor>>,
    /// Variables currently being resolved, for cycle detection.
    visiting: RefCell<Vec<String>>,
    element: RefCell<ElementMetrics>,
}

fn defined(value: StyleDescriptor) -> Option<StyleDescriptor> {
    if value.is_undefined() { None } else { Some(value) }
}

impl<'ctx, 'render> Resolver<'ctx, 'render> {
    pub(crate) fn new(context: &'ctx Context<'render>, own: FxHashMap<String, StyleDescriptor>) -> Self {
        Self {
            context,
            own,
            resolved: RefCell::new(FxHashMap::default()),
            visiting: RefCell::new(Vec::new()),
            element: RefCell::new(ElementMetrics::default()),
        }
    }

    /// Publish the element's own font size and color before deferred
    /// declarations are evaluated.
    pub(crate) fn set_element(&self, metrics: ElementMetrics) {
        *self.element.borrow_mut() = metrics;
    }

    /// Resolve every variable this element declares.
    pub(crate) fn own_variables(&self) -> Result<Vec<(String, StyleDescriptor)>, StyleError> {
        let mut names: Vec<&String> = self.own.keys().collect();
        names.sort();
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            if let Some(value) = self.variable(name)? {
                out.push((name.clone(), value));
            }
        }
        Ok(out)
    }

    #[inline]
    pub(crate) fn has_own_variables(&self) -> bool {
        !self.own.is_empty()
    }

    /// Resolve a value in a nested position.
    pub(crate) fn resolve(&self, value: &StyleDescriptor) -> Result<StyleDescriptor, StyleError> {
        match value {
            StyleDescriptor::Function(function) => Ok(self.call(function)?.into_value()),
            StyleDescriptor::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let resolved = self.resolve(item)?;
                    if resolved.is_undefined() {
                        return Ok(StyleDescriptor::Undefined);
                    }
                    out.push(resolved);
                }
                Ok(StyleDescriptor::Array(out))
            }
            StyleDescriptor::Object(object) => {
                let mut out = StyleObject::new();
                for (key, item) in object {
                    let resolved = self.resolve(item)?;
                    if !resolved.is_undefined() {
                        out.insert(key.clone(), resolved);
                    }
                }
                Ok(StyleDescriptor::Object(out))
            }
            literal => Ok(literal.clone()),
        }
    }

    /// Resolve the value of a declaration.
    pub(crate) fn resolve_declaration(&self, value: &StyleDescriptor) -> Result<Resolved, StyleError> {
        match value {
            StyleDescriptor::Function(function) => self.call(function),
            other => self.resolve(other).map(Resolved::Value),
        }
    }

    fn call(&self, function: &StyleFunction) -> Result<Resolved, StyleError> {
        let kind = FunctionKind::parse(&function.name)
            .ok_or_else(|| StyleError::UnknownFunction(function.name.clone()))?;
        let args = function.args.as_slice();
        let value = match kind {
            FunctionKind::Var => self.var(args)?,
            FunctionKind::Calc => {
                let tokens = self.resolve(&StyleDescriptor::Array(args.to_vec()))?;
                match tokens {
                    StyleDescriptor::Array(tokens) => calc_result(calc::evaluate(&tokens)),
                    _ => StyleDescriptor::Undefined,
                }
            }
            FunctionKind::Min | FunctionKind::Max | FunctionKind::Clamp => {
                let operands = match self.resolve(&StyleDescriptor::Array(args.to_vec()))? {
                    StyleDescriptor::Array(operands) => operands,
                    _ => return Ok(Resolved::Value(StyleDescriptor::Undefined)),
                };
                calc_result(match kind {
                    FunctionKind::Min => calc::select(&operands, f64::min),
                    FunctionKind::Max => calc::select(&operands, f64::max),
                    _ => calc::clamp(&operands),
                })
            }
            FunctionKind::Em => self.scaled(function, Self::font_size)?,
            FunctionKind::Rem => self.scaled(function, Self::root_font_size)?,
            FunctionKind::Vw => self.scaled(function, |resolver| {
                let environment = resolver.context.store.environment();
                resolver.context.read(&environment.window_width) / 100.0
            })?,
            FunctionKind::Vh => self.scaled(function, |resolver| {
                let environment = resolver.context.store.environment();
                resolver.context.read(&environment.window_height) / 100.0
            })?,
            FunctionKind::HairlineWidth => {
                StyleDescriptor::Number(self.context.read(&self.context.store.environment().hairline_width))
            }
            FunctionKind::PixelRatio | FunctionKind::FontScale => {
                let environment = self.context.store.environment();
                let base = if kind == FunctionKind::PixelRatio {
                    self.context.read(&environment.pixel_ratio)
                } else {
                    self.context.read(&environment.font_scale)
                };
                if args.is_empty() {
                    StyleDescriptor::Number(round(base))
                } else {
                    self.scaled(function, |_| base)?
                }
            }
            FunctionKind::RoundToNearestPixel => {
                let ratio = self.context.read(&self.context.store.environment().pixel_ratio);
                match self.number_arg(function, 0)? {
                    Some(value) if ratio > 0.0 => StyleDescriptor::Number(round((value * ratio).round() / ratio)),
                    _ => StyleDescriptor::Undefined,
                }
            }
            FunctionKind::PlatformColor => self.platform_color(args)?,
            FunctionKind::ColorMix => self.color_mix(function)?,
            FunctionKind::Color => self.color_function(function)?,
            FunctionKind::LinearGradient | FunctionKind::RadialGradient => self.gradient(kind, function)?,
            FunctionKind::Join => self.join(function)?,
            FunctionKind::Animation => return self.animation(function),
            FunctionKind::AnimationName => return self.animation_name(function),
            FunctionKind::Transform => self.transform(args)?,
            FunctionKind::Translate | FunctionKind::Rotate | FunctionKind::Scale => {
                return self.individual_transform(kind, function);
            }
            FunctionKind::Border => return self.border(function),
            FunctionKind::BoxShadow => self.box_shadow(args)?,
            FunctionKind::TextShadow => return self.text_shadow(args),
            FunctionKind::Filter => self.filter(args)?,
        };
        Ok(Resolved::Value(value))
    }

    /// Resolved numeric argument; `None` when it is not a number.
    pub(crate) fn number_arg(&self, function: &StyleFunction, index: usize) -> Result<Option<f64>, StyleError> {
        let argument = function
            .args
            .get(index)
            .ok_or_else(|| StyleError::invalid(&function.name, "missing argument"))?;
        Ok(self.resolve(argument)?.as_number())
    }

    /// `factor * base`, for unit functions.
    fn scaled(
        &self,
        function: &StyleFunction,
        base: impl FnOnce(&Self) -> f64,
    ) -> Result<StyleDescriptor, StyleError> {
        let Some(factor) = self.number_arg(function, 0)? else {
            return Ok(StyleDescriptor::Undefined);
        };
        Ok(StyleDescriptor::Number(round(factor * base(self))))
    }

    /// Font size `em()` is relative to: the element's own, then the
    /// inherited one, then the root font size.
    fn font_size(&self) -> f64 {
        if let Some(size) = self.element.borrow().font_size {
            return size;
        }
        self.context
            .inherited_variable(EM_VARIABLE)
            .and_then(StyleDescriptor::as_number)
            .unwrap_or_else(|| self.root_font_size())
    }

    /// `:root { font-size }` when declared, otherwise the environment's.
    fn root_font_size(&self) -> f64 {
        let declared = self
            .context
            .read(&self.context.store.root_variable(REM_VARIABLE))
            .and_then(|alternatives| alternatives.first().and_then(|first| first.value.as_number()));
        declared.unwrap_or_else(|| self.context.read(&self.context.store.environment().root_font_size))
    }

    /// `var(name, fallback?)`.
    fn var(&self, args: &[StyleDescriptor]) -> Result<StyleDescriptor, StyleError> {
        let Some(name) = args.first().and_then(StyleDescriptor::as_str) else {
            return Err(StyleError::invalid("var", "expected a variable name"));
        };
        if let Some(value) = self.variable(name)? {
            return Ok(value);
        }
        args.get(1)
            .map_or(Ok(StyleDescriptor::Undefined), |fallback| self.resolve(fallback))
    }

    /// Look a variable up: own declarations, the element's current color,
    /// inherited values, then universal and root tables.
    pub(crate) fn variable(&self, name: &str) -> Result<Option<StyleDescriptor>, StyleError> {
        if let Some(value) = self.resolved.borrow().get(name) {
            return Ok(Some(value.clone()));
        }
        if self.visiting.borrow().iter().any(|visiting| visiting == name) {
            debug!("Circular reference to --{name}");
            return Ok(None);
        }
        self.visiting.borrow_mut().push(name.to_owned());
        let result = self.lookup(name);
        self.visiting.borrow_mut().pop();
        let value = result?;
        if let Some(value) = &value
            && self.own.contains_key(name)
        {
            self.resolved.borrow_mut().insert(name.to_owned(), value.clone());
        }
        Ok(value)
    }

    fn lookup(&self, name: &str) -> Result<Option<StyleDescriptor>, StyleError> {
        if let Some(raw) = self.own.get(name) {
            return self.resolve(raw).map(defined);
        }
        if name == CURRENT_COLOR_VARIABLE
            && let Some(color) = self.element.borrow().color.clone()
        {
            return Ok(Some(color));
        }
        if let Some(inherited) = self.context.inherited_variable(name) {
            return Ok(Some(inherited.clone()));
        }
        let universal = self.context.read(&self.context.store.universal_variable(name));
        if let Some(alternatives) = universal
            && let Some(value) = self.alternative(&alternatives)?
        {
            return Ok(Some(value));
        }
        let root = self.context.read(&self.context.store.root_variable(name));
        root.map_or(Ok(None), |alternatives| self.alternative(&alternatives))
    }

    /// First alternative whose condition holds.
    fn alternative(&self, alternatives: &[VariableValue]) -> Result<Option<StyleDescriptor>, StyleError> {
        for alternative in alternatives {
            let applies = alternative
                .media
                .as_ref()
                .is_none_or(|condition| self.context.test_media(condition));
            if applies {
                return self.resolve(&alternative.value).map(defined);
            }
        }
        Ok(None)
    }

    /// `join(list, separator?)`.
    fn join(&self, function: &StyleFunction) -> Result<StyleDescriptor, StyleError> {
        let list = function
            .args
            .first()
            .ok_or_else(|| StyleError::invalid("join", "missing list"))?;
        let separator = match function.args.get(1) {
            Some(separator) => self.resolve(separator)?.as_str().unwrap_or(" ").to_owned(),
            None => " ".to_owned(),
        };
        let items = match self.resolve(list)? {
            StyleDescriptor::Array(items) => items,
            StyleDescriptor::Undefined => return Ok(StyleDescriptor::Undefined),
            single => vec![single],
        };
        let parts: Option<Vec<String>> = items.iter().map(text).collect();
        Ok(parts.map_or(StyleDescriptor::Undefined, |strings| {
            StyleDescriptor::String(strings.join(&separator))
        }))
    }
}

fn calc_result(value: Option<CalcValue>) -> StyleDescriptor {
    value.map_or(StyleDescriptor::Undefined, CalcValue::into_descriptor)
}

/// Source text of a resolved scalar or list, for re-parsing.
pub(crate) fn text(value: &StyleDescriptor) -> Option<String> {
    match value {
        StyleDescriptor::Number(number) => Some(format_number(*number)),
        StyleDescriptor::String(text) => Some(text.clone()),
        StyleDescriptor::Bool(flag) => Some(flag.to_string()),
        StyleDescriptor::Array(items) => {
            let parts: Option<Vec<String>> = items.iter().map(text).collect();
            parts.map(|strings| strings.join(" "))
        }
        StyleDescriptor::Undefined | StyleDescriptor::Function(_) | StyleDescriptor::Object(_) => None,
    }
}

/// Spread nested arrays into one token list.
pub(crate) fn flatten(values: Vec<StyleDescriptor>) -> Vec<StyleDescriptor> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        match value {
            StyleDescriptor::Array(items) => out.extend(flatten(items)),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_emitted_function_is_known() {
        for name in [
            "var", "calc", "min", "max", "clamp", "em", "rem", "vw", "vh", "hairlineWidth", "pixelRatio",
            "fontScale", "roundToNearestPixel", "platformColor", "color-mix", "rgb", "oklch", "linear-gradient",
            "radial-gradient", "join", "@animation", "@animationName", "@transform", "@translate", "@rotate",
            "@scale", "@border", "@boxShadow", "@textShadow", "@filter",
        ] {
            assert!(FunctionKind::parse(name).is_some(), "{name}");
        }
        assert_eq!(FunctionKind::parse("attr"), None);
    }

    #[test]
    fn text_and_flatten() {
        let nested = vec![
            StyleDescriptor::Number(1.0),
            StyleDescriptor::Array(vec!["2px".into(), StyleDescriptor::Array(vec!["red".into()])]),
        ];
        assert_eq!(text(&StyleDescriptor::Array(nested.clone())).as_deref(), Some("1 2px red"));
        assert_eq!(flatten(nested).len(), 3);
    }
}

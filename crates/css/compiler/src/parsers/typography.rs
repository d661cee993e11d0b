//! Fonts, text and text decoration.
//! Spec: <https://www.w3.org/TR/css-fonts-4/>
//! Spec: <https://www.w3.org/TR/css-text-3/>
//! Spec: <https://www.w3.org/TR/css-text-decor-3/>

use super::values::{camel_case, significant, unit_function};
use super::{Converter, Declarations, one};
use css_syntax::{ComponentValue, split_commas};
use style_ir::{PropertyPath, StyleDescriptor};

const FONT_STYLES: &[&str] = &["normal", "italic"];
const FONT_WEIGHTS: &[&str] = &["normal", "bold"];
const FONT_VARIANTS: &[&str] = &[
    "small-caps",
    "oldstyle-nums",
    "lining-nums",
    "tabular-nums",
    "proportional-nums",
];
const DECORATION_LINES: &[&str] = &["none", "underline", "line-through"];
const DECORATION_STYLES: &[&str] = &["solid", "double", "dotted", "dashed"];

const KEYWORDS: &[(&str, &[&str])] = &[
    ("font-style", FONT_STYLES),
    ("text-align", &["auto", "left", "right", "center", "justify"]),
    ("text-transform", &["none", "uppercase", "lowercase", "capitalize"]),
    ("text-decoration-style", DECORATION_STYLES),
    ("vertical-align", &["auto", "top", "bottom", "middle"]),
    ("writing-direction", &["auto", "ltr", "rtl"]),
];

/// `normal | bold | <number [1,1000]>`, as the string form native text expects.
fn font_weight(converter: &mut Converter<'_>, value: &ComponentValue) -> Option<StyleDescriptor> {
    match value {
        ComponentValue::Number(weight) if (1.0..=1000.0).contains(weight) => {
            Some(StyleDescriptor::String(style_ir::format_number(*weight)))
        }
        ComponentValue::Function { .. } => converter.number(value),
        _ => converter.keyword(value, FONT_WEIGHTS),
    }
}

/// The first family of a `font-family` list.
fn font_family(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<StyleDescriptor> {
    let families = split_commas(values);
    let first = families.first()?;
    match significant(first).as_slice() {
        [ComponentValue::String(family)] => Some(StyleDescriptor::string(family.as_str())),
        [ComponentValue::Function { name, args }] => converter.function(name, args),
        idents if !idents.is_empty() && idents.iter().all(|value| value.ident().is_some()) => Some(StyleDescriptor::String(
            idents
                .iter()
                .filter_map(|value| value.ident())
                .collect::<Vec<_>>()
                .join(" "),
        )),
        _ => {
            converter.warn_value(values);
            None
        }
    }
}

/// Unitless line heights scale with the font size.
fn line_height(converter: &mut Converter<'_>, value: &ComponentValue) -> Option<StyleDescriptor> {
    match value {
        ComponentValue::Number(multiplier) => Some(unit_function("em", *multiplier)),
        ComponentValue::Ident(keyword) if keyword.eq_ignore_ascii_case("normal") => {
            converter.warn_token(value);
            None
        }
        _ => converter.length(value),
    }
}

/// `[<style> || <variant> || <weight>]? <size> [/ <line-height>]? <family>`.
/// Spec: <https://www.w3.org/TR/css-fonts-4/#font-prop>
fn font(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let parts: Vec<&ComponentValue> = significant(values);
    let Some(size_index) = parts.iter().position(|value| {
        matches!(value, ComponentValue::Dimension { .. } | ComponentValue::Percentage(_))
            || value.function().is_some_and(|(name, _)| name != "var")
    }) else {
        converter.warn_value(values);
        return;
    };
    let mut style = None;
    let mut weight = None;
    let mut variant = Vec::new();
    for value in parts.iter().take(size_index) {
        let keyword = value.ident().map(str::to_ascii_lowercase);
        match keyword.as_deref() {
            Some("normal") => {}
            Some("italic") => style = Some(StyleDescriptor::string("italic")),
            Some(name) if FONT_VARIANTS.contains(&name) => variant.push(StyleDescriptor::string(name)),
            _ => match font_weight(converter, value) {
                Some(parsed) => weight = Some(parsed),
                None => return,
            },
        }
    }
    let Some(size) = parts.get(size_index).and_then(|value| converter.length(value)) else {
        return;
    };
    let mut rest = parts.get(size_index + 1..).unwrap_or_default();
    let mut height = None;
    if let [slash, value, tail @ ..] = rest
        && slash.is_delim('/')
    {
        let Some(parsed) = line_height(converter, value) else {
            return;
        };
        height = Some(parsed);
        rest = tail;
    }
    let family_values: Vec<ComponentValue> = rest.iter().map(|value| (*value).clone()).collect();
    let family = if family_values.is_empty() {
        None
    } else {
        let Some(family) = font_family(converter, &family_values) else {
            return;
        };
        Some(family)
    };
    out.set_some("fontStyle", style);
    if !variant.is_empty() {
        out.set("fontVariant", StyleDescriptor::Array(variant));
    }
    out.set_some("fontWeight", weight);
    out.set("fontSize", size);
    out.set_some("lineHeight", height);
    out.set_some("fontFamily", family);
}

/// `<line> || <style> || <color>`.
/// Spec: <https://www.w3.org/TR/css-text-decor-3/#text-decoration-property>
fn text_decoration(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let mut lines: Vec<String> = Vec::new();
    let mut style = None;
    let mut color = None;
    for value in significant(values) {
        let keyword = value.ident().map(str::to_ascii_lowercase).unwrap_or_default();
        if DECORATION_LINES.contains(&keyword.as_str()) {
            lines.push(keyword);
        } else if style.is_none() && DECORATION_STYLES.contains(&keyword.as_str()) {
            style = Some(StyleDescriptor::String(keyword));
        } else if color.is_none() {
            let Some(parsed) = converter.color(value) else {
                return;
            };
            color = Some(parsed);
        } else {
            converter.warn_value(values);
            return;
        }
    }
    if !lines.is_empty() {
        out.set("textDecorationLine", StyleDescriptor::String(lines.join(" ")));
    }
    out.set_some("textDecorationStyle", style);
    out.set_some("textDecorationColor", color);
}

fn decoration_line(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<StyleDescriptor> {
    let mut lines = Vec::new();
    for value in significant(values) {
        match converter.keyword(value, DECORATION_LINES)? {
            StyleDescriptor::String(line) => lines.push(line),
            dynamic => return Some(dynamic),
        }
    }
    if lines.is_empty() {
        return None;
    }
    Some(StyleDescriptor::String(lines.join(" ")))
}

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    if let Some((_, allowed)) = KEYWORDS.iter().find(|(property, _)| *property == name) {
        let value = one(converter, values).and_then(|value| converter.keyword(value, allowed));
        out.set_some(&camel_case(name), value);
        return true;
    }
    match name {
        "font" => font(converter, values, out),
        "font-size" | "letter-spacing" | "text-decoration-thickness" => {
            let value = one(converter, values).and_then(|value| converter.length(value));
            out.set_some(&camel_case(name), value);
        }
        "font-weight" => {
            let value = one(converter, values).and_then(|value| font_weight(converter, value));
            out.set_some("fontWeight", value);
        }
        "font-family" => {
            let value = font_family(converter, values);
            out.set_some("fontFamily", value);
        }
        "font-variant" => {
            let variants: Option<Vec<StyleDescriptor>> = significant(values)
                .into_iter()
                .map(|value| converter.keyword(value, FONT_VARIANTS))
                .collect();
            if let Some(variants) = variants {
                out.set("fontVariant", StyleDescriptor::Array(variants));
            }
        }
        "line-height" => {
            let value = one(converter, values).and_then(|value| line_height(converter, value));
            out.set_some("lineHeight", value);
        }
        "text-decoration" => text_decoration(converter, values, out),
        "text-decoration-line" => {
            let value = decoration_line(converter, values);
            out.set_some("textDecorationLine", value);
        }
        "line-clamp" | "-webkit-line-clamp" => {
            let value = one(converter, values).and_then(|value| {
                if value.is_ident("none") {
                    Some(StyleDescriptor::Number(0.0))
                } else {
                    converter.number(value)
                }
            });
            if let Some(value) = value {
                out.set_path(PropertyPath::anchored(&["numberOfLines"]), value);
            }
        }
        "text-shadow-color" => {
            let value = one(converter, values).and_then(|value| converter.color(value));
            out.set_some("textShadowColor", value);
        }
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::parsers::values::unit_function;

    #[test]
    fn font_shorthand() {
        assert_eq!(
            entries("font", "italic bold 12px/1.5 \"Inter Var\", sans-serif"),
            vec![
                entry("fontStyle", "italic"),
                entry("fontWeight", "bold"),
                entry("fontSize", 12.0),
                entry("lineHeight", unit_function("em", 1.5)),
                entry("fontFamily", "Inter Var"),
            ]
        );
    }

    #[test]
    fn weights_and_families() {
        assert_eq!(entries("font-weight", "600"), vec![entry("fontWeight", "600")]);
        assert_eq!(entries("font-family", "Open Sans, serif"), vec![entry("fontFamily", "Open Sans")]);
        assert_eq!(entries("line-height", "20px"), vec![entry("lineHeight", 20.0)]);
    }

    #[test]
    fn decoration_and_line_clamp() {
        assert_eq!(
            entries("text-decoration", "underline line-through dotted red"),
            vec![
                entry("textDecorationLine", "underline line-through"),
                entry("textDecorationStyle", "dotted"),
                entry("textDecorationColor", "#ff0000"),
            ]
        );
        assert_eq!(entries("-webkit-line-clamp", "2"), vec![entry("^.numberOfLines", 2.0)]);
    }
}

//! Border and outline shorthands.
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/#border-shorthands>
//! Spec: <https://www.w3.org/TR/css-ui-4/#outline>

use super::edges::line_width;
use super::values::{camel_case, contains_var, significant};
use super::{Converter, Declarations, one};
use css_syntax::ComponentValue;
use style_ir::StyleDescriptor;

pub(super) const LINE_STYLES: &[&str] = &["solid", "dashed", "dotted"];

/// (property, native prefix, style property).
const SHORTHANDS: &[(&str, &str, &str)] = &[
    ("border", "border", "borderStyle"),
    ("border-top", "borderTop", "borderStyle"),
    ("border-right", "borderRight", "borderStyle"),
    ("border-bottom", "borderBottom", "borderStyle"),
    ("border-left", "borderLeft", "borderStyle"),
    ("border-inline-start", "borderStart", "borderStyle"),
    ("border-inline-end", "borderEnd", "borderStyle"),
    ("outline", "outline", "outlineStyle"),
];

/// Numbers, dimensions and math functions; never a color.
pub(super) fn is_length_like(value: &ComponentValue) -> bool {
    match value {
        ComponentValue::Number(_) | ComponentValue::Dimension { .. } => true,
        ComponentValue::Function { name, .. } => {
            matches!(name.as_str(), "calc" | "min" | "max" | "clamp" | "hairlinewidth" | "roundtonearestpixel")
        }
        _ => false,
    }
}

/// `<line-width> || <line-style> || <color>`.
fn shorthand(
    converter: &mut Converter<'_>,
    values: &[ComponentValue],
    prefix: &str,
    style_name: &str,
    out: &mut Declarations,
) {
    if contains_var(values) {
        // Which slot a variable fills is only known once it resolves.
        let mut args = vec![StyleDescriptor::string(prefix)];
        let Some(tokens) = converter.tokens(values) else {
            return;
        };
        args.extend(tokens);
        out.set(prefix, StyleDescriptor::function("@border", args));
        return;
    }
    let mut width = None;
    let mut style = None;
    let mut color = None;
    let mut none = false;
    for value in significant(values) {
        let keyword = value.ident().map(str::to_ascii_lowercase);
        let keyword = keyword.as_deref();
        if matches!(keyword, Some("none" | "hidden")) && !none {
            none = true;
        } else if let Some(line) = keyword.filter(|line| LINE_STYLES.contains(line))
            && style.is_none()
        {
            style = Some(StyleDescriptor::string(line));
        } else if width.is_none() && (is_length_like(value) || matches!(keyword, Some("thin" | "medium" | "thick"))) {
            width = Some(line_width(converter, value));
        } else if color.is_none() {
            color = Some(converter.color(value));
        } else {
            converter.warn_value(values);
            return;
        }
    }
    if none && width.is_none() {
        width = Some(Some(StyleDescriptor::Number(0.0)));
    }
    if width.as_ref().is_some_and(Option::is_none) || color.as_ref().is_some_and(Option::is_none) {
        return;
    }
    out.set_some(&format!("{prefix}Width"), width.flatten());
    out.set_some(style_name, style);
    out.set_some(&format!("{prefix}Color"), color.flatten());
}

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    if let Some((_, prefix, style_name)) = SHORTHANDS.iter().find(|(property, ..)| *property == name) {
        shorthand(converter, values, prefix, style_name, out);
        return true;
    }
    let Some(value) = (match name {
        "border-style" | "outline-style" | "outline-width" | "outline-offset" | "outline-color" => {
            one(converter, values)
        }
        _ => return false,
    }) else {
        return true;
    };
    let parsed = match name {
        "border-style" | "outline-style" => converter.keyword(value, LINE_STYLES),
        "outline-width" => line_width(converter, value),
        "outline-offset" => converter.length(value),
        _ => converter.color(value),
    };
    out.set_some(&camel_case(name), parsed);
    true
}

#[allow(clippy::panic, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use style_ir::StyleDescriptor;

    #[test]
    fn static_border_expands() {
        assert_eq!(
            entries("border", "1px solid red"),
            vec![
                entry("borderWidth", 1.0),
                entry("borderStyle", "solid"),
                entry("borderColor", "#ff0000"),
            ]
        );
        assert_eq!(
            entries("border-top", "thick dashed"),
            vec![entry("borderTopWidth", 5.0), entry("borderStyle", "dashed")]
        );
        assert_eq!(entries("border", "none"), vec![entry("borderWidth", 0.0)]);
    }

    #[test]
    fn variable_border_stays_a_function() {
        let parsed = entries("outline", "2px solid var(--ring)");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].0, "outline");
        let StyleDescriptor::Function(function) = &parsed[0].1 else {
            panic!("expected a function, got {:?}", parsed[0].1);
        };
        assert_eq!(function.name, "@border");
        assert_eq!(function.args[0], StyleDescriptor::string("outline"));
        assert_eq!(function.args.len(), 4);
    }

    #[test]
    fn invalid_parts_drop_the_declaration() {
        let (entries, warnings) = parse("border", "1px solid red blue");
        assert!(entries.is_empty());
        assert!(!warnings.is_empty());
    }
}

//! Flexible box layout.
//! Spec: <https://www.w3.org/TR/css-flexbox-1/>
//! Spec: <https://www.w3.org/TR/css-align-3/#gaps>

use super::values::{camel_case, contains_var, significant};
use super::{Converter, Declarations, one};
use css_syntax::ComponentValue;
use style_ir::StyleDescriptor;

const DIRECTIONS: &[&str] = &["row", "row-reverse", "column", "column-reverse"];
const WRAPS: &[&str] = &["wrap", "nowrap", "wrap-reverse"];

const ALIGNMENT: &[(&str, &[&str])] = &[
    ("flex-direction", DIRECTIONS),
    ("flex-wrap", WRAPS),
    (
        "align-items",
        &["flex-start", "flex-end", "center", "stretch", "baseline", "start", "end"],
    ),
    (
        "align-self",
        &["auto", "flex-start", "flex-end", "center", "stretch", "baseline", "start", "end"],
    ),
    (
        "align-content",
        &[
            "flex-start",
            "flex-end",
            "center",
            "stretch",
            "space-between",
            "space-around",
            "space-evenly",
            "start",
            "end",
        ],
    ),
    (
        "justify-content",
        &[
            "flex-start",
            "flex-end",
            "center",
            "space-between",
            "space-around",
            "space-evenly",
            "start",
            "end",
        ],
    ),
];

/// `start`/`end` are spelled `flex-start`/`flex-end` natively.
fn normalize_alignment(value: StyleDescriptor) -> StyleDescriptor {
    match value.as_str() {
        Some("start") => StyleDescriptor::string("flex-start"),
        Some("end") => StyleDescriptor::string("flex-end"),
        _ => value,
    }
}

/// `none | auto | <grow> <shrink>? || <basis>`.
/// Spec: <https://www.w3.org/TR/css-flexbox-1/#flex-property>
fn flex(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let parts = significant(values);
    if contains_var(values) {
        if let [value] = parts.as_slice() {
            out.set_some("flex", converter.number(value));
        } else {
            converter.warn_value(values);
        }
        return;
    }
    let number = StyleDescriptor::Number;
    let (grow, shrink, basis) = match parts.as_slice() {
        [keyword] if keyword.is_ident("none") => (number(0.0), number(0.0), StyleDescriptor::string("auto")),
        [keyword] if keyword.is_ident("auto") => (number(1.0), number(1.0), StyleDescriptor::string("auto")),
        [ComponentValue::Number(grow)] => (number(*grow), number(1.0), StyleDescriptor::string("0%")),
        [basis] => {
            let Some(basis) = converter.length_or_auto(basis) else {
                return;
            };
            (number(1.0), number(1.0), basis)
        }
        [ComponentValue::Number(grow), ComponentValue::Number(shrink)] => {
            (number(*grow), number(*shrink), StyleDescriptor::string("0%"))
        }
        [ComponentValue::Number(grow), basis] => {
            let Some(basis) = converter.length_or_auto(basis) else {
                return;
            };
            (number(*grow), number(1.0), basis)
        }
        [ComponentValue::Number(grow), ComponentValue::Number(shrink), basis] => {
            let Some(basis) = converter.length_or_auto(basis) else {
                return;
            };
            (number(*grow), number(*shrink), basis)
        }
        _ => {
            converter.warn_value(values);
            return;
        }
    };
    out.set("flexGrow", grow);
    out.set("flexShrink", shrink);
    out.set("flexBasis", basis);
}

/// `<'flex-direction'> || <'flex-wrap'>`.
fn flex_flow(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let mut direction = None;
    let mut wrap = None;
    for value in significant(values) {
        let keyword = value.ident().map(str::to_ascii_lowercase).unwrap_or_default();
        if direction.is_none() && DIRECTIONS.contains(&keyword.as_str()) {
            direction = Some(StyleDescriptor::String(keyword));
        } else if wrap.is_none() && WRAPS.contains(&keyword.as_str()) {
            wrap = Some(StyleDescriptor::String(keyword));
        } else {
            converter.warn_value(values);
            return;
        }
    }
    out.set_some("flexDirection", direction);
    out.set_some("flexWrap", wrap);
}

/// `<row-gap> <column-gap>?`.
fn gap(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let parts = significant(values);
    let parsed: Option<Vec<StyleDescriptor>> = parts.iter().map(|value| converter.length(value)).collect();
    match parsed.as_deref() {
        Some([both]) => out.set("gap", both.clone()),
        Some([row, column]) if row == column => out.set("gap", row.clone()),
        Some([row, column]) => {
            out.set("rowGap", row.clone());
            out.set("columnGap", column.clone());
        }
        Some(_) => converter.warn_value(values),
        None => {}
    }
}

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    if let Some((_, allowed)) = ALIGNMENT.iter().find(|(property, _)| *property == name) {
        let value = one(converter, values)
            .and_then(|value| converter.keyword(value, allowed))
            .map(normalize_alignment);
        out.set_some(&camel_case(name), value);
        return true;
    }
    match name {
        "flex" => flex(converter, values, out),
        "flex-flow" => flex_flow(converter, values, out),
        "gap" => gap(converter, values, out),
        "row-gap" | "column-gap" => {
            let value = one(converter, values).and_then(|value| converter.length(value));
            out.set_some(&camel_case(name), value);
        }
        "flex-grow" | "flex-shrink" => {
            let value = one(converter, values).and_then(|value| converter.number(value));
            out.set_some(&camel_case(name), value);
        }
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[test]
    fn flex_shorthand_forms() {
        assert_eq!(
            entries("flex", "1"),
            vec![entry("flexGrow", 1.0), entry("flexShrink", 1.0), entry("flexBasis", "0%")]
        );
        assert_eq!(
            entries("flex", "none"),
            vec![entry("flexGrow", 0.0), entry("flexShrink", 0.0), entry("flexBasis", "auto")]
        );
        assert_eq!(
            entries("flex", "2 0 10px"),
            vec![entry("flexGrow", 2.0), entry("flexShrink", 0.0), entry("flexBasis", 10.0)]
        );
    }

    #[test]
    fn flow_gap_and_alignment() {
        assert_eq!(
            entries("flex-flow", "wrap column"),
            vec![entry("flexDirection", "column"), entry("flexWrap", "wrap")]
        );
        assert_eq!(entries("gap", "4px 8px"), vec![entry("rowGap", 4.0), entry("columnGap", 8.0)]);
        assert_eq!(entries("gap", "4px 4px"), vec![entry("gap", 4.0)]);
        assert_eq!(entries("justify-content", "end"), vec![entry("justifyContent", "flex-end")]);
    }
}

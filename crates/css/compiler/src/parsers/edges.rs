//! Four-sided and logical box shorthands.
//! Spec: <https://www.w3.org/TR/css-box-4/#margins>
//! Spec: <https://www.w3.org/TR/css-logical-1/>
//!
//! When every side resolves to the same value, one shared declaration is
//! written instead of four identical longhands.

use super::values::{camel_case, significant};
use super::{Converter, Declarations};
use css_syntax::ComponentValue;
use smallvec::SmallVec;
use style_ir::StyleDescriptor;

type ValueParser = fn(&mut Converter<'_>, &ComponentValue) -> Option<StyleDescriptor>;
type Sides = SmallVec<[StyleDescriptor; 4]>;

/// Four-side shorthands: (property, shared name, [top, right, bottom, left]).
const FOUR_SIDED: &[(&str, &str, [&str; 4])] = &[
    ("margin", "margin", ["marginTop", "marginRight", "marginBottom", "marginLeft"]),
    ("padding", "padding", ["paddingTop", "paddingRight", "paddingBottom", "paddingLeft"]),
    ("inset", "inset", ["top", "right", "bottom", "left"]),
    (
        "border-width",
        "borderWidth",
        ["borderTopWidth", "borderRightWidth", "borderBottomWidth", "borderLeftWidth"],
    ),
    (
        "border-color",
        "borderColor",
        ["borderTopColor", "borderRightColor", "borderBottomColor", "borderLeftColor"],
    ),
    (
        "border-radius",
        "borderRadius",
        [
            "borderTopLeftRadius",
            "borderTopRightRadius",
            "borderBottomRightRadius",
            "borderBottomLeftRadius",
        ],
    ),
];

/// Logical pairs: (property, shared name, [start, end]).
const LOGICAL_PAIRS: &[(&str, Option<&str>, [&str; 2])] = &[
    ("margin-inline", Some("marginHorizontal"), ["marginStart", "marginEnd"]),
    ("margin-block", Some("marginVertical"), ["marginTop", "marginBottom"]),
    ("padding-inline", Some("paddingHorizontal"), ["paddingStart", "paddingEnd"]),
    ("padding-block", Some("paddingVertical"), ["paddingTop", "paddingBottom"]),
    ("inset-inline", None, ["start", "end"]),
    ("inset-block", None, ["top", "bottom"]),
    ("border-inline-width", None, ["borderStartWidth", "borderEndWidth"]),
    ("border-inline-color", None, ["borderStartColor", "borderEndColor"]),
];

/// Single logical longhands and their physical or flow-relative name.
const LOGICAL: &[(&str, &str)] = &[
    ("margin-inline-start", "marginStart"),
    ("margin-inline-end", "marginEnd"),
    ("margin-block-start", "marginTop"),
    ("margin-block-end", "marginBottom"),
    ("padding-inline-start", "paddingStart"),
    ("padding-inline-end", "paddingEnd"),
    ("padding-block-start", "paddingTop"),
    ("padding-block-end", "paddingBottom"),
    ("inset-inline-start", "start"),
    ("inset-inline-end", "end"),
    ("inset-block-start", "top"),
    ("inset-block-end", "bottom"),
    ("border-inline-start-width", "borderStartWidth"),
    ("border-inline-end-width", "borderEndWidth"),
    ("border-inline-start-color", "borderStartColor"),
    ("border-inline-end-color", "borderEndColor"),
    ("border-start-start-radius", "borderTopStartRadius"),
    ("border-start-end-radius", "borderTopEndRadius"),
    ("border-end-start-radius", "borderBottomStartRadius"),
    ("border-end-end-radius", "borderBottomEndRadius"),
];

/// Physical longhands that keep their camel-cased name.
const LONGHAND_LENGTHS: &[&str] = &[
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
];

fn margin(converter: &mut Converter<'_>, value: &ComponentValue) -> Option<StyleDescriptor> {
    converter.length_or_auto(value)
}

fn length(converter: &mut Converter<'_>, value: &ComponentValue) -> Option<StyleDescriptor> {
    converter.length(value)
}

/// `thin | medium | thick | <length>`.
/// Spec: <https://www.w3.org/TR/css-backgrounds-3/#typedef-line-width>
pub(super) fn line_width(converter: &mut Converter<'_>, value: &ComponentValue) -> Option<StyleDescriptor> {
    match value.ident().map(str::to_ascii_lowercase).as_deref() {
        Some("thin") => Some(StyleDescriptor::Number(1.0)),
        Some("medium") => Some(StyleDescriptor::Number(3.0)),
        Some("thick") => Some(StyleDescriptor::Number(5.0)),
        _ => converter.length(value),
    }
}

fn color(converter: &mut Converter<'_>, value: &ComponentValue) -> Option<StyleDescriptor> {
    converter.color(value)
}

fn value_parser(property: &str) -> ValueParser {
    if property.ends_with("color") {
        color
    } else if property.ends_with("width") {
        line_width
    } else if property.starts_with("margin") || property.starts_with("inset") {
        margin
    } else {
        length
    }
}

/// Parse one to `max` whitespace-separated values.
fn side_values(
    converter: &mut Converter<'_>,
    values: &[ComponentValue],
    max: usize,
    parse: ValueParser,
) -> Option<Sides> {
    let parts = significant(values);
    if parts.is_empty() || parts.len() > max {
        converter.warn_value(values);
        return None;
    }
    parts.into_iter().map(|value| parse(converter, value)).collect()
}

/// Expand per the 1-to-4 value rule and write either the shared name or
/// all four longhands.
pub(super) fn four_sides(
    converter: &mut Converter<'_>,
    values: &[ComponentValue],
    parse: ValueParser,
    shared: &str,
    names: [&str; 4],
    out: &mut Declarations,
) {
    let Some(sides) = side_values(converter, values, 4, parse) else {
        return;
    };
    let [top, right, bottom, left] = match sides.as_slice() {
        [all] => [all, all, all, all],
        [vertical, horizontal] => [vertical, horizontal, vertical, horizontal],
        [top, horizontal, bottom] => [top, horizontal, bottom, horizontal],
        [top, right, bottom, left] => [top, right, bottom, left],
        _ => return,
    };
    if top == right && top == bottom && top == left {
        out.set(shared, top.clone());
        return;
    }
    for (name, value) in names.into_iter().zip([top, right, bottom, left]) {
        out.set(name, value.clone());
    }
}

fn two_sides(
    converter: &mut Converter<'_>,
    values: &[ComponentValue],
    parse: ValueParser,
    shared: Option<&str>,
    names: [&str; 2],
    out: &mut Declarations,
) {
    let Some(sides) = side_values(converter, values, 2, parse) else {
        return;
    };
    let [start, end] = match sides.as_slice() {
        [both] => [both, both],
        [start, end] => [start, end],
        _ => return,
    };
    if let Some(shared) = shared
        && start == end
    {
        out.set(shared, start.clone());
        return;
    }
    out.set(names[0], start.clone());
    out.set(names[1], end.clone());
}

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    if let Some((property, shared, names)) = FOUR_SIDED.iter().find(|(property, ..)| *property == name) {
        if *property == "border-radius" && values.iter().any(|value| value.is_delim('/')) {
            converter.warn_value(values);
            return true;
        }
        four_sides(converter, values, value_parser(property), shared, *names, out);
        return true;
    }
    if let Some((property, shared, names)) = LOGICAL_PAIRS.iter().find(|(property, ..)| *property == name) {
        two_sides(converter, values, value_parser(property), *shared, *names, out);
        return true;
    }
    let target = LOGICAL
        .iter()
        .find(|(property, _)| *property == name)
        .map(|(_, target)| (*target).to_owned())
        .or_else(|| LONGHAND_LENGTHS.contains(&name).then(|| camel_case(name)));
    let Some(target) = target else {
        return false;
    };
    let parse = value_parser(name);
    if let Some(value) = super::one(converter, values) {
        let parsed = parse(converter, value);
        out.set_some(&target, parsed);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use style_ir::StyleDescriptor;

    #[test]
    fn equal_sides_collapse() {
        assert_eq!(entries("margin", "4px"), vec![entry("margin", 4.0)]);
        assert_eq!(entries("padding", "1rem 14px"), vec![entry("padding", 14.0)]);
        assert_eq!(entries("border-width", "thin"), vec![entry("borderWidth", 1.0)]);
    }

    #[test]
    fn distinct_sides_expand() {
        assert_eq!(
            entries("margin", "1px 2px 3px"),
            vec![
                entry("marginTop", 1.0),
                entry("marginRight", 2.0),
                entry("marginBottom", 3.0),
                entry("marginLeft", 2.0),
            ]
        );
        assert_eq!(
            entries("border-color", "red blue"),
            vec![
                entry("borderTopColor", "#ff0000"),
                entry("borderRightColor", "#0000ff"),
                entry("borderBottomColor", "#ff0000"),
                entry("borderLeftColor", "#0000ff"),
            ]
        );
    }

    #[test]
    fn logical_properties() {
        assert_eq!(entries("margin-inline", "auto"), vec![entry("marginHorizontal", "auto")]);
        assert_eq!(
            entries("padding-block", "1px 2px"),
            vec![entry("paddingTop", 1.0), entry("paddingBottom", 2.0)]
        );
        assert_eq!(entries("inset-inline-start", "0"), vec![entry("start", 0.0)]);
        assert_eq!(entries("border-top-left-radius", "3px"), vec![entry("borderTopLeftRadius", 3.0)]);
    }

    #[test]
    fn variables_fill_every_side() {
        let shared = entries("margin", "var(--gap)");
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].0, "margin");
        assert!(matches!(shared[0].1, StyleDescriptor::Function(_)));
    }
}

//! Box, positioning and display properties.
//! Spec: <https://www.w3.org/TR/css-sizing-3/>
//! Spec: <https://www.w3.org/TR/css-position-3/>
//! Spec: <https://www.w3.org/TR/css-display-3/>

use super::values::{camel_case, significant};
use super::{Converter, Declarations, one};
use css_syntax::ComponentValue;
use style_ir::{StyleDescriptor, round};

/// Properties taking `<length-percentage> | auto`.
const LENGTHS: &[&str] = &[
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "top",
    "right",
    "bottom",
    "left",
    "start",
    "end",
    "flex-basis",
];

/// Properties taking one keyword out of a fixed set.
const KEYWORDS: &[(&str, &[&str])] = &[
    ("display", &["flex", "none", "contents"]),
    ("position", &["absolute", "relative", "static"]),
    ("overflow", &["visible", "hidden", "scroll"]),
    ("box-sizing", &["border-box", "content-box"]),
    ("pointer-events", &["auto", "none", "box-none", "box-only"]),
    ("user-select", &["auto", "none", "text", "contain", "all"]),
    ("backface-visibility", &["visible", "hidden"]),
    ("direction", &["ltr", "rtl"]),
    ("object-fit", &["cover", "contain", "fill", "none", "scale-down"]),
    ("cursor", &["auto", "pointer"]),
    ("isolation", &["auto", "isolate"]),
    (
        "mix-blend-mode",
        &[
            "normal",
            "multiply",
            "screen",
            "overlay",
            "darken",
            "lighten",
            "color-dodge",
            "color-burn",
            "hard-light",
            "soft-light",
            "difference",
            "exclusion",
            "hue",
            "saturation",
            "color",
            "luminosity",
        ],
    ),
];

/// `<number> / <number>` or a single number.
fn ratio(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<StyleDescriptor> {
    match significant(values).as_slice() {
        [value] => converter.number(value),
        [ComponentValue::Number(width), slash, ComponentValue::Number(height)]
            if slash.is_delim('/') && *height != 0.0 =>
        {
            Some(StyleDescriptor::Number(round(width / height)))
        }
        _ => {
            converter.warn_value(values);
            None
        }
    }
}

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    if LENGTHS.contains(&name) {
        let value = one(converter, values).and_then(|value| converter.length_or_auto(value));
        out.set_some(&camel_case(name), value);
        return true;
    }
    if let Some((_, allowed)) = KEYWORDS.iter().find(|(property, _)| *property == name) {
        let value = one(converter, values).and_then(|value| converter.keyword(value, allowed));
        out.set_some(&camel_case(name), value);
        return true;
    }
    match name {
        "opacity" => {
            let value = one(converter, values).and_then(|value| converter.number_or_percentage(value));
            out.set_some("opacity", value);
        }
        "z-index" => {
            let value = one(converter, values).and_then(|value| match value {
                ComponentValue::Number(number) if number.fract() == 0.0 => Some(StyleDescriptor::Number(*number)),
                other => converter.number(other),
            });
            out.set_some("zIndex", value);
        }
        "aspect-ratio" => {
            let value = ratio(converter, values);
            out.set_some("aspectRatio", value);
        }
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[test]
    fn lengths_and_keywords() {
        assert_eq!(entries("max-width", "50%"), vec![entry("maxWidth", "50%")]);
        assert_eq!(entries("height", "auto"), vec![entry("height", "auto")]);
        assert_eq!(entries("position", "ABSOLUTE"), vec![entry("position", "absolute")]);
        assert!(entries("display", "grid").is_empty());
    }

    #[test]
    fn ratios_and_numbers() {
        assert_eq!(entries("aspect-ratio", "16 / 9"), vec![entry("aspectRatio", 1.7778)]);
        assert_eq!(entries("opacity", "50%"), vec![entry("opacity", 0.5)]);
        assert_eq!(entries("z-index", "3"), vec![entry("zIndex", 3.0)]);
    }
}

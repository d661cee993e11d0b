//! Backgrounds and gradients.
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/#background>
//! Spec: <https://www.w3.org/TR/css-images-3/#gradients>
//!
//! Gradients are lowered to `linear-gradient`/`radial-gradient` functions
//! whose first argument is the direction or shape and whose remaining
//! arguments are `[color, position...]` stops. The runtime turns them into
//! `experimental_backgroundImage` entries once every color is known.

use super::values::significant;
use super::{Converter, Declarations};
use crate::warnings::WarningKind;
use css_syntax::{ComponentValue, split_commas, to_css};
use style_ir::StyleDescriptor;

const IMAGE_PROPERTY: &str = "experimental_backgroundImage";

fn is_gradient(name: &str) -> bool {
    matches!(name, "linear-gradient" | "radial-gradient")
}

/// `<color> <length-percentage>{0,2}`.
fn color_stop(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<StyleDescriptor> {
    let parts = significant(values);
    let (color, positions) = parts.split_first()?;
    if positions.len() > 2 {
        converter.warn_value(values);
        return None;
    }
    let mut stop = vec![converter.color(color)?];
    for position in positions {
        stop.push(converter.length(position)?);
    }
    Some(StyleDescriptor::Array(stop))
}

/// Direction of a linear gradient, if `values` is one.
fn linear_direction(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<Option<StyleDescriptor>> {
    match significant(values).as_slice() {
        [keyword, ..] if keyword.is_ident("to") => Some(Some(StyleDescriptor::String(
            to_css(values).to_ascii_lowercase(),
        ))),
        [ComponentValue::Dimension { .. } | ComponentValue::Number(_)] => {
            let angle = significant(values).first().and_then(|value| converter.angle(value));
            angle.map(Some)
        }
        _ => Some(None),
    }
}

/// Shape, size and position of a radial gradient, if `values` is one.
fn radial_shape(values: &[ComponentValue]) -> Option<StyleDescriptor> {
    let shaped = significant(values).first().is_some_and(|value| {
        ["circle", "ellipse", "at", "closest-side", "closest-corner", "farthest-side", "farthest-corner"]
            .iter()
            .any(|keyword| value.is_ident(keyword))
    });
    shaped.then(|| StyleDescriptor::String(to_css(values).to_ascii_lowercase()))
}

/// Spec: <https://www.w3.org/TR/css-images-3/#linear-gradients>
pub(super) fn gradient(converter: &mut Converter<'_>, name: &str, args: &[ComponentValue]) -> Option<StyleDescriptor> {
    let parts = split_commas(args);
    let (first, rest) = parts.split_first()?;
    let (lead, stops) = if name == "linear-gradient" {
        match linear_direction(converter, first)? {
            Some(direction) => (direction, rest),
            None => (StyleDescriptor::string("to bottom"), parts.as_slice()),
        }
    } else {
        match radial_shape(first) {
            Some(shape) => (shape, rest),
            None => (StyleDescriptor::string("ellipse"), parts.as_slice()),
        }
    };
    if stops.len() < 2 {
        converter.warn(WarningKind::Value, format!("{name}({})", to_css(args)));
        return None;
    }
    let mut out = vec![lead];
    for stop in stops {
        out.push(color_stop(converter, stop)?);
    }
    Some(StyleDescriptor::function(name, out))
}

fn image(converter: &mut Converter<'_>, value: &ComponentValue) -> Option<StyleDescriptor> {
    match value {
        ComponentValue::Function { name, args } if is_gradient(name) => gradient(converter, name, args),
        ComponentValue::Function { name, args } if name == "var" => converter.function(name, args),
        ComponentValue::Function { name, .. } => {
            converter.warn(WarningKind::Function, name.as_str());
            None
        }
        _ => {
            converter.warn_token(value);
            None
        }
    }
}

fn background_image(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let layers = split_commas(values);
    if let [[only]] = layers.as_slice()
        && only.is_ident("none")
    {
        out.set(IMAGE_PROPERTY, StyleDescriptor::Array(Vec::new()));
        return;
    }
    let mut images = Vec::new();
    for layer in layers {
        let Some(value) = super::one(converter, layer) else {
            return;
        };
        let Some(parsed) = image(converter, value) else {
            return;
        };
        images.push(parsed);
    }
    out.set(IMAGE_PROPERTY, StyleDescriptor::Array(images));
}

/// Only gradients and a final background color are representable.
fn background(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let mut images = Vec::new();
    let mut color = None;
    for layer in split_commas(values) {
        for value in significant(layer) {
            let parsed = match value {
                ComponentValue::Function { name, args } if is_gradient(name) => {
                    let Some(gradient) = gradient(converter, name, args) else {
                        return;
                    };
                    images.push(gradient);
                    continue;
                }
                _ if color.is_none() => converter.color(value),
                _ => {
                    converter.warn_value(values);
                    return;
                }
            };
            let Some(parsed) = parsed else {
                return;
            };
            color = Some(parsed);
        }
    }
    out.set_some("backgroundColor", color);
    if !images.is_empty() {
        out.set(IMAGE_PROPERTY, StyleDescriptor::Array(images));
    }
}

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    match name {
        "background-image" | "experimental-background-image" => background_image(converter, values, out),
        "background" => background(converter, values, out),
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::parsers::values::var_function;
    use style_ir::StyleDescriptor;

    #[test]
    fn linear_gradients() {
        assert_eq!(
            entries("background-image", "linear-gradient(to right, red, blue 50%)"),
            vec![entry(
                "experimental_backgroundImage",
                StyleDescriptor::Array(vec![StyleDescriptor::function(
                    "linear-gradient",
                    vec![
                        "to right".into(),
                        StyleDescriptor::Array(vec!["#ff0000".into()]),
                        StyleDescriptor::Array(vec!["#0000ff".into(), "50%".into()]),
                    ]
                )])
            )]
        );
    }

    #[test]
    fn radial_gradient_defaults_and_variables() {
        assert_eq!(
            entries("background-image", "radial-gradient(var(--from), white)"),
            vec![entry(
                "experimental_backgroundImage",
                StyleDescriptor::Array(vec![StyleDescriptor::function(
                    "radial-gradient",
                    vec![
                        "ellipse".into(),
                        StyleDescriptor::Array(vec![var_function("from", None)]),
                        StyleDescriptor::Array(vec!["#ffffff".into()]),
                    ]
                )])
            )]
        );
    }

    #[test]
    fn background_shorthand_color() {
        assert_eq!(entries("background", "#123"), vec![entry("backgroundColor", "#112233")]);
        let (entries, warnings) = parse("background", "url(a.png) no-repeat");
        assert!(entries.is_empty());
        assert!(!warnings.is_empty());
    }
}

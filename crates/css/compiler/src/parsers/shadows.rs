//! Shadows and filters.
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/#box-shadow>
//! Spec: <https://www.w3.org/TR/css-text-decor-3/#text-shadow-property>
//! Spec: <https://www.w3.org/TR/filter-effects-1/#FilterProperty>

use super::border::is_length_like;
use super::values::{contains_var, significant, single};
use super::{Converter, Declarations};
use crate::warnings::WarningKind;
use css_syntax::{ComponentValue, split_commas, to_css};
use style_ir::{StyleDescriptor, StyleObject};

/// Parts of one `<shadow>`.
#[derive(Default)]
struct Shadow {
    lengths: Vec<StyleDescriptor>,
    color: Option<StyleDescriptor>,
    inset: bool,
}

/// `inset? && <length>{2,4} && <color>?`.
fn shadow(converter: &mut Converter<'_>, values: &[ComponentValue], allow_inset: bool) -> Option<Shadow> {
    let mut shadow = Shadow::default();
    for value in significant(values) {
        if allow_inset && value.is_ident("inset") && !shadow.inset {
            shadow.inset = true;
        } else if is_length_like(value) && shadow.lengths.len() < 4 {
            shadow.lengths.push(converter.length(value)?);
        } else if shadow.color.is_none() {
            shadow.color = Some(converter.color(value)?);
        } else {
            converter.warn_value(values);
            return None;
        }
    }
    let max = if allow_inset { 4 } else { 3 };
    if shadow.lengths.len() < 2 || shadow.lengths.len() > max {
        converter.warn_value(values);
        return None;
    }
    Some(shadow)
}

/// Shadow groups whose slots are only known after variables resolve.
fn deferred_groups(converter: &mut Converter<'_>, values: &[ComponentValue]) -> Option<Vec<StyleDescriptor>> {
    split_commas(values)
        .into_iter()
        .map(|group| converter.tokens(group).map(StyleDescriptor::Array))
        .collect()
}

fn box_shadow(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    if single(values).is_some_and(|value| value.is_ident("none")) {
        out.set("boxShadow", StyleDescriptor::Array(Vec::new()));
        return;
    }
    if contains_var(values) {
        if let Some(groups) = deferred_groups(converter, values) {
            out.set("boxShadow", StyleDescriptor::function("@boxShadow", groups));
        }
        return;
    }
    let mut shadows = Vec::new();
    for group in split_commas(values) {
        let Some(parsed) = shadow(converter, group, true) else {
            return;
        };
        let mut object = StyleObject::new();
        let names = ["offsetX", "offsetY", "blurRadius", "spreadDistance"];
        for (field, length) in names.into_iter().zip(parsed.lengths) {
            object.insert(field.to_owned(), length);
        }
        if let Some(color) = parsed.color {
            object.insert("color".to_owned(), color);
        }
        if parsed.inset {
            object.insert("inset".to_owned(), StyleDescriptor::Bool(true));
        }
        shadows.push(StyleDescriptor::Object(object));
    }
    out.set("boxShadow", StyleDescriptor::Array(shadows));
}

/// Only the first shadow of a list is representable natively.
fn text_shadow(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    let groups = split_commas(values);
    let Some(first) = groups.first() else {
        return;
    };
    if contains_var(first) {
        if let Some(tokens) = converter.tokens(first) {
            out.set("textShadow", StyleDescriptor::function("@textShadow", tokens));
        }
        return;
    }
    let Some(parsed) = shadow(converter, first, false) else {
        return;
    };
    let mut lengths = parsed.lengths.into_iter();
    let mut offset = StyleObject::new();
    for name in ["width", "height"] {
        if let Some(value) = lengths.next() {
            offset.insert(name.to_owned(), value);
        }
    }
    out.set("textShadowOffset", StyleDescriptor::Object(offset));
    if let Some(radius) = lengths.next() {
        out.set("textShadowRadius", radius);
    }
    out.set_some("textShadowColor", parsed.color);
}

/// One `<filter-function>`.
/// Spec: <https://www.w3.org/TR/filter-effects-1/#filter-functions>
fn filter_function(converter: &mut Converter<'_>, name: &str, args: &[ComponentValue]) -> Option<StyleDescriptor> {
    let key = match name {
        "blur" => "blur",
        "brightness" => "brightness",
        "contrast" => "contrast",
        "grayscale" => "grayscale",
        "hue-rotate" => "hueRotate",
        "invert" => "invert",
        "opacity" => "opacity",
        "saturate" => "saturate",
        "sepia" => "sepia",
        "drop-shadow" => "dropShadow",
        _ => {
            converter.warn(WarningKind::Function, name);
            return None;
        }
    };
    let value = if key == "dropShadow" {
        let parsed = shadow(converter, args, false)?;
        let mut object = StyleObject::new();
        let names = ["offsetX", "offsetY", "standardDeviation"];
        for (field, length) in names.into_iter().zip(parsed.lengths) {
            object.insert(field.to_owned(), length);
        }
        if let Some(color) = parsed.color {
            object.insert("color".to_owned(), color);
        }
        StyleDescriptor::Object(object)
    } else {
        let Some(argument) = single(args) else {
            converter.warn(WarningKind::Value, format!("{name}({})", to_css(args)));
            return None;
        };
        match key {
            "blur" => converter.length(argument)?,
            "hueRotate" => converter.angle(argument)?,
            _ => converter.number_or_percentage(argument)?,
        }
    };
    let mut object = StyleObject::new();
    object.insert(key.to_owned(), value);
    Some(StyleDescriptor::Object(object))
}

/// `none | <filter-function>+`.
fn filter(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    if single(values).is_some_and(|value| value.is_ident("none")) {
        out.set("filter", StyleDescriptor::Array(Vec::new()));
        return;
    }
    let mut functions = Vec::new();
    let mut whole_variable = false;
    for value in significant(values) {
        let parsed = match value {
            ComponentValue::Function { name, args } if name == "var" => {
                whole_variable = true;
                converter.function(name, args)
            }
            ComponentValue::Function { name, args } => filter_function(converter, name, args),
            _ => {
                converter.warn_value(values);
                None
            }
        };
        let Some(parsed) = parsed else {
            return;
        };
        functions.push(parsed);
    }
    if whole_variable {
        out.set("filter", StyleDescriptor::function("@filter", functions));
    } else {
        out.set("filter", StyleDescriptor::Array(functions));
    }
}

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    match name {
        "box-shadow" => box_shadow(converter, values, out),
        "text-shadow" => text_shadow(converter, values, out),
        "filter" => filter(converter, values, out),
        _ => return false,
    }
    true
}

#[allow(clippy::panic, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use style_ir::{StyleDescriptor, StyleObject};

    fn object(pairs: &[(&str, StyleDescriptor)]) -> StyleDescriptor {
        StyleDescriptor::Object(
            pairs
                .iter()
                .map(|(key, value)| ((*key).to_owned(), value.clone()))
                .collect::<StyleObject>(),
        )
    }

    #[test]
    fn box_shadow_lists() {
        assert_eq!(
            entries("box-shadow", "0 2px 4px rgba(0,0,0,0.5), inset 1px 1px red"),
            vec![entry(
                "boxShadow",
                StyleDescriptor::Array(vec![
                    object(&[
                        ("offsetX", 0.0.into()),
                        ("offsetY", 2.0.into()),
                        ("blurRadius", 4.0.into()),
                        ("color", "#00000080".into()),
                    ]),
                    object(&[
                        ("offsetX", 1.0.into()),
                        ("offsetY", 1.0.into()),
                        ("color", "#ff0000".into()),
                        ("inset", true.into()),
                    ]),
                ])
            )]
        );
    }

    #[test]
    fn text_shadow_expands() {
        assert_eq!(
            entries("text-shadow", "1px 2px 3px blue"),
            vec![
                entry(
                    "textShadowOffset",
                    object(&[("width", 1.0.into()), ("height", 2.0.into())])
                ),
                entry("textShadowRadius", 3.0),
                entry("textShadowColor", "#0000ff"),
            ]
        );
    }

    #[test]
    fn variable_shadows_are_deferred() {
        let parsed = entries("box-shadow", "0 0 4px var(--glow)");
        let StyleDescriptor::Function(function) = &parsed[0].1 else {
            panic!("expected a function");
        };
        assert_eq!(function.name, "@boxShadow");
        assert_eq!(function.args.len(), 1);
    }

    #[test]
    fn filters() {
        assert_eq!(
            entries("filter", "blur(2px) hue-rotate(0.25turn) brightness(150%)"),
            vec![entry(
                "filter",
                StyleDescriptor::Array(vec![
                    object(&[("blur", 2.0.into())]),
                    object(&[("hueRotate", "90deg".into())]),
                    object(&[("brightness", 1.5.into())]),
                ])
            )]
        );
    }
}

//! Transforms.
//! Spec: <https://www.w3.org/TR/css-transforms-1/#transform-property>
//! Spec: <https://www.w3.org/TR/css-transforms-2/#individual-transforms>
//!
//! A static `transform` becomes the native list of single-key objects
//! (`[{ translateX: 10 }, { rotate: "45deg" }]`). The individual
//! `translate`, `rotate` and `scale` properties are merged into that list
//! at runtime.

use super::values::{significant, single};
use super::{Converter, Declarations};
use crate::warnings::WarningKind;
use css_syntax::{ComponentValue, split_commas, to_css};
use style_ir::{StyleDescriptor, StyleObject};

fn entry(name: &str, value: StyleDescriptor) -> StyleDescriptor {
    let mut object = StyleObject::new();
    object.insert(name.to_owned(), value);
    StyleDescriptor::Object(object)
}

/// Arguments of a transform function, comma or space separated.
fn arguments(args: &[ComponentValue]) -> Vec<&ComponentValue> {
    split_commas(args)
        .into_iter()
        .flat_map(significant)
        .collect()
}

/// One transform function as its native entries.
/// Spec: <https://www.w3.org/TR/css-transforms-1/#two-d-transform-functions>
fn transform_function(
    converter: &mut Converter<'_>,
    name: &str,
    args: &[ComponentValue],
    out: &mut Vec<StyleDescriptor>,
) -> Option<()> {
    let values = arguments(args);
    match (name, values.as_slice()) {
        ("translate", [x]) => out.push(entry("translateX", converter.length(x)?)),
        ("translate", [x, y]) => {
            out.push(entry("translateX", converter.length(x)?));
            out.push(entry("translateY", converter.length(y)?));
        }
        ("translatex", [x]) => out.push(entry("translateX", converter.length(x)?)),
        ("translatey", [y]) => out.push(entry("translateY", converter.length(y)?)),
        ("scale", [both]) => out.push(entry("scale", converter.number_or_percentage(both)?)),
        ("scale", [x, y]) => {
            let x = converter.number_or_percentage(x)?;
            let y = converter.number_or_percentage(y)?;
            if x == y {
                out.push(entry("scale", x));
            } else {
                out.push(entry("scaleX", x));
                out.push(entry("scaleY", y));
            }
        }
        ("scalex", [x]) => out.push(entry("scaleX", converter.number_or_percentage(x)?)),
        ("scaley", [y]) => out.push(entry("scaleY", converter.number_or_percentage(y)?)),
        ("rotate" | "rotatez", [angle]) => {
            let key = if name == "rotate" { "rotate" } else { "rotateZ" };
            out.push(entry(key, converter.angle(angle)?));
        }
        ("rotatex", [angle]) => out.push(entry("rotateX", converter.angle(angle)?)),
        ("rotatey", [angle]) => out.push(entry("rotateY", converter.angle(angle)?)),
        ("skew", [x]) => out.push(entry("skewX", converter.angle(x)?)),
        ("skew", [x, y]) => {
            out.push(entry("skewX", converter.angle(x)?));
            out.push(entry("skewY", converter.angle(y)?));
        }
        ("skewx", [x]) => out.push(entry("skewX", converter.angle(x)?)),
        ("skewy", [y]) => out.push(entry("skewY", converter.angle(y)?)),
        ("perspective", [depth]) => out.push(entry("perspective", converter.length(depth)?)),
        ("matrix", cells) if cells.len() == 6 => {
            let cells = cells
                .iter()
                .map(|cell| converter.number(cell))
                .collect::<Option<Vec<_>>>()?;
            out.push(entry("matrix", StyleDescriptor::Array(cells)));
        }
        _ => {
            converter.warn(WarningKind::Value, format!("{name}({})", to_css(args)));
            return None;
        }
    }
    Some(())
}

/// `none | <transform-function>+`.
fn transform(converter: &mut Converter<'_>, values: &[ComponentValue], out: &mut Declarations) {
    if single(values).is_some_and(|value| value.is_ident("none")) {
        out.set("transform", StyleDescriptor::Array(Vec::new()));
        return;
    }
    let mut entries = Vec::new();
    let mut whole_variable = false;
    for value in significant(values) {
        match value {
            ComponentValue::Function { name, args } if name == "var" => {
                whole_variable = true;
                let Some(variable) = converter.function(name, args) else {
                    return;
                };
                entries.push(variable);
            }
            ComponentValue::Function { name, args } => {
                if transform_function(converter, name, args, &mut entries).is_none() {
                    return;
                }
            }
            _ => {
                converter.warn_value(values);
                return;
            }
        }
    }
    if whole_variable {
        out.set("transform", StyleDescriptor::function("@transform", entries));
    } else {
        out.set("transform", StyleDescriptor::Array(entries));
    }
}

/// `translate: <x> <y>?`, `rotate: <axis>? <angle>`, `scale: <x> <y>?`.
fn individual(converter: &mut Converter<'_>, name: &str, values: &[ComponentValue], out: &mut Declarations) {
    let parts = significant(values);
    if parts.len() == 1 && parts.first().is_some_and(|value| value.is_ident("none")) {
        out.set(name, StyleDescriptor::function(format!("@{name}"), Vec::new()));
        return;
    }
    let args: Option<Vec<StyleDescriptor>> = match (name, parts.as_slice()) {
        ("translate", [_] | [_, _]) => parts.iter().map(|value| converter.length(value)).collect(),
        ("scale", [_] | [_, _]) => parts
            .iter()
            .map(|value| converter.number_or_percentage(value))
            .collect(),
        ("rotate", [angle]) => converter.angle(angle).map(|angle| vec![angle]),
        ("rotate", [axis, angle]) => match axis.ident().map(str::to_ascii_lowercase).as_deref() {
            Some(axis @ ("x" | "y" | "z")) => converter
                .angle(angle)
                .map(|angle| vec![StyleDescriptor::string(axis), angle]),
            _ => {
                converter.warn_value(values);
                None
            }
        },
        _ => {
            converter.warn_value(values);
            None
        }
    };
    if let Some(args) = args {
        out.set(name, StyleDescriptor::function(format!("@{name}"), args));
    }
}

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    match name {
        "transform" => transform(converter, values, out),
        "translate" | "rotate" | "scale" => individual(converter, name, values, out),
        "transform-origin" => {
            let origin = converter.generic(values);
            out.set_some("transformOrigin", origin);
        }
        _ => return false,
    }
    true
}

#[allow(clippy::panic, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::entry as transform_entry;
    use crate::parsers::values::var_function;
    use style_ir::StyleDescriptor;

    #[test]
    fn static_transforms_are_entry_lists() {
        assert_eq!(
            entries("transform", "translate(10px, 2rem) rotate(0.5turn) scale(2)"),
            vec![entry(
                "transform",
                StyleDescriptor::Array(vec![
                    transform_entry("translateX", 10.0.into()),
                    transform_entry("translateY", 28.0.into()),
                    transform_entry("rotate", "180deg".into()),
                    transform_entry("scale", 2.0.into()),
                ])
            )]
        );
    }

    #[test]
    fn variables_inside_functions_stay_in_place() {
        let parsed = entries("transform", "rotate(var(--spin))");
        assert_eq!(
            parsed,
            vec![entry(
                "transform",
                StyleDescriptor::Array(vec![transform_entry("rotate", var_function("spin", None))])
            )]
        );
    }

    #[test]
    fn whole_variables_defer_to_runtime() {
        let parsed = entries("transform", "var(--t) scale(2)");
        let StyleDescriptor::Function(function) = &parsed[0].1 else {
            panic!("expected a function");
        };
        assert_eq!(function.name, "@transform");
        assert_eq!(function.args.len(), 2);
    }

    #[test]
    fn individual_properties() {
        assert_eq!(
            entries("rotate", "x 90deg"),
            vec![entry(
                "rotate",
                StyleDescriptor::function("@rotate", vec!["x".into(), "90deg".into()])
            )]
        );
        assert_eq!(
            entries("translate", "10px"),
            vec![entry("translate", StyleDescriptor::function("@translate", vec![10.0.into()]))]
        );
    }
}

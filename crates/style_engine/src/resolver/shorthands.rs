//! Shorthands whose slots are only known once their variables resolve.
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/#border-shorthands>
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/#box-shadow>
//! Spec: <https://www.w3.org/TR/css-transforms-2/#individual-transforms>
//! Spec: <https://www.w3.org/TR/filter-effects-1/#FilterProperty>

use super::colors::canonical;
use super::{FunctionKind, Resolved, Resolver, flatten};
use crate::error::StyleError;
use core::slice;
use css_syntax::{ComponentValue, parse_values, split_commas};
use style_ir::{StyleDescriptor, StyleFunction, StyleObject, format_number, round};

const LINE_STYLES: [&str; 3] = ["solid", "dashed", "dotted"];

const TRANSLATE_KEYS: &[&str] = &["translateX", "translateY"];
const ROTATE_KEYS: &[&str] = &["rotate", "rotateX", "rotateY", "rotateZ"];
const SCALE_KEYS: &[&str] = &["scale", "scaleX", "scaleY"];

fn entry(name: &str, value: StyleDescriptor) -> StyleDescriptor {
    let mut object = StyleObject::new();
    object.insert(name.to_owned(), value);
    StyleDescriptor::Object(object)
}

/// Native form of one re-parsed component value.
fn token(value: &ComponentValue) -> StyleDescriptor {
    match value {
        ComponentValue::Number(number) => StyleDescriptor::Number(round(*number)),
        ComponentValue::Dimension { value: number, unit } => match unit.as_str() {
            "px" => StyleDescriptor::Number(round(*number)),
            "deg" => StyleDescriptor::String(format!("{}deg", format_number(round(*number)))),
            "turn" => StyleDescriptor::String(format!("{}deg", format_number(round(number * 360.0)))),
            "grad" => StyleDescriptor::String(format!("{}deg", format_number(round(number * 0.9)))),
            _ => StyleDescriptor::String(value.to_string()),
        },
        ComponentValue::Comma => StyleDescriptor::string(","),
        other => StyleDescriptor::String(other.to_string()),
    }
}

/// Split resolved values into single tokens, re-parsing strings that hold
/// several values (`"2px 4px red"` from a variable).
pub(crate) fn tokens(values: Vec<StyleDescriptor>) -> Vec<StyleDescriptor> {
    let mut out = Vec::new();
    for value in flatten(values) {
        let StyleDescriptor::String(text) = &value else {
            out.push(value);
            continue;
        };
        let parsed = parse_values(text);
        let significant: Vec<&ComponentValue> = parsed.iter().filter(|token| !token.is_whitespace()).collect();
        match significant.as_slice() {
            [single] if !matches!(single, ComponentValue::Number(_) | ComponentValue::Dimension { .. }) => {
                out.push(value);
            }
            _ => out.extend(significant.into_iter().map(token)),
        }
    }
    out
}

/// One transform function written out as text, as native entries.
fn transform_entries(name: &str, args: &[ComponentValue]) -> Option<Vec<StyleDescriptor>> {
    let values: Vec<StyleDescriptor> = split_commas(args)
        .into_iter()
        .flat_map(|part| part.iter().filter(|value| !value.is_whitespace()))
        .map(token)
        .collect();
    let scale = |value: &StyleDescriptor| {
        value.as_str().and_then(|text| text.strip_suffix('%')).map_or_else(
            || Some(value.clone()),
            |percent| {
                percent
                    .parse::<f64>()
                    .ok()
                    .map(|percent| StyleDescriptor::Number(round(percent / 100.0)))
            },
        )
    };
    Some(match (name, values.as_slice()) {
        ("translate", [x]) | ("translatex", [x]) => vec![entry("translateX", x.clone())],
        ("translatey", [y]) => vec![entry("translateY", y.clone())],
        ("translate", [x, y]) => vec![entry("translateX", x.clone()), entry("translateY", y.clone())],
        ("scale", [both]) => vec![entry("scale", scale(both)?)],
        ("scale", [x, y]) => vec![entry("scaleX", scale(x)?), entry("scaleY", scale(y)?)],
        ("scalex", [x]) => vec![entry("scaleX", scale(x)?)],
        ("scaley", [y]) => vec![entry("scaleY", scale(y)?)],
        ("rotate", [angle]) => vec![entry("rotate", angle.clone())],
        ("rotatex", [angle]) => vec![entry("rotateX", angle.clone())],
        ("rotatey", [angle]) => vec![entry("rotateY", angle.clone())],
        ("rotatez", [angle]) => vec![entry("rotateZ", angle.clone())],
        ("skew", [x]) | ("skewx", [x]) => vec![entry("skewX", x.clone())],
        ("skewy", [y]) => vec![entry("skewY", y.clone())],
        ("skew", [x, y]) => vec![entry("skewX", x.clone()), entry("skewY", y.clone())],
        ("perspective", [depth]) => vec![entry("perspective", depth.clone())],
        ("matrix", cells) if cells.len() == 6 => vec![entry("matrix", StyleDescriptor::Array(cells.to_vec()))],
        _ => return None,
    })
}

/// One filter function written out as text.
fn filter_entry(name: &str, args: &[ComponentValue]) -> Option<StyleDescriptor> {
    let significant: Vec<&ComponentValue> = args.iter().filter(|value| !value.is_whitespace()).collect();
    let [argument] = significant.as_slice() else {
        return None;
    };
    let key = match name {
        "hue-rotate" => "hueRotate",
        "blur" | "brightness" | "contrast" | "grayscale" | "invert" | "opacity" | "saturate" | "sepia" => name,
        _ => return None,
    };
    let value = match argument {
        ComponentValue::Percentage(percent) => StyleDescriptor::Number(round(percent / 100.0)),
        other => token(other),
    };
    Some(entry(key, value))
}

/// Objects pass through; strings are parsed as function lists.
fn function_list(
    values: Vec<StyleDescriptor>,
    parse: fn(&str, &[ComponentValue]) -> Option<Vec<StyleDescriptor>>,
) -> StyleDescriptor {
    let mut out = Vec::new();
    for value in flatten(values) {
        match value {
            StyleDescriptor::Object(_) => out.push(value),
            StyleDescriptor::String(text) => {
                for component in parse_values(&text) {
                    match component {
                        ComponentValue::Function { name, args } => match parse(&name, &args) {
                            Some(entries) => out.extend(entries),
                            None => return StyleDescriptor::Undefined,
                        },
                        ComponentValue::Whitespace => {}
                        ComponentValue::Ident(keyword) if keyword.eq_ignore_ascii_case("none") => {}
                        _ => return StyleDescriptor::Undefined,
                    }
                }
            }
            _ => return StyleDescriptor::Undefined,
        }
    }
    StyleDescriptor::Array(out)
}

impl Resolver<'_, '_> {
    fn resolve_all(&self, args: &[StyleDescriptor]) -> Result<Option<Vec<StyleDescriptor>>, StyleError> {
        let mut out = Vec::with_capacity(args.len());
        for argument in args {
            let resolved = self.resolve(argument)?;
            if resolved.is_undefined() {
                return Ok(None);
            }
            out.push(resolved);
        }
        Ok(Some(out))
    }

    /// `@transform(entries...)`.
    pub(super) fn transform(&self, args: &[StyleDescriptor]) -> Result<StyleDescriptor, StyleError> {
        Ok(self
            .resolve_all(args)?
            .map_or(StyleDescriptor::Undefined, |values| function_list(values, transform_entries)))
    }

    /// `@filter(entries...)`.
    pub(super) fn filter(&self, args: &[StyleDescriptor]) -> Result<StyleDescriptor, StyleError> {
        Ok(self.resolve_all(args)?.map_or(StyleDescriptor::Undefined, |values| {
            function_list(values, |name, entry_args| filter_entry(name, entry_args).map(|item| vec![item]))
        }))
    }

    /// `@translate`, `@rotate` and `@scale`, merged into `transform`.
    pub(super) fn individual_transform(
        &self,
        kind: FunctionKind,
        function: &StyleFunction,
    ) -> Result<Resolved, StyleError> {
        let replaces = match kind {
            FunctionKind::Translate => TRANSLATE_KEYS,
            FunctionKind::Rotate => ROTATE_KEYS,
            _ => SCALE_KEYS,
        };
        let Some(args) = self.resolve_all(&function.args)? else {
            return Ok(Resolved::Value(StyleDescriptor::Undefined));
        };
        let entries = match (kind, args.as_slice()) {
            (_, []) => Vec::new(),
            (FunctionKind::Translate, [x]) => vec![entry("translateX", x.clone())],
            (FunctionKind::Translate, [x, y]) => vec![entry("translateX", x.clone()), entry("translateY", y.clone())],
            (FunctionKind::Rotate, [angle]) => vec![entry("rotate", angle.clone())],
            (FunctionKind::Rotate, [axis, angle]) => {
                let key = match axis.as_str() {
                    Some("x") => "rotateX",
                    Some("y") => "rotateY",
                    Some("z") => "rotateZ",
                    _ => return Err(StyleError::invalid("@rotate", "unknown axis")),
                };
                vec![entry(key, angle.clone())]
            }
            (FunctionKind::Scale, [x, y]) if x != y => {
                vec![entry("scaleX", x.clone()), entry("scaleY", y.clone())]
            }
            (FunctionKind::Scale, [x] | [x, _]) => vec![entry("scale", x.clone())],
            _ => return Err(StyleError::invalid(&function.name, "too many arguments")),
        };
        Ok(Resolved::MergeTransform { replaces, entries })
    }

    /// `@border(prefix, tokens...)`: `<line-width> || <line-style> || <color>`.
    pub(super) fn border(&self, function: &StyleFunction) -> Result<Resolved, StyleError> {
        let Some((prefix, args)) = function.args.split_first() else {
            return Err(StyleError::invalid("@border", "missing prefix"));
        };
        let prefix = prefix
            .as_str()
            .ok_or_else(|| StyleError::invalid("@border", "prefix must be a string"))?;
        let style_name = if prefix == "outline" { "outlineStyle" } else { "borderStyle" };
        let Some(values) = self.resolve_all(args)? else {
            return Ok(Resolved::Value(StyleDescriptor::Undefined));
        };
        let mut out = StyleObject::new();
        for value in tokens(values) {
            let slot = match &value {
                StyleDescriptor::Number(_) => format!("{prefix}Width"),
                StyleDescriptor::String(keyword) if LINE_STYLES.contains(&keyword.as_str()) => style_name.to_owned(),
                StyleDescriptor::String(keyword) if matches!(keyword.as_str(), "none" | "hidden") => {
                    out.entry(format!("{prefix}Width")).or_insert(StyleDescriptor::Number(0.0));
                    continue;
                }
                _ => match canonical(&value) {
                    Some(color) => {
                        out.insert(format!("{prefix}Color"), color.into());
                        continue;
                    }
                    None => return Ok(Resolved::Value(StyleDescriptor::Undefined)),
                },
            };
            out.insert(slot, value);
        }
        Ok(Resolved::Expand(out))
    }

    /// `@boxShadow([tokens]...)`, one list per comma separated shadow.
    pub(super) fn box_shadow(&self, args: &[StyleDescriptor]) -> Result<StyleDescriptor, StyleError> {
        let mut all = Vec::new();
        for (index, group) in args.iter().enumerate() {
            let Some(values) = self.resolve_all(slice::from_ref(group))? else {
                return Ok(StyleDescriptor::Undefined);
            };
            if index > 0 {
                all.push(StyleDescriptor::string(","));
            }
            all.extend(tokens(values));
        }
        let mut shadows = Vec::new();
        for group in all.split(|value| value.as_str() == Some(",")) {
            let Some(shadow) = shadow(group, true) else {
                return Ok(StyleDescriptor::Undefined);
            };
            let mut object = StyleObject::new();
            for (name, value) in ["offsetX", "offsetY", "blurRadius", "spreadDistance"]
                .into_iter()
                .zip(shadow.lengths)
            {
                object.insert(name.to_owned(), value);
            }
            if let Some(color) = shadow.color {
                object.insert("color".to_owned(), color.into());
            }
            if shadow.inset {
                object.insert("inset".to_owned(), true.into());
            }
            shadows.push(StyleDescriptor::Object(object));
        }
        Ok(StyleDescriptor::Array(shadows))
    }

    /// `@textShadow(tokens...)`, written to the three native properties.
    pub(super) fn text_shadow(&self, args: &[StyleDescriptor]) -> Result<Resolved, StyleError> {
        let Some(values) = self.resolve_all(args)? else {
            return Ok(Resolved::Value(StyleDescriptor::Undefined));
        };
        let all = tokens(values);
        let Some(shadow) = shadow(&all, false) else {
            return Ok(Resolved::Value(StyleDescriptor::Undefined));
        };
        let mut lengths = shadow.lengths.into_iter();
        let mut offset = StyleObject::new();
        for name in ["width", "height"] {
            if let Some(value) = lengths.next() {
                offset.insert(name.to_owned(), value);
            }
        }
        let mut out = StyleObject::new();
        out.insert("textShadowOffset".to_owned(), StyleDescriptor::Object(offset));
        if let Some(radius) = lengths.next() {
            out.insert("textShadowRadius".to_owned(), radius);
        }
        if let Some(color) = shadow.color {
            out.insert("textShadowColor".to_owned(), color.into());
        }
        Ok(Resolved::Expand(out))
    }
}

struct Shadow {
    lengths: Vec<StyleDescriptor>,
    color: Option<String>,
    inset: bool,
}

/// `inset? && <length>{2,4} && <color>?`.
fn shadow(tokens: &[StyleDescriptor], allow_inset: bool) -> Option<Shadow> {
    let mut shadow = Shadow {
        lengths: Vec::new(),
        color: None,
        inset: false,
    };
    let max = if allow_inset { 4 } else { 3 };
    for token in tokens {
        match token {
            StyleDescriptor::Number(_) if shadow.lengths.len() < max => shadow.lengths.push(token.clone()),
            StyleDescriptor::String(keyword) if allow_inset && keyword == "inset" && !shadow.inset => {
                shadow.inset = true;
            }
            _ if shadow.color.is_none() => shadow.color = Some(canonical(token)?),
            _ => return None,
        }
    }
    (shadow.lengths.len() >= 2).then_some(shadow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_split_into_tokens() {
        let split = tokens(vec!["2px 4px red".into(), StyleDescriptor::Number(1.0)]);
        assert_eq!(
            split,
            vec![
                StyleDescriptor::Number(2.0),
                StyleDescriptor::Number(4.0),
                "red".into(),
                StyleDescriptor::Number(1.0)
            ]
        );
        assert_eq!(tokens(vec!["#ff0000".into()]), vec![StyleDescriptor::from("#ff0000")]);
    }

    #[test]
    fn transform_text_becomes_entries() {
        let list = function_list(vec!["translateX(10px) rotate(0.5turn)".into()], transform_entries);
        assert_eq!(
            list,
            StyleDescriptor::Array(vec![entry("translateX", 10.0.into()), entry("rotate", "180deg".into())])
        );
        assert!(function_list(vec!["wobble(1)".into()], transform_entries).is_undefined());
    }

    #[test]
    fn shadows_need_two_lengths() {
        let parsed = shadow(&tokens(vec!["inset 0 2px 4px blue".into()]), true);
        assert!(parsed.as_ref().is_some_and(|shadow| shadow.inset && shadow.lengths.len() == 3));
        assert_eq!(parsed.and_then(|shadow| shadow.color).as_deref(), Some("#0000ff"));
        assert!(shadow(&tokens(vec!["2px red".into()]), true).is_none());
    }
}

//! Style descriptors: literal values and deferred style functions.

use core::fmt;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap as _, SerializeSeq as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Object-valued descriptor (resolved nested style objects such as `textShadowOffset`).
pub type StyleObject = BTreeMap<String, StyleDescriptor>;

/// A value in the compiled representation.
///
/// The same type is used for literal values produced at compile time, for
/// unresolved expressions (via [`StyleFunction`]) and for fully resolved
/// runtime values.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StyleDescriptor {
    /// Absent value. Serialized as `null`.
    #[default]
    Undefined,
    /// Boolean literal.
    Bool(bool),
    /// Numeric literal (already rounded by the producer).
    Number(f64),
    /// String literal (keywords, colors, percentages).
    String(String),
    /// Ordered list of descriptors (space or comma separated lists).
    Array(Vec<StyleDescriptor>),
    /// Deferred runtime-evaluable expression.
    Function(Box<StyleFunction>),
    /// Nested object, produced by the runtime resolver.
    Object(StyleObject),
}

/// A deferred expression: `[{}, name, args, 1?]` on the wire.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleFunction {
    /// Function name, e.g. `var`, `calc`, `@transform`.
    pub name: String,
    /// Unresolved arguments.
    pub args: Vec<StyleDescriptor>,
    /// Evaluation must wait until the rest of the rule has been applied.
    pub deferred: bool,
}

impl StyleFunction {
    /// Create a non-deferred function call.
    #[inline]
    pub fn new(name: impl Into<String>, args: Vec<StyleDescriptor>) -> Self {
        Self {
            name: name.into(),
            args,
            deferred: false,
        }
    }

    /// Return this function with the deferred flag set.
    #[inline]
    #[must_use]
    pub fn into_deferred(mut self) -> Self {
        self.deferred = true;
        self
    }
}

impl StyleDescriptor {
    /// Shorthand for a function-valued descriptor.
    #[inline]
    pub fn function(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Function(Box::new(StyleFunction::new(name, args)))
    }

    /// Shorthand for a string descriptor.
    #[inline]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    #[inline]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[inline]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_function(&self) -> Option<&StyleFunction> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    /// JavaScript-like truthiness, used for attribute presence tests.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined => false,
            Self::Bool(flag) => *flag,
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::String(text) => !text.is_empty(),
            Self::Array(_) | Self::Function(_) | Self::Object(_) => true,
        }
    }

    /// Whether any function with `name` appears anywhere in this tree.
    pub fn contains_function(&self, name: &str) -> bool {
        match self {
            Self::Function(function) => {
                function.name == name || function.args.iter().any(|arg| arg.contains_function(name))
            }
            Self::Array(items) => items.iter().any(|item| item.contains_function(name)),
            Self::Object(map) => map.values().any(|item| item.contains_function(name)),
            _ => false,
        }
    }

    /// Whether this tree contains any function call at all.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::Function(_) => true,
            Self::Array(items) => items.iter().any(Self::is_dynamic),
            Self::Object(map) => map.values().any(Self::is_dynamic),
            _ => false,
        }
    }

    /// Whether this tree references the variable `name` through `var()`.
    pub fn references_variable(&self, name: &str) -> bool {
        match self {
            Self::Function(function) => {
                (function.name == "var"
                    && function.args.first().and_then(Self::as_str) == Some(name))
                    || function.args.iter().any(|arg| arg.references_variable(name))
            }
            Self::Array(items) => items.iter().any(|item| item.references_variable(name)),
            Self::Object(map) => map.values().any(|item| item.references_variable(name)),
            _ => false,
        }
    }
}

impl From<f64> for StyleDescriptor {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for StyleDescriptor {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for StyleDescriptor {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for StyleDescriptor {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<StyleFunction> for StyleDescriptor {
    #[inline]
    fn from(value: StyleFunction) -> Self {
        Self::Function(Box::new(value))
    }
}

impl From<Vec<Self>> for StyleDescriptor {
    #[inline]
    fn from(value: Vec<Self>) -> Self {
        Self::Array(value)
    }
}

/// Format a number the way it appears in CSS text: integral values without a
/// fractional part, everything else with the shortest representation.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

impl fmt::Display for StyleDescriptor {
    /// Space-joined textual form, used when a resolved value has to be
    /// turned back into a CSS-like string (e.g. `join`, transform strings).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => Ok(()),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::String(text) => f.write_str(text),
            Self::Array(items) => {
                let mut first = true;
                for item in items {
                    if !first {
                        f.write_str(" ")?;
                    }
                    first = false;
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Function(function) => {
                write!(f, "{}(", function.name)?;
                let mut first = true;
                for arg in &function.args {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::Object(_) => f.write_str("[object]"),
        }
    }
}

impl Serialize for StyleDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Undefined => serializer.serialize_unit(),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    serializer.serialize_i64(*value as i64)
                } else {
                    serializer.serialize_f64(*value)
                }
            }
            Self::String(text) => serializer.serialize_str(text),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Function(function) => function.serialize(serializer),
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

/// The `{}` tag that opens every serialized function tuple.
struct EmptyTag;

impl Serialize for EmptyTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

impl Serialize for StyleFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.deferred { 4 } else { 3 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&EmptyTag)?;
        seq.serialize_element(&self.name)?;
        seq.serialize_element(&self.args)?;
        if self.deferred {
            seq.serialize_element(&1u8)?;
        }
        seq.end()
    }
}

struct DescriptorVisitor;

impl<'de> Visitor<'de> for DescriptorVisitor {
    type Value = StyleDescriptor;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a style descriptor")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(StyleDescriptor::Undefined)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(StyleDescriptor::Undefined)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        StyleDescriptor::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(StyleDescriptor::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(StyleDescriptor::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(StyleDescriptor::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(StyleDescriptor::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(StyleDescriptor::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(StyleDescriptor::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items: Vec<StyleDescriptor> = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<StyleDescriptor>()? {
            items.push(item);
        }
        Ok(function_from_items(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut out = StyleObject::new();
        while let Some((key, value)) = map.next_entry::<String, StyleDescriptor>()? {
            out.insert(key, value);
        }
        Ok(StyleDescriptor::Object(out))
    }
}

/// Recognize the `[{}, name, args, 1?]` function shape in a decoded array.
fn function_from_items(items: Vec<StyleDescriptor>) -> StyleDescriptor {
    let is_function = (3..=4).contains(&items.len())
        && matches!(items.first(), Some(StyleDescriptor::Object(tag)) if tag.is_empty())
        && matches!(items.get(1), Some(StyleDescriptor::String(_)))
        && matches!(items.get(2), Some(StyleDescriptor::Array(_)));
    if !is_function {
        return StyleDescriptor::Array(items);
    }
    let mut iter = items.into_iter().skip(1);
    let name = match iter.next() {
        Some(StyleDescriptor::String(name)) => name,
        _ => String::new(),
    };
    let args = match iter.next() {
        Some(StyleDescriptor::Array(args)) => args,
        _ => Vec::new(),
    };
    let deferred = iter.next().is_some_and(|flag| flag.is_truthy());
    StyleDescriptor::Function(Box::new(StyleFunction {
        name,
        args,
        deferred,
    }))
}

impl<'de> Deserialize<'de> for StyleDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DescriptorVisitor)
    }
}

impl<'de> Deserialize<'de> for StyleFunction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StyleDescriptor::deserialize(deserializer)? {
            StyleDescriptor::Function(function) => Ok(*function),
            _ => Err(de::Error::custom("expected a [{}, name, args] function tuple")),
        }
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_wire_shape() {
        let function = StyleFunction::new("var", vec!["test".into()]).into_deferred();
        let json = serde_json::to_string(&StyleDescriptor::from(function)).unwrap();
        assert_eq!(json, r#"[{},"var",["test"],1]"#);
        let back: StyleDescriptor = serde_json::from_str(&json).unwrap();
        assert!(back.contains_function("var"));
        assert!(back.references_variable("test"));
        assert!(back.as_function().unwrap().deferred);
    }

    #[test]
    fn integral_numbers_serialize_without_fraction() {
        let value = StyleDescriptor::Array(vec![10.0.into(), 1.5.into(), StyleDescriptor::Undefined]);
        assert_eq!(serde_json::to_string(&value).unwrap(), "[10,1.5,null]");
    }

    #[test]
    fn plain_arrays_are_not_functions() {
        let value: StyleDescriptor = serde_json::from_str(r#"["a","b",[]]"#).unwrap();
        assert!(matches!(value, StyleDescriptor::Array(ref items) if items.len() == 3));
    }

    #[test]
    fn display_joins_with_spaces() {
        let value = StyleDescriptor::Array(vec![1.0.into(), "solid".into(), "#ff0000".into()]);
        assert_eq!(value.to_string(), "1 solid #ff0000");
    }
}

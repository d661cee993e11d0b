//! Style declarations: the static fast path and path-addressed dynamic entries.

use crate::descriptor::{StyleDescriptor, StyleObject};
use core::fmt;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeSeq as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where a declaration's value is written in the target object.
///
/// A nested path whose first segment is `^` is anchored at the top-level
/// props object instead of the rule's target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyPath {
    /// A single property name.
    Name(String),
    /// A list of nested segments.
    Nested(Vec<String>),
}

impl PropertyPath {
    /// Anchor marker for paths that attach to the props root.
    pub const ANCHOR: &'static str = "^";

    /// Build a path from `a.b.c` notation; a single segment stays a name.
    pub fn from_dotted(path: &str) -> Self {
        if path.contains('.') {
            Self::Nested(path.split('.').map(str::to_owned).collect())
        } else {
            Self::Name(path.to_owned())
        }
    }

    /// Path anchored at the props root, e.g. `^numberOfLines`.
    pub fn anchored(segments: &[&str]) -> Self {
        let mut out = Vec::with_capacity(segments.len() + 1);
        out.push(Self::ANCHOR.to_owned());
        out.extend(segments.iter().map(|segment| (*segment).to_owned()));
        Self::Nested(out)
    }

    /// Borrowed view of every segment, including a leading anchor.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Name(name) => vec![name.as_str()],
            Self::Nested(parts) => parts.iter().map(String::as_str).collect(),
        }
    }

    #[inline]
    pub fn is_anchored(&self) -> bool {
        matches!(self, Self::Nested(parts) if parts.first().map(String::as_str) == Some(Self::ANCHOR))
    }

    /// Final segment, i.e. the property that is actually assigned.
    pub fn leaf(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Nested(parts) => parts.last().map_or("", String::as_str),
        }
    }
}

impl From<&str> for PropertyPath {
    #[inline]
    fn from(value: &str) -> Self {
        Self::from_dotted(value)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("."))
    }
}

/// A path-addressed, possibly deferred declaration: `[value, path, 1?]`.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicDeclaration {
    pub value: StyleDescriptor,
    pub path: PropertyPath,
    pub deferred: bool,
}

/// One entry of [`crate::StyleRule`]'s declaration list.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleDeclaration {
    /// Literal property assignments, applied in one go.
    Static(StyleObject),
    /// Value that needs runtime resolution or nested assignment.
    Dynamic(DynamicDeclaration),
}

impl StyleDeclaration {
    /// Construct a dynamic declaration.
    #[inline]
    pub fn dynamic(value: StyleDescriptor, path: PropertyPath, deferred: bool) -> Self {
        Self::Dynamic(DynamicDeclaration {
            value,
            path,
            deferred,
        })
    }
}

impl Serialize for StyleDeclaration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Static(object) => object.serialize(serializer),
            Self::Dynamic(declaration) => {
                let len = if declaration.deferred { 3 } else { 2 };
                let mut seq = serializer.serialize_seq(Some(len))?;
                seq.serialize_element(&declaration.value)?;
                seq.serialize_element(&declaration.path)?;
                if declaration.deferred {
                    seq.serialize_element(&1u8)?;
                }
                seq.end()
            }
        }
    }
}

struct DeclarationVisitor;

impl<'de> Visitor<'de> for DeclarationVisitor {
    type Value = StyleDeclaration;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a declaration object or a [value, path, deferred?] tuple")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut object = StyleObject::new();
        while let Some((key, value)) = map.next_entry::<String, StyleDescriptor>()? {
            object.insert(key, value);
        }
        Ok(StyleDeclaration::Static(object))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let value = seq
            .next_element::<StyleDescriptor>()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let path = seq
            .next_element::<PropertyPath>()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let deferred = seq
            .next_element::<StyleDescriptor>()?
            .is_some_and(|flag| flag.is_truthy());
        Ok(StyleDeclaration::dynamic(value, path, deferred))
    }
}

impl<'de> Deserialize<'de> for StyleDeclaration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DeclarationVisitor)
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_declaration_tuple() {
        let declaration = StyleDeclaration::dynamic(
            StyleDescriptor::function("em", vec![2.0.into()]),
            PropertyPath::from_dotted("textShadowOffset.width"),
            true,
        );
        let json = serde_json::to_string(&declaration).unwrap();
        assert_eq!(json, r#"[[{},"em",[2]],["textShadowOffset","width"],1]"#);
        assert_eq!(serde_json::from_str::<StyleDeclaration>(&json).unwrap(), declaration);
    }

    #[test]
    fn anchored_paths() {
        let path = PropertyPath::anchored(&["numberOfLines"]);
        assert!(path.is_anchored());
        assert_eq!(path.leaf(), "numberOfLines");
        assert!(!PropertyPath::from("color").is_anchored());
    }
}

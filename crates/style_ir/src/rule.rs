//! Style rules, variable alternatives and keyframe tables.

use crate::declaration::{PropertyPath, StyleDeclaration};
use crate::descriptor::StyleDescriptor;
use crate::is_false;
use crate::media::{AttributeQuery, ContainerQuery, MediaCondition, PseudoClassesQuery};
use crate::specificity::Specificity;
use core::fmt;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One compiled unit of conditioned declarations for a single class name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    #[serde(rename = "s")]
    pub specificity: Specificity,
    #[serde(rename = "d", default, skip_serializing_if = "Vec::is_empty")]
    pub declarations: Vec<StyleDeclaration>,
    /// Custom properties declared by this rule, names without `--`.
    #[serde(rename = "v", default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<(String, StyleDescriptor)>,
    /// Media conditions that must all hold.
    #[serde(rename = "m", default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaCondition>,
    #[serde(rename = "cq", default, skip_serializing_if = "Vec::is_empty")]
    pub container_queries: Vec<ContainerQuery>,
    /// Container names the matching element registers itself as.
    #[serde(rename = "c", default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<String>,
    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    pub pseudo_classes: Option<PseudoClassesQuery>,
    #[serde(rename = "aq", default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeQuery>,
    /// Declarations involve animations or transitions.
    #[serde(rename = "a", default, skip_serializing_if = "is_false")]
    pub animated: bool,
    /// Declarations reference variables.
    #[serde(rename = "dv", default, skip_serializing_if = "is_false")]
    pub dynamic_variables: bool,
    /// Prop the declarations are written to, defaults to `style`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PropertyPath>,
}

impl StyleRule {
    /// Whether the rule carries anything worth emitting.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
            && self.variables.is_empty()
            && self.containers.is_empty()
            && !self.animated
    }

    /// Whether matching the rule depends on runtime interaction state.
    pub fn has_pseudo_classes(&self) -> bool {
        self.pseudo_classes.is_some_and(|pseudo| !pseudo.is_empty())
    }
}

/// One alternative of a root or universal variable: `[value, media?]`.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableValue {
    pub value: StyleDescriptor,
    pub media: Option<MediaCondition>,
}

impl VariableValue {
    #[inline]
    pub const fn unconditioned(value: StyleDescriptor) -> Self {
        Self { value, media: None }
    }
}

impl Serialize for VariableValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1 + usize::from(self.media.is_some())))?;
        seq.serialize_element(&self.value)?;
        if let Some(media) = &self.media {
            seq.serialize_element(media)?;
        }
        seq.end()
    }
}

struct VariableValueVisitor;

impl<'de> Visitor<'de> for VariableValueVisitor {
    type Value = VariableValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a [value, media?] tuple")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let value = seq
            .next_element::<StyleDescriptor>()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let media = seq.next_element::<MediaCondition>()?;
        Ok(VariableValue { value, media })
    }
}

impl<'de> Deserialize<'de> for VariableValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(VariableValueVisitor)
    }
}

/// A keyframe step: progress in `0..=1` and its declarations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe(pub f64, pub Vec<StyleDeclaration>);

/// Compiled `@keyframes` block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrames {
    /// Steps sorted by progress.
    #[serde(rename = "p", default)]
    pub frames: Vec<Keyframe>,
    /// Per-step `animation-timing-function` overrides as `[progress, easing]`.
    #[serde(rename = "e", default, skip_serializing_if = "Vec::is_empty")]
    pub easing: Vec<(f64, StyleDescriptor)>,
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_omitted() {
        let rule = StyleRule {
            specificity: Specificity {
                order: 1,
                class_name: 1,
                ..Specificity::ZERO
            },
            containers: vec!["parent".into()],
            ..StyleRule::default()
        };
        assert_eq!(serde_json::to_string(&rule).unwrap(), r#"{"s":[1,1],"c":["parent"]}"#);
    }

    #[test]
    fn variable_value_tuple() {
        let value = VariableValue {
            value: "black".into(),
            media: Some(MediaCondition::equals("prefers-color-scheme", "dark")),
        };
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"["black",["=","prefers-color-scheme","dark"]]"#);
        assert_eq!(serde_json::from_str::<VariableValue>(&json).unwrap(), value);
    }
}

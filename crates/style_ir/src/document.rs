//! The compiled rule-set document.

use crate::rule::{AnimationFrames, StyleRule, VariableValue};
use serde::{Deserialize, Serialize};

/// Output of the compiler and input of the runtime store.
///
/// Every table is an ordered list of `[key, value]` pairs so the document
/// round-trips through JSON without reordering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSetDocument {
    /// Rules grouped by class name, each list sorted by specificity.
    #[serde(rename = "s", default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<(String, Vec<StyleRule>)>,
    /// Keyframes by animation name.
    #[serde(rename = "k", default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<(String, AnimationFrames)>,
    /// `:root` variables.
    #[serde(rename = "vr", default, skip_serializing_if = "Vec::is_empty")]
    pub root_variables: Vec<(String, Vec<VariableValue>)>,
    /// `*` variables.
    #[serde(rename = "vu", default, skip_serializing_if = "Vec::is_empty")]
    pub universal_variables: Vec<(String, Vec<VariableValue>)>,
}

impl RuleSetDocument {
    /// Rules registered for `class_name`.
    pub fn rules_for(&self, class_name: &str) -> Option<&[StyleRule]> {
        self.rules
            .iter()
            .find(|(name, _)| name == class_name)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
            && self.keyframes.is_empty()
            && self.root_variables.is_empty()
            && self.universal_variables.is_empty()
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    /// Fails only if a custom serializer rejects a value.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to indented JSON.
    ///
    /// # Errors
    /// As [`RuleSetDocument::to_json`].
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// # Errors
    /// Returns the `serde_json` error when `text` is not a rule-set document.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Keyframe, StyleDeclaration, StyleDescriptor, StyleObject};

    #[test]
    fn document_round_trips() {
        let mut object = StyleObject::new();
        object.insert("opacity".into(), StyleDescriptor::Number(0.0));
        let document = RuleSetDocument {
            rules: vec![("box".into(), vec![StyleRule::default()])],
            keyframes: vec![(
                "fade".into(),
                AnimationFrames {
                    frames: vec![Keyframe(0.0, vec![StyleDeclaration::Static(object)])],
                    easing: Vec::new(),
                },
            )],
            root_variables: vec![("main".into(), vec![VariableValue::unconditioned("red".into())])],
            universal_variables: Vec::new(),
        };
        let json = document.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"s":[["box",[{"s":[]}]]],"k":[["fade",{"p":[[0.0,[{"opacity":0}]]]}]],"vr":[["main",[["red"]]]]}"#
        );
        assert_eq!(RuleSetDocument::from_json(&json).unwrap(), document);
        assert!(RuleSetDocument::default().to_json().unwrap() == "{}");
    }
}

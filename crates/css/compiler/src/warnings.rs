//! Non-fatal diagnostics collected while compiling.

use serde::Serialize;
use std::collections::BTreeMap;

/// What was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// The property itself is not supported.
    Property,
    /// The property is supported but this value is not.
    Value,
    /// A function call inside the value is not supported.
    Function,
}

/// One dropped declaration, value or function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    /// CSS property the warning was raised for.
    pub property: String,
    /// Offending token (value text or function name).
    pub detail: String,
}

/// Deduplicated warnings grouped by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Warnings {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
    /// Property name to the values that were rejected for it.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,
}

/// Minimal `*`-only glob matching.
pub(crate) fn glob_matches(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

impl Warnings {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.values.is_empty() && self.functions.is_empty()
    }

    /// Record a warning unless its property matches an ignore pattern.
    pub(crate) fn record(&mut self, warning: Warning, ignored: &[String]) {
        if ignored
            .iter()
            .any(|pattern| glob_matches(pattern, &warning.property))
        {
            return;
        }
        let push_unique = |list: &mut Vec<String>, item: String| {
            if !list.contains(&item) {
                list.push(item);
            }
        };
        match warning.kind {
            WarningKind::Property => push_unique(&mut self.properties, warning.property),
            WarningKind::Value => {
                push_unique(self.values.entry(warning.property).or_default(), warning.detail);
            }
            WarningKind::Function => push_unique(&mut self.functions, warning.detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(kind: WarningKind, property: &str, detail: &str) -> Warning {
        Warning {
            kind,
            property: property.to_owned(),
            detail: detail.to_owned(),
        }
    }

    #[test]
    fn globs() {
        assert!(glob_matches("*", "anything"));
        assert!(glob_matches("-webkit-*", "-webkit-appearance"));
        assert!(glob_matches("*-color", "scrollbar-color"));
        assert!(glob_matches("a*c*e", "abcde"));
        assert!(!glob_matches("grid-*", "gap"));
        assert!(glob_matches("gap", "gap"));
    }

    #[test]
    fn records_are_grouped_and_deduplicated() {
        let mut warnings = Warnings::default();
        let ignored = vec!["-webkit-*".to_owned()];
        warnings.record(warning(WarningKind::Property, "float", ""), &ignored);
        warnings.record(warning(WarningKind::Property, "float", ""), &ignored);
        warnings.record(warning(WarningKind::Property, "-webkit-appearance", ""), &ignored);
        warnings.record(warning(WarningKind::Value, "display", "grid"), &ignored);
        warnings.record(warning(WarningKind::Function, "width", "attr"), &ignored);
        assert_eq!(warnings.properties, vec!["float".to_owned()]);
        assert_eq!(warnings.values["display"], vec!["grid".to_owned()]);
        assert_eq!(warnings.functions, vec!["attr".to_owned()]);
    }
}

//! Condition trees: media conditions, pseudo-class flags, attribute and container queries.

use crate::descriptor::StyleDescriptor;
use crate::is_false;
use core::fmt;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Comparison operator used by media features.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEqual,
}

impl ComparisonOp {
    /// Parse `=`, `>`, `>=`, `<`, `<=`.
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "=" => Self::Equal,
            ">" => Self::Greater,
            ">=" => Self::GreaterEqual,
            "<" => Self::Less,
            "<=" => Self::LessEqual,
            _ => return None,
        })
    }

    /// Operator with both sides swapped (`a < b` ⇔ `b > a`).
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Equal => Self::Equal,
            Self::Greater => Self::Less,
            Self::GreaterEqual => Self::LessEqual,
            Self::Less => Self::Greater,
            Self::LessEqual => Self::GreaterEqual,
        }
    }

    /// Apply the operator to two numbers.
    #[inline]
    #[allow(clippy::float_cmp, reason = "`=` in a size query is an exact match")]
    pub fn test(self, left: f64, right: f64) -> bool {
        match self {
            Self::Equal => left == right,
            Self::Greater => left > right,
            Self::GreaterEqual => left >= right,
            Self::Less => left < right,
            Self::LessEqual => left <= right,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
        }
    }
}

/// Media condition tree.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaCondition {
    /// `["!", cond]`
    Not(Box<MediaCondition>),
    /// `["&", [cond...]]`
    And(Vec<MediaCondition>),
    /// `["|", [cond...]]`
    Or(Vec<MediaCondition>),
    /// `["!!", feature]`
    Boolean(String),
    /// `[op, feature, value]`
    Compare {
        op: ComparisonOp,
        feature: String,
        value: StyleDescriptor,
    },
    /// `["[]", feature, start, startOp, end, endOp]`, i.e. `start startOp feature endOp end`.
    Range {
        feature: String,
        start: StyleDescriptor,
        start_op: ComparisonOp,
        end: StyleDescriptor,
        end_op: ComparisonOp,
    },
}

impl MediaCondition {
    /// `feature = value` shorthand.
    pub fn equals(feature: &str, value: impl Into<StyleDescriptor>) -> Self {
        Self::Compare {
            op: ComparisonOp::Equal,
            feature: feature.to_owned(),
            value: value.into(),
        }
    }

    /// Combine a list of conditions into one; `None` when the list is empty.
    pub fn all(mut conditions: Vec<Self>) -> Option<Self> {
        match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(Self::And(conditions)),
        }
    }
}

impl Serialize for MediaCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Not(inner) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("!")?;
                seq.serialize_element(inner)?;
                seq.end()
            }
            Self::And(items) | Self::Or(items) => {
                let tag = if matches!(self, Self::And(_)) { "&" } else { "|" };
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(tag)?;
                seq.serialize_element(items)?;
                seq.end()
            }
            Self::Boolean(feature) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("!!")?;
                seq.serialize_element(feature)?;
                seq.end()
            }
            Self::Compare { op, feature, value } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(op)?;
                seq.serialize_element(feature)?;
                seq.serialize_element(value)?;
                seq.end()
            }
            Self::Range {
                feature,
                start,
                start_op,
                end,
                end_op,
            } => {
                let mut seq = serializer.serialize_seq(Some(6))?;
                seq.serialize_element("[]")?;
                seq.serialize_element(feature)?;
                seq.serialize_element(start)?;
                seq.serialize_element(start_op)?;
                seq.serialize_element(end)?;
                seq.serialize_element(end_op)?;
                seq.end()
            }
        }
    }
}

struct MediaVisitor;

impl MediaVisitor {
    fn next<'de, T: Deserialize<'de>, A: SeqAccess<'de>>(
        &self,
        seq: &mut A,
        index: usize,
    ) -> Result<T, A::Error> {
        seq.next_element::<T>()?
            .ok_or_else(|| de::Error::invalid_length(index, self))
    }
}

impl<'de> Visitor<'de> for MediaVisitor {
    type Value = MediaCondition;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a media condition tuple")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let tag: String = self.next(&mut seq, 0)?;
        let condition = match tag.as_str() {
            "!" => MediaCondition::Not(Box::new(self.next(&mut seq, 1)?)),
            "&" => MediaCondition::And(self.next(&mut seq, 1)?),
            "|" => MediaCondition::Or(self.next(&mut seq, 1)?),
            "!!" => MediaCondition::Boolean(self.next(&mut seq, 1)?),
            "[]" => MediaCondition::Range {
                feature: self.next(&mut seq, 1)?,
                start: self.next(&mut seq, 2)?,
                start_op: self.next(&mut seq, 3)?,
                end: self.next(&mut seq, 4)?,
                end_op: self.next(&mut seq, 5)?,
            },
            other => {
                let op = ComparisonOp::parse(other)
                    .ok_or_else(|| de::Error::unknown_variant(other, &["!", "&", "|", "!!", "[]", "=", ">", ">=", "<", "<="]))?;
                MediaCondition::Compare {
                    op,
                    feature: self.next(&mut seq, 1)?,
                    value: self.next(&mut seq, 2)?,
                }
            }
        };
        Ok(condition)
    }
}

impl<'de> Deserialize<'de> for MediaCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(MediaVisitor)
    }
}

/// Interaction state a rule requires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PseudoClassesQuery {
    #[serde(default, skip_serializing_if = "is_false")]
    pub hover: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub focus: bool,
}

impl PseudoClassesQuery {
    #[inline]
    pub const fn is_empty(&self) -> bool {
        !self.hover && !self.active && !self.focus
    }

    #[inline]
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            hover: self.hover || other.hover,
            active: self.active || other.active,
            focus: self.focus || other.focus,
        }
    }
}

/// Source of an attribute query.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Direct component prop.
    #[serde(rename = "a")]
    Attribute,
    /// `dataSet` entry.
    #[serde(rename = "d")]
    Dataset,
}

/// Attribute selector operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeOperator {
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "~=")]
    Includes,
    #[serde(rename = "|=")]
    DashMatch,
    #[serde(rename = "^=")]
    Prefix,
    #[serde(rename = "$=")]
    Suffix,
    #[serde(rename = "*=")]
    Substring,
    /// Value must be falsy.
    #[serde(rename = "!")]
    Falsy,
}

impl AttributeOperator {
    /// Test `actual` against `expected` with CSS attribute-selector semantics.
    pub fn test(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::Includes => actual.split_whitespace().any(|word| word == expected),
            Self::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix => !expected.is_empty() && actual.starts_with(expected),
            Self::Suffix => !expected.is_empty() && actual.ends_with(expected),
            Self::Substring => !expected.is_empty() && actual.contains(expected),
            Self::Falsy => false,
        }
    }
}

/// `[kind, name, operator?, value?]`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeQuery {
    pub kind: AttributeKind,
    pub name: String,
    pub operator: Option<AttributeOperator>,
    pub value: Option<String>,
}

impl AttributeQuery {
    /// Prop truthiness test (`[disabled]`, `:disabled`).
    pub fn present(kind: AttributeKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
            operator: None,
            value: None,
        }
    }

    /// Comparison against a string value.
    pub fn compare(kind: AttributeKind, name: &str, operator: AttributeOperator, value: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
            operator: Some(operator),
            value: Some(value.to_owned()),
        }
    }
}

impl Serialize for AttributeQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2 + usize::from(self.operator.is_some()) + usize::from(self.value.is_some());
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.kind)?;
        seq.serialize_element(&self.name)?;
        if let Some(operator) = &self.operator {
            seq.serialize_element(operator)?;
        }
        if let Some(value) = &self.value {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

struct AttributeVisitor;

impl<'de> Visitor<'de> for AttributeVisitor {
    type Value = AttributeQuery;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an attribute query tuple")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let kind = seq
            .next_element::<AttributeKind>()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let name = seq
            .next_element::<String>()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let operator = seq.next_element::<AttributeOperator>()?;
        let value = seq.next_element::<String>()?;
        Ok(AttributeQuery {
            kind,
            name,
            operator,
            value,
        })
    }
}

impl<'de> Deserialize<'de> for AttributeQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(AttributeVisitor)
    }
}

/// Condition on a named ancestor container.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerQuery {
    /// Container name; `None` targets the nearest container.
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Size condition evaluated against the container's layout.
    #[serde(rename = "m", default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaCondition>,
    /// Interaction state of the container element.
    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    pub pseudo_classes: Option<PseudoClassesQuery>,
    /// Props of the container element.
    #[serde(rename = "a", default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeQuery>>,
}

impl ContainerQuery {
    /// Existence-only query for the container `name`.
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Self::default()
        }
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_tree_wire_shape() {
        let condition = MediaCondition::And(vec![
            MediaCondition::equals("prefers-color-scheme", "dark"),
            MediaCondition::Not(Box::new(MediaCondition::Boolean("hover".into()))),
            MediaCondition::Range {
                feature: "width".into(),
                start: 100.0.into(),
                start_op: ComparisonOp::LessEqual,
                end: 400.0.into(),
                end_op: ComparisonOp::Less,
            },
        ]);
        let json = serde_json::to_string(&condition).unwrap();
        assert_eq!(
            json,
            r#"["&",[["=","prefers-color-scheme","dark"],["!",["!!","hover"]],["[]","width",100,"<=",400,"<"]]]"#
        );
        assert_eq!(serde_json::from_str::<MediaCondition>(&json).unwrap(), condition);
    }

    #[test]
    fn attribute_operators() {
        assert!(AttributeOperator::Includes.test("a b c", "b"));
        assert!(AttributeOperator::DashMatch.test("en-US", "en"));
        assert!(!AttributeOperator::Prefix.test("abc", ""));
        let query = AttributeQuery::compare(AttributeKind::Attribute, "className", AttributeOperator::Substring, "b");
        assert_eq!(serde_json::to_string(&query).unwrap(), r#"["a","className","*=","b"]"#);
    }

    #[test]
    fn container_query_keys() {
        let query = ContainerQuery::named("parent");
        assert_eq!(serde_json::to_string(&query).unwrap(), r#"{"n":"parent"}"#);
    }
}

//! Specificity vectors used to rank competing rules.
//!
//! Wire layout: `[order, className, important, inline, pseudoElement, pseudoClass]`
//! with trailing zeros trimmed.

use core::cmp::Ordering;
use core::fmt;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Specificity {
    /// Monotonic source order of the rule.
    pub order: u32,
    /// Number of classes and attribute selectors.
    pub class_name: u32,
    /// `1` for `!important` declarations.
    pub important: u32,
    /// `1` for inline styles applied at runtime.
    pub inline: u32,
    pub pseudo_element: u32,
    /// Number of pseudo-classes.
    pub pseudo_class: u32,
}

impl Specificity {
    /// Specificity of a rule registered purely as a marker (container names, sentinels).
    pub const ZERO: Self = Self {
        order: 0,
        class_name: 0,
        important: 0,
        inline: 0,
        pseudo_element: 0,
        pseudo_class: 0,
    };

    /// Component-wise sum of the selector parts, keeping `self.order`.
    #[inline]
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self {
            order: self.order,
            class_name: self.class_name + other.class_name,
            important: self.important + other.important,
            inline: self.inline + other.inline,
            pseudo_element: self.pseudo_element + other.pseudo_element,
            pseudo_class: self.pseudo_class + other.pseudo_class,
        }
    }

    /// Classes, attributes and pseudo-classes rank together.
    const fn class_tier(self) -> u32 {
        self.class_name.saturating_add(self.pseudo_class)
    }

    fn as_array(self) -> [u32; 6] {
        [
            self.order,
            self.class_name,
            self.important,
            self.inline,
            self.pseudo_element,
            self.pseudo_class,
        ]
    }

    fn from_slots(slots: &[u32]) -> Self {
        let slot = |index: usize| slots.get(index).copied().unwrap_or(0);
        Self {
            order: slot(0),
            class_name: slot(1),
            important: slot(2),
            inline: slot(3),
            pseudo_element: slot(4),
            pseudo_class: slot(5),
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.important
            .cmp(&other.important)
            .then_with(|| self.inline.cmp(&other.inline))
            .then_with(|| self.pseudo_element.cmp(&other.pseudo_element))
            .then_with(|| self.class_tier().cmp(&other.class_tier()))
            .then_with(|| self.order.cmp(&other.order))
            .then_with(|| self.pseudo_class.cmp(&other.pseudo_class))
    }
}

impl PartialOrd for Specificity {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Specificity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let slots = self.as_array();
        let used = slots.iter().rposition(|slot| *slot != 0).map_or(0, |index| index + 1);
        let mut seq = serializer.serialize_seq(Some(used))?;
        for slot in slots.iter().take(used) {
            seq.serialize_element(slot)?;
        }
        seq.end()
    }
}

struct SpecificityVisitor;

impl<'de> Visitor<'de> for SpecificityVisitor {
    type Value = Specificity;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a specificity array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut slots: Vec<u32> = Vec::with_capacity(6);
        while let Some(slot) = seq.next_element::<f64>()? {
            slots.push(slot.max(0.0) as u32);
        }
        Ok(Specificity::from_slots(&slots))
    }
}

impl<'de> Deserialize<'de> for Specificity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(SpecificityVisitor)
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn important_beats_everything() {
        let important = Specificity {
            important: 1,
            ..Specificity::ZERO
        };
        let inline = Specificity {
            inline: 1,
            class_name: 5,
            order: 100,
            ..Specificity::ZERO
        };
        assert!(important > inline);
    }

    #[test]
    fn class_count_beats_order() {
        let early = Specificity {
            order: 1,
            class_name: 2,
            ..Specificity::ZERO
        };
        let late = Specificity {
            order: 9,
            class_name: 1,
            ..Specificity::ZERO
        };
        assert!(early > late);
    }

    #[test]
    fn pseudo_classes_rank_with_classes() {
        let hovered = Specificity {
            order: 1,
            class_name: 1,
            pseudo_class: 1,
            ..Specificity::ZERO
        };
        let two_classes = Specificity {
            order: 2,
            class_name: 2,
            ..Specificity::ZERO
        };
        let one_class = Specificity {
            order: 9,
            class_name: 1,
            ..Specificity::ZERO
        };
        assert!(hovered < two_classes);
        assert!(hovered > one_class);
    }

    #[test]
    fn trailing_zeros_are_trimmed() {
        let spec = Specificity {
            order: 3,
            class_name: 1,
            ..Specificity::ZERO
        };
        assert_eq!(serde_json::to_string(&spec).unwrap(), "[3,1]");
        assert_eq!(serde_json::to_string(&Specificity::ZERO).unwrap(), "[]");
        assert_eq!(serde_json::from_str::<Specificity>("[3,1]").unwrap(), spec);
    }
}

//! Selectors Level 4: the subset that maps onto class-keyed style rules.
//! Spec: <https://www.w3.org/TR/selectors-4/>
//! Spec: <https://www.w3.org/TR/css-nesting-1/#nest-selector>
//!
//! Styles are looked up by class name at runtime, without a document tree.
//! A selector is therefore normalized into:
//! - the subject's first class (the storage key)
//! - extra subject classes and attribute selectors as prop comparisons
//! - descendant ancestors as named container queries
//! - `:hover`/`:active`/`:focus` as interaction flags
//!
//! `:root` and `*` select variable scopes instead of elements.

mod normalize;
mod parser;
mod specificity;

pub use normalize::{ClassSelector, NormalizedSelector, normalize_selector, normalize_selector_list};
pub use parser::{nest_selector_list, parse_complex_selector, parse_selector_list};
pub use specificity::{specificity_of_complex, specificity_of_compound};

use core::iter;
use style_ir::AttributeOperator;

/// Simple selectors.
/// Spec: Section 5–8, 14
#[derive(Clone, Debug, PartialEq)]
pub enum SimpleSelector {
    /// Spec: Section 5.1: Type selectors
    Type(String),
    /// Spec: Section 5.2: Universal selector
    Universal,
    /// Spec: Section 6.6: Class selectors
    Class(String),
    /// Spec: Section 6.7: ID selectors
    IdSelector(String),
    /// Spec: Section 6: Attribute selectors
    Attribute {
        name: String,
        operator: Option<AttributeOperator>,
        value: Option<String>,
    },
    /// `:name`
    PseudoClass(String),
    /// `:is()`, `:where()`, `:not()`... with their selector argument, when it parses.
    PseudoClassFunction {
        name: String,
        arguments: Option<SelectorList>,
    },
    /// `::name`
    PseudoElement(String),
    /// Nesting selector `&`.
    Nesting,
}

/// A sequence of simple selectors without combinators.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

impl CompoundSelector {
    #[inline]
    pub fn contains_nesting(&self) -> bool {
        self.simples.iter().any(|simple| matches!(simple, SimpleSelector::Nesting))
    }
}

/// Combinators between compounds.
/// Spec: Section 16: Combinators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// One or more compounds separated by combinators, leftmost first.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// The rightmost compound, i.e. the element being styled.
    pub fn subject(&self) -> &CompoundSelector {
        self.rest.last().map_or(&self.first, |(_, compound)| compound)
    }

    /// Compounds with the combinator that precedes each (the first has none).
    pub fn compounds(&self) -> impl Iterator<Item = (Option<Combinator>, &CompoundSelector)> {
        iter::once((None, &self.first)).chain(
            self.rest
                .iter()
                .map(|(combinator, compound)| (Some(*combinator), compound)),
        )
    }

    pub fn contains_nesting(&self) -> bool {
        self.compounds().any(|(_, compound)| compound.contains_nesting())
    }
}

/// A comma-separated selector list.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

//! Selector parsing from component values.
//! Spec: <https://www.w3.org/TR/selectors-4/#parse-selector>

use crate::{Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
use core::mem::take;
use css_syntax::{ComponentValue, split_commas, to_css, trim};
use log::debug;
use style_ir::AttributeOperator;

/// Parse a selector list, dropping alternatives that fail to parse.
pub fn parse_selector_list(values: &[ComponentValue]) -> SelectorList {
    let mut list = SelectorList::default();
    for part in split_commas(values) {
        match parse_complex_selector(part) {
            Some(selector) => list.selectors.push(selector),
            None => debug!("Dropping unparseable selector `{}`", to_css(part)),
        }
    }
    list
}

/// Parse a selector list where every alternative must be valid.
fn parse_strict_selector_list(values: &[ComponentValue]) -> Option<SelectorList> {
    let selectors = split_commas(values)
        .into_iter()
        .map(parse_complex_selector)
        .collect::<Option<Vec<_>>>()?;
    Some(SelectorList { selectors })
}

fn attribute_operator(value: &ComponentValue) -> Option<AttributeOperator> {
    Some(match value {
        ComponentValue::Delim('=') => AttributeOperator::Equals,
        ComponentValue::Match("~=") => AttributeOperator::Includes,
        ComponentValue::Match("|=") => AttributeOperator::DashMatch,
        ComponentValue::Match("^=") => AttributeOperator::Prefix,
        ComponentValue::Match("$=") => AttributeOperator::Suffix,
        ComponentValue::Match("*=") => AttributeOperator::Substring,
        _ => return None,
    })
}

/// `[name]`, `[name op value]`, `[name op value i]`.
/// Spec: Section 6.1: Attribute presence and value selectors
fn parse_attribute(inner: &[ComponentValue]) -> Option<SimpleSelector> {
    let significant: Vec<&ComponentValue> = inner.iter().filter(|value| !value.is_whitespace()).collect();
    let (name, rest) = significant.split_first()?;
    let name = name.ident()?.to_owned();
    match rest {
        [] => Some(SimpleSelector::Attribute {
            name,
            operator: None,
            value: None,
        }),
        [operator, value, flags @ ..] if flags.len() <= 1 => {
            let operator = attribute_operator(operator)?;
            let value = match value {
                ComponentValue::Ident(text) | ComponentValue::String(text) => text.clone(),
                ComponentValue::Number(_) | ComponentValue::Dimension { .. } => value.to_string(),
                _ => return None,
            };
            Some(SimpleSelector::Attribute {
                name,
                operator: Some(operator),
                value: Some(value),
            })
        }
        _ => None,
    }
}

/// Accumulates compounds while walking the tokens of one complex selector.
#[derive(Default)]
struct Builder {
    compounds: Vec<(Option<Combinator>, CompoundSelector)>,
    current: CompoundSelector,
    current_combinator: Option<Combinator>,
    next_combinator: Option<Combinator>,
}

impl Builder {
    fn push_simple(&mut self, simple: SimpleSelector) {
        if self.current.simples.is_empty() {
            if self.compounds.is_empty() && self.next_combinator.is_some() {
                // Relative selector (`> .child`) inside a nested rule.
                self.compounds.push((
                    None,
                    CompoundSelector {
                        simples: vec![SimpleSelector::Nesting],
                    },
                ));
            }
            self.current_combinator = self.next_combinator.take();
        }
        self.current.simples.push(simple);
    }

    fn flush(&mut self) {
        if !self.current.simples.is_empty() {
            let compound = take(&mut self.current);
            self.compounds.push((self.current_combinator.take(), compound));
        }
    }

    fn whitespace(&mut self) {
        if !self.current.simples.is_empty() {
            self.flush();
            self.next_combinator = Some(Combinator::Descendant);
        }
    }

    fn combinator(&mut self, combinator: Combinator) {
        self.flush();
        self.next_combinator = Some(combinator);
    }

    fn finish(mut self) -> Option<ComplexSelector> {
        self.flush();
        if matches!(self.next_combinator, Some(combinator) if combinator != Combinator::Descendant) {
            return None;
        }
        let mut compounds = self.compounds.into_iter();
        let (_, first) = compounds.next()?;
        let rest = compounds
            .map(|(combinator, compound)| (combinator.unwrap_or(Combinator::Descendant), compound))
            .collect();
        Some(ComplexSelector { first, rest })
    }
}

/// Parse one complex selector. Returns `None` for anything malformed.
/// Spec: Section 16: Combinators; Section 5–14: simple selectors
pub fn parse_complex_selector(values: &[ComponentValue]) -> Option<ComplexSelector> {
    let values = trim(values);
    let mut builder = Builder::default();
    let mut index = 0;
    while let Some(value) = values.get(index) {
        index += 1;
        match value {
            ComponentValue::Whitespace => builder.whitespace(),
            ComponentValue::Delim('>') => builder.combinator(Combinator::Child),
            ComponentValue::Delim('+') => builder.combinator(Combinator::AdjacentSibling),
            ComponentValue::Delim('~') => builder.combinator(Combinator::GeneralSibling),
            ComponentValue::Delim('*') => builder.push_simple(SimpleSelector::Universal),
            ComponentValue::Delim('&') => builder.push_simple(SimpleSelector::Nesting),
            ComponentValue::Delim('.') => {
                let class = values.get(index)?.ident()?.to_owned();
                index += 1;
                builder.push_simple(SimpleSelector::Class(class));
            }
            ComponentValue::Hash(id) => builder.push_simple(SimpleSelector::IdSelector(id.clone())),
            ComponentValue::Ident(name) => {
                builder.push_simple(SimpleSelector::Type(name.to_ascii_lowercase()));
            }
            ComponentValue::SquareBlock(inner) => builder.push_simple(parse_attribute(inner)?),
            ComponentValue::Colon => {
                let next = values.get(index)?;
                index += 1;
                let simple = match next {
                    ComponentValue::Colon => {
                        let name = values.get(index)?.ident()?.to_ascii_lowercase();
                        index += 1;
                        SimpleSelector::PseudoElement(name)
                    }
                    ComponentValue::Ident(name) => SimpleSelector::PseudoClass(name.to_ascii_lowercase()),
                    ComponentValue::Function { name, args } => SimpleSelector::PseudoClassFunction {
                        name: name.clone(),
                        arguments: parse_strict_selector_list(args),
                    },
                    _ => return None,
                };
                builder.push_simple(simple);
            }
            _ => return None,
        }
    }
    builder.finish()
}

/// Resolve nested selectors against their parent list.
///
/// A `&` in the child is replaced by the parent selector; a child without
/// `&` is treated as a descendant of the parent.
pub fn nest_selector_list(parent: &SelectorList, child: &SelectorList) -> SelectorList {
    let mut out = SelectorList::default();
    for parent_selector in &parent.selectors {
        for child_selector in &child.selectors {
            out.selectors.push(nest_selector(parent_selector, child_selector));
        }
    }
    out
}

fn nest_selector(parent: &ComplexSelector, child: &ComplexSelector) -> ComplexSelector {
    let parent_compounds: Vec<(Option<Combinator>, CompoundSelector)> = parent
        .compounds()
        .map(|(combinator, compound)| (combinator, compound.clone()))
        .collect();
    let mut compounds: Vec<(Option<Combinator>, CompoundSelector)> = Vec::new();

    if !child.contains_nesting() {
        compounds.extend(parent_compounds);
        for (index, (combinator, compound)) in child.compounds().enumerate() {
            let combinator = if index == 0 {
                Some(Combinator::Descendant)
            } else {
                combinator
            };
            compounds.push((combinator, compound.clone()));
        }
    } else {
        for (combinator, compound) in child.compounds() {
            if !compound.contains_nesting() {
                compounds.push((combinator, compound.clone()));
                continue;
            }
            let own: Vec<SimpleSelector> = compound
                .simples
                .iter()
                .filter(|simple| !matches!(simple, SimpleSelector::Nesting))
                .cloned()
                .collect();
            let last = parent_compounds.len().saturating_sub(1);
            for (index, (parent_combinator, parent_compound)) in parent_compounds.iter().enumerate() {
                let combinator = if index == 0 { combinator } else { *parent_combinator };
                let mut merged = parent_compound.clone();
                if index == last {
                    merged.simples.extend(own.iter().cloned());
                }
                compounds.push((combinator, merged));
            }
        }
    }

    let mut iter = compounds.into_iter();
    let first = iter.next().map(|(_, compound)| compound).unwrap_or_default();
    ComplexSelector {
        first,
        rest: iter
            .map(|(combinator, compound)| (combinator.unwrap_or(Combinator::Descendant), compound))
            .collect(),
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_values;

    fn parse(text: &str) -> Option<ComplexSelector> {
        parse_complex_selector(&parse_values(text))
    }

    #[test]
    fn parses_descendant_and_child() {
        let selector = parse(".a  .b > .c").unwrap();
        assert_eq!(selector.first.simples, vec![SimpleSelector::Class("a".into())]);
        assert_eq!(selector.rest[0].0, Combinator::Descendant);
        assert_eq!(selector.rest[1].0, Combinator::Child);
    }

    #[test]
    fn parses_attributes_and_pseudo_classes() {
        let selector = parse(".btn[data-state=\"open\"]:hover::before").unwrap();
        let simples = &selector.first.simples;
        assert_eq!(simples.len(), 4);
        assert_eq!(
            simples[1],
            SimpleSelector::Attribute {
                name: "data-state".into(),
                operator: Some(AttributeOperator::Equals),
                value: Some("open".into()),
            }
        );
        assert_eq!(simples[2], SimpleSelector::PseudoClass("hover".into()));
        assert_eq!(simples[3], SimpleSelector::PseudoElement("before".into()));
    }

    #[test]
    fn invalid_alternatives_are_dropped() {
        let list = parse_selector_list(&parse_values(".a, .b >, .c"));
        assert_eq!(list.selectors.len(), 2);
    }

    #[test]
    fn nesting_replaces_ampersand() {
        let parent = parse_selector_list(&parse_values(".a .b"));
        let child = parse_selector_list(&parse_values("&:hover, .c"));
        let nested = nest_selector_list(&parent, &child);
        assert_eq!(nested.selectors.len(), 2);
        let hovered = &nested.selectors[0];
        assert_eq!(hovered.rest.len(), 1);
        assert_eq!(
            hovered.subject().simples,
            vec![SimpleSelector::Class("b".into()), SimpleSelector::PseudoClass("hover".into())]
        );
        assert_eq!(nested.selectors[1].rest.len(), 2);
    }
}

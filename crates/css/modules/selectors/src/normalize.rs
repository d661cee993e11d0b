//! Normalization of parsed selectors into class-keyed conditions.
//!
//! Only descendant combinators survive. Each ancestor compound becomes a
//! container query on its first class, `:is()`/`:where()` alternatives fan
//! out into separate selectors, and `:root`/`*` select variable scopes.

use crate::specificity::specificity_of_compound;
use crate::{Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
use log::debug;
use style_ir::{
    AttributeKind, AttributeOperator, AttributeQuery, ContainerQuery, MediaCondition,
    PseudoClassesQuery, Specificity,
};

/// A selector that styles elements by class name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassSelector {
    /// Storage key: the first class of the subject compound.
    pub class_name: String,
    pub specificity: Specificity,
    pub media: Vec<MediaCondition>,
    pub container_queries: Vec<ContainerQuery>,
    pub pseudo_classes: Option<PseudoClassesQuery>,
    pub attributes: Vec<AttributeQuery>,
}

/// Result of normalizing one selector alternative.
#[derive(Clone, Debug, PartialEq)]
pub enum NormalizedSelector {
    Class(ClassSelector),
    /// `:root`, `.dark:root`, `:root[class~="dark"]`.
    RootVariables { dark: bool },
    /// `*`, optionally under a dark root.
    UniversalVariables { dark: bool },
}

/// Conditions gathered from one compound selector.
#[derive(Clone, Debug, Default)]
struct CompoundMatch {
    class_name: Option<String>,
    specificity: Specificity,
    attributes: Vec<AttributeQuery>,
    pseudo_classes: PseudoClassesQuery,
    container_queries: Vec<ContainerQuery>,
    media: Vec<MediaCondition>,
    root: bool,
    universal: bool,
}

/// Conditions contributed by the ancestors of a subject compound.
#[derive(Clone, Debug, Default)]
struct Ancestry {
    container_queries: Vec<ContainerQuery>,
    media: Vec<MediaCondition>,
    specificity: Specificity,
}

impl Ancestry {
    fn join(mut self, other: Self) -> Self {
        self.container_queries.extend(other.container_queries);
        self.media.extend(other.media);
        self.specificity = self.specificity.add(other.specificity);
        self
    }

    fn is_empty(&self) -> bool {
        self.container_queries.is_empty() && self.media.is_empty()
    }
}

fn product<T: Clone, U: Clone>(left: Vec<T>, right: &[U], join: impl Fn(T, U) -> T) -> Vec<T> {
    let mut out = Vec::with_capacity(left.len() * right.len());
    for item in left {
        for other in right {
            out.push(join(item.clone(), other.clone()));
        }
    }
    out
}

/// `data-foo-bar` → `fooBar`.
fn dataset_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut upper = false;
    for character in name.chars() {
        if character == '-' {
            upper = true;
        } else if upper {
            key.extend(character.to_uppercase());
            upper = false;
        } else {
            key.push(character);
        }
    }
    key
}

fn dark_scheme() -> MediaCondition {
    MediaCondition::equals("prefers-color-scheme", "dark")
}

impl CompoundMatch {
    fn add_class(&mut self, class: &str) {
        if self.class_name.is_none() {
            self.class_name = Some(class.to_owned());
        } else {
            self.attributes.push(AttributeQuery::compare(
                AttributeKind::Attribute,
                "className",
                AttributeOperator::Substring,
                class,
            ));
        }
    }

    /// Fold one simple selector in. `None` rejects the selector.
    fn apply(&mut self, simple: &SimpleSelector) -> Option<()> {
        match simple {
            SimpleSelector::Class(class) => self.add_class(class),
            SimpleSelector::Universal => self.universal = true,
            SimpleSelector::Attribute { name, operator, value } => {
                let (kind, key) = match name.strip_prefix("data-") {
                    Some(rest) => (AttributeKind::Dataset, dataset_key(rest)),
                    None if name == "class" => (AttributeKind::Attribute, "className".to_owned()),
                    None => (AttributeKind::Attribute, name.clone()),
                };
                self.attributes.push(AttributeQuery {
                    kind,
                    name: key,
                    operator: *operator,
                    value: value.clone(),
                });
            }
            SimpleSelector::PseudoClass(name) => match name.as_str() {
                "hover" => self.pseudo_classes.hover = true,
                "active" => self.pseudo_classes.active = true,
                "focus" => self.pseudo_classes.focus = true,
                "disabled" => self
                    .attributes
                    .push(AttributeQuery::present(AttributeKind::Attribute, "disabled")),
                "empty" => self.attributes.push(AttributeQuery {
                    kind: AttributeKind::Attribute,
                    name: "children".to_owned(),
                    operator: Some(AttributeOperator::Falsy),
                    value: None,
                }),
                "root" => self.root = true,
                _ => return None,
            },
            SimpleSelector::Type(_)
            | SimpleSelector::IdSelector(_)
            | SimpleSelector::PseudoElement(_)
            | SimpleSelector::PseudoClassFunction { .. }
            | SimpleSelector::Nesting => return None,
        }
        Some(())
    }

    fn merge(mut self, other: Self) -> Self {
        if let Some(class) = other.class_name {
            self.add_class(&class);
        }
        self.specificity = self.specificity.add(other.specificity);
        self.attributes.extend(other.attributes);
        self.pseudo_classes = self.pseudo_classes.merge(other.pseudo_classes);
        self.container_queries.extend(other.container_queries);
        self.media.extend(other.media);
        self.root |= other.root;
        self.universal |= other.universal;
        self
    }

    fn with_ancestry(mut self, ancestry: Ancestry) -> Self {
        self.container_queries.extend(ancestry.container_queries);
        self.media.extend(ancestry.media);
        self.specificity = self.specificity.add(ancestry.specificity);
        self
    }

    fn is_bare_universal(&self) -> bool {
        self.universal
            && self.class_name.is_none()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
    }

    /// For a `:root` compound, whether it selects the dark scheme.
    /// `None` when the compound carries conditions a root scope cannot express.
    fn root_is_dark(&self) -> Option<bool> {
        if !self.pseudo_classes.is_empty() {
            return None;
        }
        let class_dark = match self.class_name.as_deref() {
            None => false,
            Some("dark") => true,
            Some(_) => return None,
        };
        let attribute_dark = match self.attributes.as_slice() {
            [] => false,
            [query] if query.name == "className" && query.value.as_deref() == Some("dark") => true,
            _ => return None,
        };
        Some(class_dark || attribute_dark)
    }

    /// Turn an ancestor compound into the conditions it places on descendants.
    fn into_ancestry(self) -> Option<Ancestry> {
        let dark = if self.root { Some(self.root_is_dark()?) } else { None };
        let bare_universal = self.is_bare_universal();
        let mut ancestry = Ancestry {
            container_queries: self.container_queries,
            media: self.media,
            specificity: self.specificity,
        };
        if let Some(dark) = dark {
            if dark {
                ancestry.media.push(dark_scheme());
            }
            return Some(ancestry);
        }
        match self.class_name {
            Some(name) => ancestry.container_queries.push(ContainerQuery {
                name: Some(name),
                media: None,
                pseudo_classes: (!self.pseudo_classes.is_empty()).then_some(self.pseudo_classes),
                attributes: (!self.attributes.is_empty()).then_some(self.attributes),
            }),
            None if bare_universal => {}
            None => return None,
        }
        Some(ancestry)
    }
}

/// Every way a compound can match, one entry per `:is()`/`:where()` branch.
fn process_compound(compound: &CompoundSelector) -> Option<Vec<CompoundMatch>> {
    let mut matches = vec![CompoundMatch {
        specificity: simple_specificity(compound),
        ..CompoundMatch::default()
    }];
    for simple in &compound.simples {
        match simple {
            SimpleSelector::PseudoClassFunction { name, arguments } if name == "is" || name == "where" => {
                let mut alternatives = Vec::new();
                for alternative in &arguments.as_ref()?.selectors {
                    match alternative_matches(alternative) {
                        Some(found) => alternatives.extend(found),
                        None => debug!("Ignoring unsupported :{name}() alternative"),
                    }
                }
                if alternatives.is_empty() {
                    return None;
                }
                if name == "where" {
                    for alternative in &mut alternatives {
                        alternative.specificity = Specificity::ZERO;
                    }
                }
                matches = product(matches, &alternatives, CompoundMatch::merge);
            }
            other => {
                for found in &mut matches {
                    found.apply(other)?;
                }
            }
        }
    }
    Some(matches)
}

/// Specificity of a compound without its `:is()` arguments, which are
/// accounted per branch instead.
fn simple_specificity(compound: &CompoundSelector) -> Specificity {
    let own = CompoundSelector {
        simples: compound
            .simples
            .iter()
            .filter(|simple| !matches!(simple, SimpleSelector::PseudoClassFunction { .. }))
            .cloned()
            .collect(),
    };
    specificity_of_compound(&own)
}

fn ancestry_of(selector: &ComplexSelector) -> Option<Vec<Ancestry>> {
    if selector
        .rest
        .iter()
        .any(|(combinator, _)| *combinator != Combinator::Descendant)
    {
        return None;
    }
    let mut compounds: Vec<&CompoundSelector> = selector.compounds().map(|(_, compound)| compound).collect();
    compounds.pop();
    let mut ancestries = vec![Ancestry::default()];
    for compound in compounds {
        let options = process_compound(compound)?
            .into_iter()
            .map(CompoundMatch::into_ancestry)
            .collect::<Option<Vec<_>>>()?;
        ancestries = product(ancestries, &options, Ancestry::join);
    }
    Some(ancestries)
}

/// A selector nested in `:is()`: its subject merges into the enclosing
/// compound, its ancestors become container queries.
fn alternative_matches(selector: &ComplexSelector) -> Option<Vec<CompoundMatch>> {
    let subjects = process_compound(selector.subject())?;
    let ancestries = ancestry_of(selector)?;
    Some(product(subjects, &ancestries, CompoundMatch::with_ancestry))
}

fn strip_prefix(selector: &ComplexSelector, prefix: Option<&CompoundSelector>) -> ComplexSelector {
    match (prefix, selector.rest.split_first()) {
        (Some(prefix), Some(((_, second), remaining))) if selector.first == *prefix => ComplexSelector {
            first: second.clone(),
            rest: remaining.to_vec(),
        },
        _ => selector.clone(),
    }
}

fn finish(found: CompoundMatch, ancestry: Ancestry) -> Option<NormalizedSelector> {
    if found.root {
        if !ancestry.is_empty() || !found.container_queries.is_empty() {
            return None;
        }
        return Some(NormalizedSelector::RootVariables {
            dark: found.root_is_dark()?,
        });
    }
    if found.is_bare_universal() {
        if !ancestry.container_queries.is_empty() || !found.container_queries.is_empty() {
            return None;
        }
        let dark = ancestry.media.contains(&dark_scheme());
        return Some(NormalizedSelector::UniversalVariables { dark });
    }
    let found = found.with_ancestry(ancestry);
    Some(NormalizedSelector::Class(ClassSelector {
        class_name: found.class_name?,
        specificity: found.specificity,
        media: found.media,
        container_queries: found.container_queries,
        pseudo_classes: (!found.pseudo_classes.is_empty()).then_some(found.pseudo_classes),
        attributes: found.attributes,
    }))
}

/// Normalize one complex selector. An empty result means the selector is
/// unsupported and its rule does not apply to anything.
pub fn normalize_selector(selector: &ComplexSelector, prefix: Option<&CompoundSelector>) -> Vec<NormalizedSelector> {
    let selector = strip_prefix(selector, prefix);
    let Some(subjects) = process_compound(selector.subject()) else {
        return Vec::new();
    };
    let Some(ancestries) = ancestry_of(&selector) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for subject in subjects {
        for ancestry in &ancestries {
            if let Some(normalized) = finish(subject.clone(), ancestry.clone()) {
                out.push(normalized);
            }
        }
    }
    out
}

/// Normalize a selector list, logging the alternatives that are dropped.
pub fn normalize_selector_list(list: &SelectorList, prefix: Option<&CompoundSelector>) -> Vec<NormalizedSelector> {
    let mut out = Vec::new();
    for selector in &list.selectors {
        let normalized = normalize_selector(selector, prefix);
        if normalized.is_empty() {
            debug!("Unsupported selector dropped: {selector:?}");
        }
        out.extend(normalized);
    }
    out
}

#[allow(clippy::unwrap_used, clippy::panic, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_selector_list;
    use css_syntax::parse_values;

    fn normalize(text: &str) -> Vec<NormalizedSelector> {
        normalize_selector_list(&parse_selector_list(&parse_values(text)), None)
    }

    fn class(text: &str) -> ClassSelector {
        match normalize(text).as_slice() {
            [NormalizedSelector::Class(selector)] => selector.clone(),
            other => panic!("expected one class selector for {text}, got {other:?}"),
        }
    }

    #[test]
    fn compound_classes_become_class_name_queries() {
        let selector = class(".a.b");
        assert_eq!(selector.class_name, "a");
        assert_eq!(selector.specificity.class_name, 2);
        assert_eq!(
            selector.attributes,
            vec![AttributeQuery::compare(
                AttributeKind::Attribute,
                "className",
                AttributeOperator::Substring,
                "b"
            )]
        );
    }

    #[test]
    fn ancestors_become_container_queries() {
        let selector = class(".parent .child");
        assert_eq!(selector.class_name, "child");
        assert_eq!(selector.container_queries, vec![ContainerQuery::named("parent")]);
        assert_eq!(selector.specificity.class_name, 2);

        let hovered = class(".group:hover .item");
        assert_eq!(
            hovered.container_queries[0].pseudo_classes,
            Some(PseudoClassesQuery {
                hover: true,
                ..PseudoClassesQuery::default()
            })
        );
    }

    #[test]
    fn unsupported_selectors_are_dropped() {
        for text in [".a > .b", ".a + .b", "div", "#id", ".a::before", ".a:nth-child(2)", ".a:first-child"] {
            assert!(normalize(text).is_empty(), "{text}");
        }
        assert_eq!(normalize(".a > .b, .c").len(), 1);
    }

    #[test]
    fn pseudo_classes_and_attributes() {
        let selector = class(".btn:hover:active:disabled[data-state=open]");
        let pseudo = selector.pseudo_classes.unwrap();
        assert!(pseudo.hover && pseudo.active && !pseudo.focus);
        assert_eq!(selector.specificity.pseudo_class, 3);
        assert_eq!(selector.specificity.class_name, 2);
        assert_eq!(
            selector.attributes,
            vec![
                AttributeQuery::present(AttributeKind::Attribute, "disabled"),
                AttributeQuery::compare(AttributeKind::Dataset, "state", AttributeOperator::Equals, "open"),
            ]
        );
        let empty = class(".a:empty");
        assert_eq!(empty.attributes[0].operator, Some(AttributeOperator::Falsy));
    }

    #[test]
    fn is_and_where_fan_out() {
        let selectors = normalize(":is(.x, .y .z) .a");
        assert_eq!(selectors.len(), 2);
        let NormalizedSelector::Class(second) = &selectors[1] else {
            panic!("expected class selector");
        };
        assert_eq!(
            second.container_queries,
            vec![ContainerQuery::named("y"), ContainerQuery::named("z")]
        );

        let where_selector = class(".a:where(.b)");
        assert_eq!(where_selector.specificity.class_name, 1);
        let is_selector = class(".a:is(.b)");
        assert_eq!(is_selector.specificity.class_name, 2);
    }

    #[test]
    fn variable_scopes() {
        assert_eq!(normalize(":root"), vec![NormalizedSelector::RootVariables { dark: false }]);
        assert_eq!(normalize(".dark:root"), vec![NormalizedSelector::RootVariables { dark: true }]);
        assert_eq!(
            normalize(":root[class~=\"dark\"]"),
            vec![NormalizedSelector::RootVariables { dark: true }]
        );
        assert_eq!(normalize("*"), vec![NormalizedSelector::UniversalVariables { dark: false }]);
        assert_eq!(
            normalize(".dark:root *"),
            vec![NormalizedSelector::UniversalVariables { dark: true }]
        );
        assert!(normalize(".other:root").is_empty());
    }

    #[test]
    fn dark_root_ancestor_is_a_media_condition() {
        let selector = class(":root.dark .a");
        assert!(selector.container_queries.is_empty());
        assert_eq!(selector.media, vec![dark_scheme()]);
    }

    #[test]
    fn prefix_is_stripped() {
        let prefix = parse_values("#app");
        let prefix = crate::parse_complex_selector(&prefix).unwrap().first;
        let list = parse_selector_list(&parse_values("#app .a"));
        let normalized = normalize_selector_list(&list, Some(&prefix));
        assert!(matches!(normalized.as_slice(), [NormalizedSelector::Class(selector)] if selector.class_name == "a" && selector.container_queries.is_empty()));
    }
}

//! Rule condition tests: media, container, pseudo-class and attribute.
//! Spec: <https://www.w3.org/TR/mediaqueries-5/#evaluating>
//! Spec: <https://www.w3.org/TR/css-contain-3/#container-queries>
//!
//! Anything that cannot be evaluated (unknown feature, missing container,
//! mismatched value types) is false.

use crate::context::{Context, Counters, Guard, attribute};
use crate::props::ContainerState;
use log::trace;
use style_ir::{
    AttributeOperator, AttributeQuery, ComparisonOp, ContainerQuery, MediaCondition, PseudoClassesQuery,
    StyleDescriptor, StyleRule, format_number,
};

/// Where media features are read from.
#[derive(Copy, Clone)]
enum Features<'state> {
    /// The environment (`@media`).
    Environment,
    /// A container's layout (`@container`).
    Container(&'state ContainerState),
}

impl Context<'_> {
    /// Whether every condition of `rule` holds.
    pub(crate) fn test_rule(&self, rule: &StyleRule) -> bool {
        Counters::bump(&self.counters.rule_tests);
        let matched = rule
            .pseudo_classes
            .is_none_or(|pseudo| self.test_pseudo_classes(self.element, pseudo))
            && rule.media.iter().all(|condition| self.test_media(condition))
            && rule.attributes.iter().all(|query| self.test_attribute(query))
            && rule.container_queries.iter().all(|query| self.test_container(query));
        trace!("Rule {:?} matched: {matched}", rule.specificity);
        matched
    }

    /// Evaluate an `@media` condition tree against the environment.
    pub(crate) fn test_media(&self, condition: &MediaCondition) -> bool {
        self.evaluate(condition, Features::Environment)
    }

    fn evaluate(&self, condition: &MediaCondition, features: Features<'_>) -> bool {
        match condition {
            MediaCondition::Not(inner) => !self.evaluate(inner, features),
            MediaCondition::And(items) => items.iter().all(|item| self.evaluate(item, features)),
            MediaCondition::Or(items) => items.iter().any(|item| self.evaluate(item, features)),
            MediaCondition::Boolean(feature) => self
                .feature(feature, features)
                .is_some_and(|value| boolean_context(&value)),
            MediaCondition::Compare { op, feature, value } => self
                .feature(feature, features)
                .is_some_and(|actual| compare(*op, &actual, value)),
            MediaCondition::Range {
                feature,
                start,
                start_op,
                end,
                end_op,
            } => self.feature(feature, features).is_some_and(|actual| {
                compare(start_op.flipped(), &actual, start) && compare(*end_op, &actual, end)
            }),
        }
    }

    /// Current value of a media feature.
    fn feature(&self, name: &str, features: Features<'_>) -> Option<StyleDescriptor> {
        let (width, height) = match features {
            Features::Container(container) => (self.read(&container.width), self.read(&container.height)),
            Features::Environment => {
                let environment = self.store.environment();
                match name {
                    "width" | "height" | "aspect-ratio" | "orientation" => (
                        self.read(&environment.window_width),
                        self.read(&environment.window_height),
                    ),
                    "prefers-color-scheme" => {
                        return Some(self.read(&environment.color_scheme).as_str().into());
                    }
                    "prefers-reduced-motion" => {
                        let reduced = self.read(&environment.reduced_motion);
                        return Some(if reduced { "reduce" } else { "no-preference" }.into());
                    }
                    "resolution" => return Some(self.read(&environment.pixel_ratio).into()),
                    "platform" => return Some(self.read(&environment.platform).into()),
                    _ => return None,
                }
            }
        };
        match name {
            "width" => Some(width.into()),
            "height" => Some(height.into()),
            "aspect-ratio" if height > 0.0 => Some((width / height).into()),
            "orientation" => Some(if width > height { "landscape" } else { "portrait" }.into()),
            _ => None,
        }
    }

    fn test_pseudo_classes(&self, element: &ContainerState, pseudo: PseudoClassesQuery) -> bool {
        (!pseudo.hover || self.read(&element.hover))
            && (!pseudo.active || self.read(&element.active))
            && (!pseudo.focus || self.read(&element.focus))
    }

    fn test_attribute(&self, query: &AttributeQuery) -> bool {
        let value = attribute(self.props, query.kind, &query.name);
        self.guard(Guard::Attribute {
            kind: query.kind,
            name: query.name.clone(),
            value: value.cloned(),
        });
        attribute_matches(query, value)
    }

    /// `cq`: the named (or nearest) ancestor container must exist and
    /// satisfy its size, interaction and attribute conditions.
    fn test_container(&self, query: &ContainerQuery) -> bool {
        let Some(container) = self.container(query.name.as_deref()) else {
            trace!("No container {:?} in scope", query.name);
            return false;
        };
        if let Some(media) = &query.media
            && !self.evaluate(media, Features::Container(container.as_ref()))
        {
            return false;
        }
        if let Some(pseudo) = query.pseudo_classes
            && !self.test_pseudo_classes(container.as_ref(), pseudo)
        {
            return false;
        }
        match &query.attributes {
            Some(attributes) => {
                let props = self.read(&container.props);
                attributes
                    .iter()
                    .all(|wanted| attribute_matches(wanted, attribute(&props, wanted.kind, &wanted.name)))
            }
            None => true,
        }
    }
}

/// Whether a feature value counts as "on" in a boolean context.
/// Spec: <https://www.w3.org/TR/mediaqueries-5/#mq-boolean-context>
fn boolean_context(value: &StyleDescriptor) -> bool {
    match value {
        StyleDescriptor::Number(number) => *number != 0.0,
        StyleDescriptor::String(keyword) => !matches!(keyword.as_str(), "none" | "no-preference" | ""),
        other => other.is_truthy(),
    }
}

/// `actual op expected`; keywords only support equality.
fn compare(op: ComparisonOp, actual: &StyleDescriptor, expected: &StyleDescriptor) -> bool {
    match (actual, expected) {
        (StyleDescriptor::Number(actual), StyleDescriptor::Number(expected)) => op.test(*actual, *expected),
        (StyleDescriptor::String(actual), StyleDescriptor::String(expected)) => {
            op == ComparisonOp::Equal && actual.eq_ignore_ascii_case(expected)
        }
        _ => false,
    }
}

/// String form of a prop for attribute comparisons.
fn attribute_text(value: &StyleDescriptor) -> Option<String> {
    match value {
        StyleDescriptor::String(text) => Some(text.clone()),
        StyleDescriptor::Number(number) => Some(format_number(*number)),
        StyleDescriptor::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn attribute_matches(query: &AttributeQuery, value: Option<&StyleDescriptor>) -> bool {
    let truthy = value.is_some_and(StyleDescriptor::is_truthy);
    match (query.operator, query.value.as_deref()) {
        (None, _) => truthy,
        (Some(AttributeOperator::Falsy), _) => !truthy,
        (Some(operator), Some(expected)) => value
            .and_then(attribute_text)
            .is_some_and(|actual| operator.test(&actual, expected)),
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::Props;
    use style_ir::AttributeKind;

    fn props_match(props: &Props, query: &AttributeQuery) -> bool {
        attribute_matches(query, attribute(props, query.kind, &query.name))
    }

    #[test]
    fn comparisons_need_matching_types() {
        assert!(compare(ComparisonOp::GreaterEqual, &640.0.into(), &640.0.into()));
        assert!(!compare(ComparisonOp::Greater, &"dark".into(), &"dark".into()));
        assert!(compare(ComparisonOp::Equal, &"Dark".into(), &"dark".into()));
        assert!(!compare(ComparisonOp::Equal, &"dark".into(), &1.0.into()));
    }

    #[test]
    fn boolean_context_values() {
        assert!(!boolean_context(&"no-preference".into()));
        assert!(boolean_context(&"reduce".into()));
        assert!(!boolean_context(&0.0.into()));
    }

    #[test]
    fn attribute_operators() {
        let props = Props::new()
            .with("className", "card primary")
            .with("disabled", true)
            .with("dataSet", StyleDescriptor::Object([("state".to_owned(), "open".into())].into()));
        let includes = AttributeQuery::compare(
            AttributeKind::Attribute,
            "className",
            AttributeOperator::Includes,
            "primary",
        );
        assert!(props_match(&props, &includes));
        assert!(props_match(&props, &AttributeQuery::present(AttributeKind::Attribute, "disabled")));
        let data = AttributeQuery::compare(AttributeKind::Dataset, "state", AttributeOperator::Equals, "open");
        assert!(props_match(&props, &data));
        let falsy = AttributeQuery {
            operator: Some(AttributeOperator::Falsy),
            ..AttributeQuery::present(AttributeKind::Attribute, "hidden")
        };
        assert!(props_match(&props, &falsy));
    }
}

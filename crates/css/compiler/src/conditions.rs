//! `@media` and `@container` preludes.
//! Spec: <https://www.w3.org/TR/mediaqueries-5/#mq-syntax>
//! Spec: <https://www.w3.org/TR/css-contain-3/#container-rule>
//!
//! Media types carry no meaning natively except for platform names, which
//! become `platform` comparisons. `print` (and anything unparseable) makes
//! the whole block inert.

use css_syntax::{ComponentValue, split_commas, to_css};
use log::debug;
use style_ir::{ComparisonOp, ContainerQuery, MediaCondition, StyleDescriptor, round};

/// Media types that select a platform.
const PLATFORMS: &[&str] = &["ios", "android", "web", "native", "windows", "macos"];

/// Outcome of a media query list.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MediaPrelude {
    /// Conditions that must all hold; empty means always.
    Conditions(Vec<MediaCondition>),
    /// The block can never apply.
    Inert,
}

/// Outcome of one query of a list.
enum Query {
    Always,
    Never,
    Condition(MediaCondition),
}

fn negate(query: Query) -> Query {
    match query {
        Query::Always => Query::Never,
        Query::Never => Query::Always,
        Query::Condition(condition) => Query::Condition(MediaCondition::Not(Box::new(condition))),
    }
}

/// Whitespace-free view of a token list.
fn significant(values: &[ComponentValue]) -> Vec<&ComponentValue> {
    values.iter().filter(|value| !value.is_whitespace()).collect()
}

/// Parses media features, converting `rem`/`em` with `rem`.
pub(crate) struct ConditionParser {
    rem: f64,
}

impl ConditionParser {
    pub(crate) const fn new(rem: f64) -> Self {
        Self { rem }
    }

    /// Parse a comma-separated media query list.
    pub(crate) fn media_query_list(&self, values: &[ComponentValue]) -> MediaPrelude {
        let mut conditions = Vec::new();
        let mut always = false;
        for query in split_commas(values) {
            match self.media_query(query) {
                Some(Query::Always) => always = true,
                Some(Query::Condition(condition)) => conditions.push(condition),
                Some(Query::Never) => {}
                None => debug!("Ignoring unsupported media query `{}`", to_css(query)),
            }
        }
        if always {
            return MediaPrelude::Conditions(Vec::new());
        }
        match conditions.len() {
            0 => MediaPrelude::Inert,
            1 => MediaPrelude::Conditions(conditions),
            _ => MediaPrelude::Conditions(vec![MediaCondition::Or(conditions)]),
        }
    }

    /// `[not | only]? <media-type> [and <condition>]?` or `<media-condition>`.
    fn media_query(&self, values: &[ComponentValue]) -> Option<Query> {
        let tokens = significant(values);
        let (negated, rest) = match tokens.split_first() {
            Some((first, rest)) if first.is_ident("not") && rest.first().is_some_and(|next| next.ident().is_some()) => {
                (true, rest)
            }
            Some((first, rest)) if first.is_ident("only") => (false, rest),
            _ => (false, tokens.as_slice()),
        };
        let Some((ComponentValue::Ident(media_type), tail)) = rest.split_first().map(|(first, tail)| (*first, tail))
        else {
            return self.condition(&tokens).map(Query::Condition);
        };
        if media_type.eq_ignore_ascii_case("not") {
            return self.condition(&tokens).map(Query::Condition);
        }
        let media_type = media_type.to_ascii_lowercase();
        let base = match media_type.as_str() {
            "all" | "screen" => Query::Always,
            "print" => Query::Never,
            platform if PLATFORMS.contains(&platform) => {
                Query::Condition(MediaCondition::equals("platform", platform))
            }
            _ => return None,
        };
        let query = match tail.split_first() {
            None => base,
            Some((keyword, condition)) if keyword.is_ident("and") => {
                let condition = self.condition(condition)?;
                match base {
                    Query::Always => Query::Condition(condition),
                    Query::Never => Query::Never,
                    Query::Condition(platform) => Query::Condition(MediaCondition::And(vec![platform, condition])),
                }
            }
            Some(_) => return None,
        };
        Some(if negated { negate(query) } else { query })
    }

    /// `not <in-parens>`, `<in-parens> [and <in-parens>]*`, `<in-parens> [or <in-parens>]*`.
    /// Spec: <https://www.w3.org/TR/mediaqueries-5/#typedef-media-condition>
    pub(crate) fn condition(&self, tokens: &[&ComponentValue]) -> Option<MediaCondition> {
        match tokens {
            [keyword, inner] if keyword.is_ident("not") => {
                Some(MediaCondition::Not(Box::new(self.in_parens(inner)?)))
            }
            [first, rest @ ..] => {
                let mut items = vec![self.in_parens(first)?];
                let mut joiner: Option<bool> = None;
                for pair in rest.chunks(2) {
                    let [keyword, operand] = pair else {
                        return None;
                    };
                    let is_and = if keyword.is_ident("and") {
                        true
                    } else if keyword.is_ident("or") {
                        false
                    } else {
                        return None;
                    };
                    if joiner.is_some_and(|previous| previous != is_and) {
                        return None;
                    }
                    joiner = Some(is_and);
                    items.push(self.in_parens(operand)?);
                }
                Some(match joiner {
                    None => items.pop()?,
                    Some(true) => MediaCondition::And(items),
                    Some(false) => MediaCondition::Or(items),
                })
            }
            [] => None,
        }
    }

    fn in_parens(&self, value: &ComponentValue) -> Option<MediaCondition> {
        let ComponentValue::ParenBlock(inner) = value else {
            return None;
        };
        let tokens = significant(inner);
        let nested = tokens
            .first()
            .is_some_and(|first| matches!(first, ComponentValue::ParenBlock(_)) || first.is_ident("not"));
        if nested {
            return self.condition(&tokens);
        }
        self.feature(&tokens)
    }

    /// `(name)`, `(name: value)` or a range.
    /// Spec: <https://www.w3.org/TR/mediaqueries-5/#mq-features>
    fn feature(&self, tokens: &[&ComponentValue]) -> Option<MediaCondition> {
        if let [ComponentValue::Ident(name)] = tokens {
            return Some(MediaCondition::Boolean(name.to_ascii_lowercase()));
        }
        if let Some(colon) = tokens.iter().position(|value| matches!(value, ComponentValue::Colon)) {
            let [ComponentValue::Ident(name)] = tokens.get(..colon)? else {
                return None;
            };
            let value = self.feature_value(tokens.get(colon + 1..)?)?;
            let name = name.to_ascii_lowercase();
            let (op, feature) = if let Some(feature) = name.strip_prefix("min-") {
                (ComparisonOp::GreaterEqual, feature.to_owned())
            } else if let Some(feature) = name.strip_prefix("max-") {
                (ComparisonOp::LessEqual, feature.to_owned())
            } else {
                (ComparisonOp::Equal, name)
            };
            return Some(MediaCondition::Compare { op, feature, value });
        }
        self.range(tokens)
    }

    /// `feature op value`, `value op feature`, `value op feature op value`.
    /// Spec: <https://www.w3.org/TR/mediaqueries-5/#mq-range-context>
    fn range(&self, tokens: &[&ComponentValue]) -> Option<MediaCondition> {
        let mut parts: Vec<RangePart> = Vec::new();
        let mut index = 0;
        while let Some(token) = tokens.get(index) {
            if let ComponentValue::Delim(first @ ('<' | '>' | '=')) = token {
                let mut operator = first.to_string();
                if tokens.get(index + 1).is_some_and(|next| next.is_delim('=')) {
                    operator.push('=');
                    index += 1;
                }
                parts.push(RangePart::Op(ComparisonOp::parse(&operator)?));
                index += 1;
                continue;
            }
            let end = tokens
                .iter()
                .skip(index)
                .position(|value| matches!(value, ComponentValue::Delim('<' | '>' | '=')))
                .map_or(tokens.len(), |offset| index + offset);
            let operand = tokens.get(index..end)?;
            parts.push(match operand {
                [ComponentValue::Ident(name)] => RangePart::Feature(name.to_ascii_lowercase()),
                _ => RangePart::Value(self.feature_value(operand)?),
            });
            index = end;
        }
        match parts.as_slice() {
            [RangePart::Feature(feature), RangePart::Op(op), RangePart::Value(value)] => Some(MediaCondition::Compare {
                op: *op,
                feature: feature.clone(),
                value: value.clone(),
            }),
            [RangePart::Value(value), RangePart::Op(op), RangePart::Feature(feature)] => Some(MediaCondition::Compare {
                op: op.flipped(),
                feature: feature.clone(),
                value: value.clone(),
            }),
            [
                RangePart::Value(start),
                RangePart::Op(start_op),
                RangePart::Feature(feature),
                RangePart::Op(end_op),
                RangePart::Value(end),
            ] => Some(MediaCondition::Range {
                feature: feature.clone(),
                start: start.clone(),
                start_op: *start_op,
                end: end.clone(),
                end_op: *end_op,
            }),
            _ => None,
        }
    }

    /// Lengths in pixels, ratios and resolutions as numbers, keywords as strings.
    fn feature_value(&self, tokens: &[&ComponentValue]) -> Option<StyleDescriptor> {
        let number = |value: f64| Some(StyleDescriptor::Number(round(value)));
        match tokens {
            [ComponentValue::Number(value)] => number(*value),
            [ComponentValue::Number(width), slash, ComponentValue::Number(height)]
                if slash.is_delim('/') && *height != 0.0 =>
            {
                number(width / height)
            }
            [ComponentValue::Dimension { value, unit }] => match unit.as_str() {
                "px" | "dppx" | "x" => number(*value),
                "rem" | "em" => number(value * self.rem),
                "dpi" => number(value / 96.0),
                "dpcm" => number(value * 2.54 / 96.0),
                _ => None,
            },
            [ComponentValue::Ident(keyword)] => Some(StyleDescriptor::String(keyword.to_ascii_lowercase())),
            _ => None,
        }
    }

    /// `<container-name>? <container-condition>`.
    pub(crate) fn container_query(&self, values: &[ComponentValue]) -> Option<ContainerQuery> {
        let tokens = significant(values);
        let (name, condition) = match tokens.split_first() {
            Some((ComponentValue::Ident(name), rest))
                if !["not", "and", "or"].iter().any(|keyword| name.eq_ignore_ascii_case(keyword)) =>
            {
                (Some(name.clone()), rest)
            }
            _ => (None, tokens.as_slice()),
        };
        let media = match condition {
            [] => None,
            _ => Some(self.condition(condition)?),
        };
        if name.is_none() && media.is_none() {
            return None;
        }
        Some(ContainerQuery {
            name,
            media,
            ..ContainerQuery::default()
        })
    }
}

enum RangePart {
    Feature(String),
    Op(ComparisonOp),
    Value(StyleDescriptor),
}

#[allow(clippy::unwrap_used, clippy::panic, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_values;

    fn media(text: &str) -> MediaPrelude {
        ConditionParser::new(14.0).media_query_list(&parse_values(text))
    }

    fn single(text: &str) -> MediaCondition {
        match media(text) {
            MediaPrelude::Conditions(mut conditions) if conditions.len() == 1 => conditions.remove(0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn min_max_and_plain_features() {
        assert_eq!(
            single("(min-width: 640px)"),
            MediaCondition::Compare {
                op: ComparisonOp::GreaterEqual,
                feature: "width".into(),
                value: 640.0.into(),
            }
        );
        assert_eq!(
            single("(prefers-color-scheme: dark)"),
            MediaCondition::equals("prefers-color-scheme", "dark")
        );
        assert_eq!(single("(hover)"), MediaCondition::Boolean("hover".into()));
    }

    #[test]
    fn range_syntax() {
        assert_eq!(
            single("(400px < width)"),
            MediaCondition::Compare {
                op: ComparisonOp::Greater,
                feature: "width".into(),
                value: 400.0.into(),
            }
        );
        assert_eq!(
            single("(100px <= height <= 2rem)"),
            MediaCondition::Range {
                feature: "height".into(),
                start: 100.0.into(),
                start_op: ComparisonOp::LessEqual,
                end: 28.0.into(),
                end_op: ComparisonOp::LessEqual,
            }
        );
    }

    #[test]
    fn media_types() {
        assert_eq!(media("screen"), MediaPrelude::Conditions(Vec::new()));
        assert_eq!(media("print"), MediaPrelude::Inert);
        assert_eq!(single("ios"), MediaCondition::equals("platform", "ios"));
        assert_eq!(
            single("not android and (orientation: landscape)"),
            MediaCondition::Not(Box::new(MediaCondition::And(vec![
                MediaCondition::equals("platform", "android"),
                MediaCondition::equals("orientation", "landscape"),
            ])))
        );
        assert_eq!(media("screen and (bogus-syntax: 1 2)"), MediaPrelude::Inert);
    }

    #[test]
    fn lists_and_combinators() {
        assert!(matches!(single("(width > 1px), (height > 1px)"), MediaCondition::Or(items) if items.len() == 2));
        assert!(matches!(single("(width > 1px) and (height > 1px)"), MediaCondition::And(items) if items.len() == 2));
        assert!(matches!(single("not (hover)"), MediaCondition::Not(_)));
        assert_eq!(
            single("(min-aspect-ratio: 16/9)"),
            MediaCondition::Compare {
                op: ComparisonOp::GreaterEqual,
                feature: "aspect-ratio".into(),
                value: 1.7778.into(),
            }
        );
    }

    #[test]
    fn container_preludes() {
        let parser = ConditionParser::new(14.0);
        let query = parser.container_query(&parse_values("sidebar (min-width: 300px)")).unwrap();
        assert_eq!(query.name.as_deref(), Some("sidebar"));
        assert!(query.media.is_some());
        let anonymous = parser.container_query(&parse_values("(width > 10px)")).unwrap();
        assert_eq!(anonymous.name, None);
        assert!(parser.container_query(&parse_values("")).is_none());
    }
}

//! Rule-level parsing: style rules, nesting and the at-rules the compiler understands.
//! Spec: <https://www.w3.org/TR/css-syntax-3/#parsing>
//! Spec: <https://www.w3.org/TR/css-nesting-1/>

use crate::error::SyntaxError;
use crate::values::{ComponentValue, MAX_NESTING_DEPTH, parse_component_values, split_commas, to_css, trim};
use core::cell::RefCell;
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;
use cssparser::Token;
use log::debug;

/// A single declaration (`property: value [!important]`).
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    /// Lowercased property name; custom properties keep their case.
    pub name: String,
    /// Parsed value without the `!important` tail.
    pub value: Vec<ComponentValue>,
    /// Raw value text without the `!important` tail.
    pub raw: String,
    pub important: bool,
}

impl Declaration {
    #[inline]
    pub fn is_custom_property(&self) -> bool {
        self.name.starts_with("--")
    }
}

/// `@prop from: to` redirection inside a style rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropMapping {
    pub from: String,
    pub to: String,
}

/// A style rule with its (possibly nested) content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleRule {
    /// Selector list prelude.
    pub selectors: Vec<ComponentValue>,
    pub declarations: Vec<Declaration>,
    /// Nested style rules and conditional group rules.
    pub rules: Vec<CssRule>,
    pub props: Vec<PropMapping>,
}

/// One `@keyframes` step.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeBlock {
    /// Offsets in `0..=1` (`from` is `0`, `to` is `1`).
    pub offsets: Vec<f64>,
    pub declarations: Vec<Declaration>,
}

/// A rule understood by the compiler. `@layer` blocks are flattened into
/// their parent; everything else is skipped while parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum CssRule {
    Style(StyleRule),
    Media {
        query: Vec<ComponentValue>,
        rules: Vec<CssRule>,
    },
    Container {
        query: Vec<ComponentValue>,
        rules: Vec<CssRule>,
    },
    Keyframes {
        name: String,
        frames: Vec<KeyframeBlock>,
    },
    /// `@property --name { ... }`
    Property {
        name: String,
        declarations: Vec<Declaration>,
    },
}

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stylesheet {
    /// Top-level rules in source order.
    pub rules: Vec<CssRule>,
}

/// Items produced while walking a rule list or rule body.
enum Item {
    Declaration(Declaration),
    Rule(CssRule),
    Props(Vec<PropMapping>),
    Group(Vec<Item>),
}

enum AtPrelude {
    Media(Vec<ComponentValue>),
    Container(Vec<ComponentValue>),
    Keyframes(String),
    Property(String),
    Layer,
    Prop(Vec<ComponentValue>),
    Ignored,
}

/// Content of a block, split by kind.
#[derive(Default)]
struct BlockContent {
    declarations: Vec<Declaration>,
    rules: Vec<CssRule>,
    props: Vec<PropMapping>,
}

impl BlockContent {
    fn absorb(&mut self, item: Item) {
        match item {
            Item::Declaration(declaration) => self.declarations.push(declaration),
            Item::Rule(rule) => self.rules.push(rule),
            Item::Props(props) => self.props.extend(props),
            Item::Group(items) => {
                for inner in items {
                    self.absorb(inner);
                }
            }
        }
    }

    /// Rules of a conditional block; inside a style rule, bare declarations
    /// form an implicit `&` rule.
    fn into_group_rules(self) -> Vec<CssRule> {
        let mut rules = Vec::with_capacity(self.rules.len() + 1);
        if !self.declarations.is_empty() || !self.props.is_empty() {
            rules.push(CssRule::Style(StyleRule {
                selectors: vec![ComponentValue::Delim('&')],
                declarations: self.declarations,
                rules: Vec::new(),
                props: self.props,
            }));
        }
        rules.extend(self.rules);
        rules
    }
}

/// Strip a trailing `! important` from parsed values.
fn strip_important(values: &mut Vec<ComponentValue>) -> bool {
    let significant: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, value)| !value.is_whitespace())
        .map(|(index, _)| index)
        .collect();
    let [.., bang, last] = significant.as_slice() else {
        return false;
    };
    let is_important = values.get(*bang).is_some_and(|value| value.is_delim('!'))
        && values.get(*last).is_some_and(|value| value.is_ident("important"));
    if is_important {
        values.truncate(*bang);
        while values.last().is_some_and(ComponentValue::is_whitespace) {
            values.pop();
        }
    }
    is_important
}

/// Raw-text counterpart of [`strip_important`].
fn split_important_tail(value: &str) -> &str {
    let trimmed = value.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.ends_with("important")
        && let Some(position) = trimmed.rfind('!')
        && let Some(head) = trimmed.get(..position)
    {
        return head.trim_end();
    }
    trimmed
}

fn parse_prop_mappings(values: &[ComponentValue]) -> Vec<PropMapping> {
    values
        .split(|value| matches!(value, ComponentValue::Semicolon))
        .filter_map(|part| {
            let colon = part.iter().position(|value| matches!(value, ComponentValue::Colon))?;
            let from = to_css(trim(part.get(..colon)?));
            let to = to_css(trim(part.get(colon + 1..)?));
            (!from.is_empty() && !to.is_empty()).then_some(PropMapping { from, to })
        })
        .collect()
}

/// Parser for rule lists (top level, conditional blocks) and rule bodies.
struct RuleListParser<'fatal> {
    /// Whether declarations are accepted (inside a style rule).
    nested: bool,
    depth: usize,
    fatal: &'fatal RefCell<Option<SyntaxError>>,
}

impl<'fatal> RuleListParser<'fatal> {
    /// Fail when entering one more block would exceed the nesting limit.
    fn enter<'input>(&self, input: &Parser<'input, '_>) -> Result<(), ParseError<'input, ()>> {
        if self.depth + 1 > MAX_NESTING_DEPTH {
            if self.fatal.borrow().is_none() {
                *self.fatal.borrow_mut() = Some(SyntaxError::too_deep(input.current_source_location()));
            }
            return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
        }
        Ok(())
    }

    fn child(&self, nested: bool) -> Self {
        Self {
            nested,
            depth: self.depth + 1,
            fatal: self.fatal,
        }
    }

    /// Collect every item of the current block.
    fn collect(&mut self, input: &mut Parser<'_, '_>) -> BlockContent {
        let mut content = BlockContent::default();
        for item in CssRuleBodyParser::new(input, self) {
            match item {
                Ok(item) => content.absorb(item),
                Err((_, slice)) => debug!("Skipping invalid CSS: {}", slice.trim()),
            }
        }
        content
    }
}

impl<'input> CssDeclarationParser<'input> for RuleListParser<'_> {
    type Declaration = Item;
    type Error = ();

    fn parse_value<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
        _declaration_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        let mut value = parse_component_values(input, self.depth, self.fatal);
        let raw = split_important_tail(input.slice_from(start)).to_owned();
        let important = strip_important(&mut value);
        let value = trim(&value).to_vec();
        let name = if name.starts_with("--") {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };
        Ok(Item::Declaration(Declaration {
            name,
            value,
            raw,
            important,
        }))
    }
}

impl<'input> CssAtRuleParser<'input> for RuleListParser<'_> {
    type Prelude = AtPrelude;
    type AtRule = Item;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let values = parse_component_values(input, self.depth, self.fatal);
        let values = trim(&values).to_vec();
        let lowered = name.to_ascii_lowercase();
        Ok(match lowered.as_str() {
            "media" => AtPrelude::Media(values),
            "container" => AtPrelude::Container(values),
            "keyframes" | "-webkit-keyframes" => {
                let keyframes_name = match values.first() {
                    Some(ComponentValue::Ident(ident)) => ident.clone(),
                    Some(ComponentValue::String(text)) => text.clone(),
                    _ => return Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name))),
                };
                AtPrelude::Keyframes(keyframes_name)
            }
            "property" => match values.first() {
                Some(ComponentValue::Ident(ident)) if ident.starts_with("--") => {
                    AtPrelude::Property(ident.clone())
                }
                _ => return Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name))),
            },
            "layer" => AtPrelude::Layer,
            "prop" if self.nested => AtPrelude::Prop(values),
            _ => {
                debug!("Ignoring unsupported at-rule @{lowered}");
                AtPrelude::Ignored
            }
        })
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        match prelude {
            AtPrelude::Prop(values) => Ok(Item::Props(parse_prop_mappings(&values))),
            AtPrelude::Layer | AtPrelude::Ignored => Ok(Item::Group(Vec::new())),
            _ => Err(()),
        }
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        self.enter(input)?;
        let nested = self.nested;
        Ok(match prelude {
            AtPrelude::Media(query) => Item::Rule(CssRule::Media {
                query,
                rules: self.child(nested).collect(input).into_group_rules(),
            }),
            AtPrelude::Container(query) => Item::Rule(CssRule::Container {
                query,
                rules: self.child(nested).collect(input).into_group_rules(),
            }),
            AtPrelude::Layer => Item::Group(
                self.child(nested)
                    .collect(input)
                    .into_group_rules()
                    .into_iter()
                    .map(Item::Rule)
                    .collect(),
            ),
            AtPrelude::Keyframes(name) => {
                let mut parser = KeyframeListParser {
                    list: self.child(true),
                };
                let mut frames = Vec::new();
                for frame in CssRuleBodyParser::new(input, &mut parser) {
                    match frame {
                        Ok(frame) => frames.push(frame),
                        Err((_, slice)) => debug!("Skipping invalid keyframe: {}", slice.trim()),
                    }
                }
                Item::Rule(CssRule::Keyframes { name, frames })
            }
            AtPrelude::Property(name) => Item::Rule(CssRule::Property {
                name,
                declarations: self.child(true).collect(input).declarations,
            }),
            AtPrelude::Prop(_) => {
                let content = self.child(true).collect(input);
                Item::Props(
                    content
                        .declarations
                        .into_iter()
                        .map(|declaration| PropMapping {
                            from: declaration.name,
                            to: declaration.raw,
                        })
                        .collect(),
                )
            }
            AtPrelude::Ignored => {
                while input.next().is_ok() {}
                Item::Group(Vec::new())
            }
        })
    }
}

impl<'input> CssQualifiedRuleParser<'input> for RuleListParser<'_> {
    type Prelude = Vec<ComponentValue>;
    type QualifiedRule = Item;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let values = parse_component_values(input, self.depth, self.fatal);
        Ok(trim(&values).to_vec())
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        self.enter(input)?;
        let content = self.child(true).collect(input);
        Ok(Item::Rule(CssRule::Style(StyleRule {
            selectors: prelude,
            declarations: content.declarations,
            rules: content.rules,
            props: content.props,
        })))
    }
}

impl<'input> CssRuleBodyItemParser<'input, Item, ()> for RuleListParser<'_> {
    fn parse_declarations(&self) -> bool {
        self.nested
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}

/// Parser for the body of `@keyframes`.
struct KeyframeListParser<'fatal> {
    list: RuleListParser<'fatal>,
}

impl<'input> CssQualifiedRuleParser<'input> for KeyframeListParser<'_> {
    type Prelude = Vec<f64>;
    type QualifiedRule = KeyframeBlock;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let values = parse_component_values(input, self.list.depth, self.list.fatal);
        let mut offsets = Vec::new();
        for part in split_commas(&values) {
            let offset = match part {
                [ComponentValue::Ident(ident)] if ident.eq_ignore_ascii_case("from") => 0.0,
                [ComponentValue::Ident(ident)] if ident.eq_ignore_ascii_case("to") => 1.0,
                [ComponentValue::Percentage(percent)] => percent / 100.0,
                _ => return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid)),
            };
            offsets.push(offset);
        }
        Ok(offsets)
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        self.list.enter(input)?;
        Ok(KeyframeBlock {
            offsets: prelude,
            declarations: self.list.child(true).collect(input).declarations,
        })
    }
}

impl<'input> CssAtRuleParser<'input> for KeyframeListParser<'_> {
    type Prelude = ();
    type AtRule = KeyframeBlock;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)))
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Err(())
    }

    fn parse_block<'tokens>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }
}

impl<'input> CssDeclarationParser<'input> for KeyframeListParser<'_> {
    type Declaration = KeyframeBlock;
    type Error = ();

    fn parse_value<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
        _declaration_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::UnexpectedToken(Token::Ident(name))))
    }
}

impl<'input> CssRuleBodyItemParser<'input, KeyframeBlock, ()> for KeyframeListParser<'_> {
    fn parse_declarations(&self) -> bool {
        false
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}

/// Parse a full stylesheet.
pub(crate) fn parse_rules(
    parser: &mut Parser<'_, '_>,
    fatal: &RefCell<Option<SyntaxError>>,
) -> Vec<CssRule> {
    let mut top = RuleListParser {
        nested: false,
        depth: 0,
        fatal,
    };
    let mut content = BlockContent::default();
    for item in StyleSheetParser::new(parser, &mut top) {
        match item {
            Ok(item) => content.absorb(item),
            Err((_, slice)) => debug!("Skipping invalid CSS: {}", slice.trim()),
        }
    }
    content.rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn important_tail_is_removed() {
        assert_eq!(split_important_tail("red !important"), "red");
        assert_eq!(split_important_tail("red ! IMPORTANT"), "red");
        assert_eq!(split_important_tail("red"), "red");
        let mut values = vec![
            ComponentValue::Ident("red".into()),
            ComponentValue::Whitespace,
            ComponentValue::Delim('!'),
            ComponentValue::Ident("important".into()),
        ];
        assert!(strip_important(&mut values));
        assert_eq!(values, vec![ComponentValue::Ident("red".into())]);
    }

    #[test]
    fn prop_mappings() {
        let values = vec![
            ComponentValue::Ident("color".into()),
            ComponentValue::Colon,
            ComponentValue::Whitespace,
            ComponentValue::Delim('^'),
            ComponentValue::Ident("placeholderTextColor".into()),
        ];
        assert_eq!(
            parse_prop_mappings(&values),
            vec![PropMapping {
                from: "color".into(),
                to: "^placeholderTextColor".into()
            }]
        );
    }
}

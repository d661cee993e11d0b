//! CSS Syntax Module Level 3: parsing into an owned rule tree.
//! Spec: <https://www.w3.org/TR/css-syntax-3/>
//!
//! Tokenization and rule recovery are delegated to `cssparser`; this crate
//! lowers its output into owned [`CssRule`]s and [`ComponentValue`]s that the
//! compiler can walk freely.

mod error;
mod rules;
mod values;

use core::cell::RefCell;
use cssparser::{Parser, ParserInput};

pub use error::SyntaxError;
pub use rules::{CssRule, Declaration, KeyframeBlock, PropMapping, StyleRule, Stylesheet};
pub use values::{ComponentValue, MAX_NESTING_DEPTH, split_commas, split_whitespace, to_css, trim};

/// Parse a full stylesheet.
///
/// Invalid rules and declarations are skipped. The only error is a
/// structural failure (blocks nested beyond [`MAX_NESTING_DEPTH`]).
///
/// # Errors
/// Returns [`SyntaxError`] when nesting exceeds the limit.
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, SyntaxError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let fatal = RefCell::new(None);
    let rules = rules::parse_rules(&mut parser, &fatal);
    match fatal.into_inner() {
        Some(error) => Err(error),
        None => Ok(Stylesheet { rules }),
    }
}

/// Parse a standalone value (`10px solid red`) into component values.
pub fn parse_values(text: &str) -> Vec<ComponentValue> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let fatal = RefCell::new(None);
    let values = values::parse_component_values(&mut parser, 0, &fatal);
    trim(&values).to_vec()
}

#[allow(clippy::unwrap_used, clippy::panic, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    fn style(rule: &CssRule) -> &StyleRule {
        match rule {
            CssRule::Style(style) => style,
            other => panic!("expected a style rule, got {other:?}"),
        }
    }

    #[test]
    fn parses_declarations_and_important() {
        let sheet = parse_stylesheet(".a { color: red !important; --Brand: 10px; }").unwrap();
        let rule = style(&sheet.rules[0]);
        assert_eq!(to_css(&rule.selectors), ".a");
        assert_eq!(rule.declarations.len(), 2);
        assert!(rule.declarations[0].important);
        assert_eq!(rule.declarations[0].value, vec![ComponentValue::Ident("red".into())]);
        assert_eq!(rule.declarations[1].name, "--Brand");
        assert_eq!(rule.declarations[1].raw, "10px");
    }

    #[test]
    fn parses_conditional_and_keyframe_rules() {
        let css = "@media (min-width: 400px) { .a { color: red } }\n\
                   @keyframes spin { from { opacity: 0 } 50%, to { opacity: 1 } }\n\
                   @font-face { font-family: x }\n\
                   @layer base { .b { color: blue } }";
        let sheet = parse_stylesheet(css).unwrap();
        assert_eq!(sheet.rules.len(), 3);
        assert!(matches!(&sheet.rules[0], CssRule::Media { rules, .. } if rules.len() == 1));
        match &sheet.rules[1] {
            CssRule::Keyframes { name, frames } => {
                assert_eq!(name, "spin");
                assert_eq!(frames[0].offsets, vec![0.0]);
                assert_eq!(frames[1].offsets, vec![0.5, 1.0]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(to_css(&style(&sheet.rules[2]).selectors), ".b");
    }

    #[test]
    fn nested_rules_and_prop_redirects() {
        let css = ".a { color: red; &:hover { color: blue } @media (hover) { opacity: 0.5 } @prop color: ^placeholderTextColor; }";
        let sheet = parse_stylesheet(css).unwrap();
        let rule = style(&sheet.rules[0]);
        assert_eq!(rule.rules.len(), 2);
        assert_eq!(rule.props.len(), 1);
        assert_eq!(rule.props[0].to, "^placeholderTextColor");
        match &rule.rules[1] {
            CssRule::Media { rules, .. } => assert_eq!(to_css(&style(&rules[0]).selectors), "&"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn values_keep_structure() {
        let values = parse_values("calc(100% - 10px) rgb(0 0 0 / 50%)");
        assert_eq!(values.len(), 3);
        let (name, args) = values[0].function().unwrap();
        assert_eq!(name, "calc");
        assert_eq!(args[0], ComponentValue::Percentage(100.0));
        assert_eq!(to_css(&values), "calc(100% - 10px) rgb(0 0 0 / 50%)");
    }

    #[test]
    fn excessive_nesting_is_fatal() {
        let css = format!(".a {{ color: {}1{} }}", "(".repeat(80), ")".repeat(80));
        let error = parse_stylesheet(&css).unwrap_err();
        assert_eq!(error.line, 1);
    }
}

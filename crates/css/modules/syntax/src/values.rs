//! Component values (CSS Syntax §5.4.8).
//! Spec: <https://www.w3.org/TR/css-syntax-3/#component-value>

use crate::error::SyntaxError;
use core::cell::RefCell;
use core::fmt;
use cssparser::{ParseError, Parser, Token};

/// Maximum block nesting accepted before parsing is aborted.
pub const MAX_NESTING_DEPTH: usize = 64;

/// An owned component value.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentValue {
    /// Identifier, case preserved.
    Ident(String),
    Number(f64),
    /// Percentage in percent units (`50%` is `50.0`).
    Percentage(f64),
    /// Dimension with a lowercased unit.
    Dimension { value: f64, unit: String },
    /// `#abc`, both id and unrestricted hashes.
    Hash(String),
    /// Quoted string, unescaped.
    String(String),
    Url(String),
    Delim(char),
    /// Attribute match operators `~=`, `|=`, `^=`, `$=`, `*=`.
    Match(&'static str),
    Comma,
    Colon,
    Semicolon,
    /// Any run of whitespace.
    Whitespace,
    /// Function call with a lowercased name.
    Function { name: String, args: Vec<ComponentValue> },
    ParenBlock(Vec<ComponentValue>),
    SquareBlock(Vec<ComponentValue>),
    CurlyBlock(Vec<ComponentValue>),
}

impl ComponentValue {
    #[inline]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// Identifier text, if this is an identifier.
    #[inline]
    pub fn ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Case-insensitive identifier comparison.
    #[inline]
    pub fn is_ident(&self, expected: &str) -> bool {
        self.ident().is_some_and(|name| name.eq_ignore_ascii_case(expected))
    }

    #[inline]
    pub const fn is_delim(&self, expected: char) -> bool {
        matches!(self, Self::Delim(delim) if *delim == expected)
    }

    /// Function name and arguments, if this is a function.
    #[inline]
    pub fn function(&self) -> Option<(&str, &[Self])> {
        match self {
            Self::Function { name, args } => Some((name.as_str(), args.as_slice())),
            _ => None,
        }
    }
}

/// Remove leading and trailing whitespace.
pub fn trim(values: &[ComponentValue]) -> &[ComponentValue] {
    let start = values.iter().position(|value| !value.is_whitespace()).unwrap_or(values.len());
    let end = values
        .iter()
        .rposition(|value| !value.is_whitespace())
        .map_or(start, |index| index + 1);
    values.get(start..end).unwrap_or(&[])
}

/// Split at top-level commas; each part is trimmed.
pub fn split_commas(values: &[ComponentValue]) -> Vec<&[ComponentValue]> {
    values
        .split(|value| matches!(value, ComponentValue::Comma))
        .map(trim)
        .collect()
}

/// Split at top-level whitespace, dropping empty parts.
pub fn split_whitespace(values: &[ComponentValue]) -> Vec<&[ComponentValue]> {
    values
        .split(ComponentValue::is_whitespace)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Serialize values back to CSS text.
pub fn to_css(values: &[ComponentValue]) -> String {
    let mut out = String::new();
    for value in values {
        out.push_str(&value.to_string());
    }
    out
}

fn write_number(formatter: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        write!(formatter, "{}", value as i64)
    } else {
        write!(formatter, "{value}")
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => f.write_str(name),
            Self::Number(value) => write_number(f, *value),
            Self::Percentage(value) => {
                write_number(f, *value)?;
                f.write_str("%")
            }
            Self::Dimension { value, unit } => {
                write_number(f, *value)?;
                f.write_str(unit)
            }
            Self::Hash(name) => write!(f, "#{name}"),
            Self::String(text) => write!(f, "\"{text}\""),
            Self::Url(url) => write!(f, "url({url})"),
            Self::Delim(delim) => write!(f, "{delim}"),
            Self::Match(operator) => f.write_str(operator),
            Self::Comma => f.write_str(","),
            Self::Colon => f.write_str(":"),
            Self::Semicolon => f.write_str(";"),
            Self::Whitespace => f.write_str(" "),
            Self::Function { name, args } => write!(f, "{name}({})", to_css(args)),
            Self::ParenBlock(inner) => write!(f, "({})", to_css(inner)),
            Self::SquareBlock(inner) => write!(f, "[{}]", to_css(inner)),
            Self::CurlyBlock(inner) => write!(f, "{{{}}}", to_css(inner)),
        }
    }
}

/// Widen an `f32` token value without dragging in binary noise (`0.1` stays `0.1`).
pub(crate) fn widen(value: f32) -> f64 {
    value
        .to_string()
        .parse::<f64>()
        .unwrap_or_else(|_| f64::from(value))
}

/// Which nested block a token opened.
enum BlockKind {
    Function(String),
    Paren,
    Square,
    Curly,
}

/// Consume every remaining component value of `input`.
///
/// Comments are dropped and whitespace runs collapse to one
/// [`ComponentValue::Whitespace`]. Blocks deeper than [`MAX_NESTING_DEPTH`]
/// record a fatal error in `fatal` and stop the walk.
pub(crate) fn parse_component_values<'input>(
    input: &mut Parser<'input, '_>,
    depth: usize,
    fatal: &RefCell<Option<SyntaxError>>,
) -> Vec<ComponentValue> {
    let mut out: Vec<ComponentValue> = Vec::new();
    loop {
        let location = input.current_source_location();
        let Ok(token) = input.next_including_whitespace() else {
            break;
        };
        let block = match token {
            Token::Function(name) => Some(BlockKind::Function(name.to_ascii_lowercase())),
            Token::ParenthesisBlock => Some(BlockKind::Paren),
            Token::SquareBracketBlock => Some(BlockKind::Square),
            Token::CurlyBracketBlock => Some(BlockKind::Curly),
            other => {
                if let Some(value) = lower_token(other) {
                    let duplicate_space = value.is_whitespace() && out.last().is_some_and(ComponentValue::is_whitespace);
                    if !duplicate_space {
                        out.push(value);
                    }
                }
                None
            }
        };
        let Some(block) = block else {
            continue;
        };
        if depth + 1 > MAX_NESTING_DEPTH {
            if fatal.borrow().is_none() {
                *fatal.borrow_mut() = Some(SyntaxError::too_deep(location));
            }
            break;
        }
        let inner = input
            .parse_nested_block(|nested| {
                Ok::<_, ParseError<'input, ()>>(parse_component_values(nested, depth + 1, fatal))
            })
            .unwrap_or_default();
        out.push(match block {
            BlockKind::Function(name) if name == "url" => match trim(&inner) {
                [ComponentValue::String(url)] => ComponentValue::Url(url.clone()),
                _ => ComponentValue::Function { name, args: inner },
            },
            BlockKind::Function(name) => ComponentValue::Function { name, args: inner },
            BlockKind::Paren => ComponentValue::ParenBlock(inner),
            BlockKind::Square => ComponentValue::SquareBlock(inner),
            BlockKind::Curly => ComponentValue::CurlyBlock(inner),
        });
    }
    out
}

fn lower_token(token: &Token<'_>) -> Option<ComponentValue> {
    Some(match token {
        Token::Ident(name) => ComponentValue::Ident(name.to_string()),
        Token::Number { value, .. } => ComponentValue::Number(widen(*value)),
        Token::Percentage { unit_value, .. } => {
            ComponentValue::Percentage((widen(*unit_value) * 100.0 * 1e6).round() / 1e6)
        }
        Token::Dimension { value, unit, .. } => ComponentValue::Dimension {
            value: widen(*value),
            unit: unit.to_ascii_lowercase(),
        },
        Token::Hash(name) | Token::IDHash(name) => ComponentValue::Hash(name.to_string()),
        Token::QuotedString(text) => ComponentValue::String(text.to_string()),
        Token::UnquotedUrl(url) => ComponentValue::Url(url.to_string()),
        Token::Delim(delim) => ComponentValue::Delim(*delim),
        Token::IncludeMatch => ComponentValue::Match("~="),
        Token::DashMatch => ComponentValue::Match("|="),
        Token::PrefixMatch => ComponentValue::Match("^="),
        Token::SuffixMatch => ComponentValue::Match("$="),
        Token::SubstringMatch => ComponentValue::Match("*="),
        Token::Comma => ComponentValue::Comma,
        Token::Colon => ComponentValue::Colon,
        Token::Semicolon => ComponentValue::Semicolon,
        Token::WhiteSpace(_) => ComponentValue::Whitespace,
        _ => return None,
    })
}

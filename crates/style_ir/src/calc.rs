//! Arithmetic evaluation for `calc()` and friends.
//!
//! Compiled `calc()` arguments are a flat token list: numbers, percentage
//! strings (`"50%"`), the operators `+ - * /` and the parentheses `(` `)`.
//! A single expression works either on plain numbers or on percentages;
//! mixing both yields no value.

use crate::descriptor::StyleDescriptor;
use crate::round;

/// Result of a calculation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CalcValue {
    Number(f64),
    Percentage(f64),
}

impl CalcValue {
    /// Descriptor form: numbers stay numbers, percentages become `"N%"`.
    pub fn into_descriptor(self) -> StyleDescriptor {
        match self {
            Self::Number(value) => StyleDescriptor::Number(round(value)),
            Self::Percentage(value) => {
                StyleDescriptor::String(format!("{}%", crate::format_number(round(value))))
            }
        }
    }

    /// Read a resolved descriptor as a calc operand.
    pub fn from_descriptor(value: &StyleDescriptor) -> Option<Self> {
        match value {
            StyleDescriptor::Number(number) => Some(Self::Number(*number)),
            StyleDescriptor::String(text) => text
                .strip_suffix('%')
                .and_then(|number| number.trim().parse::<f64>().ok())
                .map(Self::Percentage),
            _ => None,
        }
    }

    const fn is_percentage(self) -> bool {
        matches!(self, Self::Percentage(_))
    }

    const fn raw(self) -> f64 {
        match self {
            Self::Number(value) | Self::Percentage(value) => value,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Token {
    Value(f64),
    Operator(char),
    Open,
    Close,
}

const fn precedence(operator: char) -> u8 {
    match operator {
        '*' | '/' => 2,
        _ => 1,
    }
}

fn apply(operator: char, left: f64, right: f64) -> Option<f64> {
    match operator {
        '+' => Some(left + right),
        '-' => Some(left - right),
        '*' => Some(left * right),
        '/' if right != 0.0 => Some(left / right),
        _ => None,
    }
}

/// Lower resolved descriptors into tokens, enforcing a single value mode.
fn tokenize(tokens: &[StyleDescriptor]) -> Option<(Vec<Token>, bool)> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut mode: Option<bool> = None;
    for token in tokens {
        let lowered = match token {
            StyleDescriptor::String(text) if text == "(" => Token::Open,
            StyleDescriptor::String(text) if text == ")" => Token::Close,
            StyleDescriptor::String(text) if matches!(text.as_str(), "+" | "-" | "*" | "/") => {
                Token::Operator(text.chars().next()?)
            }
            other => {
                let value = CalcValue::from_descriptor(other)?;
                match mode {
                    Some(percentage) if percentage != value.is_percentage() => return None,
                    _ => mode = Some(value.is_percentage()),
                }
                Token::Value(value.raw())
            }
        };
        out.push(lowered);
    }
    Some((out, mode.unwrap_or(false)))
}

fn reduce(values: &mut Vec<f64>, operator: char) -> Option<()> {
    let right = values.pop()?;
    let left = values.pop()?;
    values.push(apply(operator, left, right)?);
    Some(())
}

/// Evaluate a flat calc token list with operator precedence.
pub fn evaluate(tokens: &[StyleDescriptor]) -> Option<CalcValue> {
    let (tokens, percentage) = tokenize(tokens)?;
    let mut values: Vec<f64> = Vec::new();
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Value(value) => values.push(value),
            Token::Open => operators.push(Token::Open),
            Token::Close => loop {
                match operators.pop()? {
                    Token::Open => break,
                    Token::Operator(operator) => reduce(&mut values, operator)?,
                    Token::Value(_) | Token::Close => return None,
                }
            },
            Token::Operator(operator) => {
                while let Some(Token::Operator(top)) = operators.last().copied() {
                    if precedence(top) < precedence(operator) {
                        break;
                    }
                    operators.pop();
                    reduce(&mut values, top)?;
                }
                operators.push(Token::Operator(operator));
            }
        }
    }
    while let Some(token) = operators.pop() {
        match token {
            Token::Operator(operator) => reduce(&mut values, operator)?,
            Token::Open | Token::Close | Token::Value(_) => return None,
        }
    }

    if values.len() != 1 {
        return None;
    }
    let result = values.pop()?;
    if !result.is_finite() {
        return None;
    }
    Some(if percentage {
        CalcValue::Percentage(result)
    } else {
        CalcValue::Number(result)
    })
}

/// Evaluate `min`/`max`/`clamp` style selections over resolved operands.
pub fn select(operands: &[StyleDescriptor], pick: fn(f64, f64) -> f64) -> Option<CalcValue> {
    let mut acc: Option<CalcValue> = None;
    for operand in operands {
        let value = CalcValue::from_descriptor(operand)?;
        acc = Some(match acc {
            None => value,
            Some(previous) if previous.is_percentage() != value.is_percentage() => return None,
            Some(previous) => {
                let raw = pick(previous.raw(), value.raw());
                if value.is_percentage() {
                    CalcValue::Percentage(raw)
                } else {
                    CalcValue::Number(raw)
                }
            }
        });
    }
    acc
}

/// `clamp(min, preferred, max)`.
pub fn clamp(operands: &[StyleDescriptor]) -> Option<CalcValue> {
    let [low, preferred, high] = operands else {
        return None;
    };
    let bounded = select(&[preferred.clone(), high.clone()], f64::min)?;
    select(&[low.clone(), bounded.into_descriptor()], f64::max)
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<StyleDescriptor> {
        items
            .iter()
            .map(|item| {
                item.parse::<f64>()
                    .map_or_else(|_| StyleDescriptor::string(*item), StyleDescriptor::Number)
            })
            .collect()
    }

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(evaluate(&tokens(&["10", "+", "2", "*", "3"])), Some(CalcValue::Number(16.0)));
        assert_eq!(
            evaluate(&tokens(&["(", "10", "+", "2", ")", "*", "3"])),
            Some(CalcValue::Number(36.0))
        );
        assert_eq!(evaluate(&tokens(&["10", "-", "4", "-", "3"])), Some(CalcValue::Number(3.0)));
    }

    #[test]
    fn percentages_stay_percentages() {
        let result = evaluate(&tokens(&["50%", "+", "10%"])).unwrap();
        assert_eq!(result.into_descriptor(), StyleDescriptor::string("60%"));
    }

    #[test]
    fn mixing_modes_yields_nothing() {
        assert_eq!(evaluate(&tokens(&["50%", "+", "10"])), None);
        assert_eq!(select(&tokens(&["50%", "10"]), f64::min), None);
    }

    #[test]
    fn clamp_bounds_the_preferred_value() {
        assert_eq!(clamp(&tokens(&["10", "40", "30"])), Some(CalcValue::Number(30.0)));
        assert_eq!(clamp(&tokens(&["10", "5", "30"])), Some(CalcValue::Number(10.0)));
    }
}

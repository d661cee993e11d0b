//! The single fatal compile error.

use core::fmt;
use css_syntax::SyntaxError;
use std::error::Error;

/// Raised only when the stylesheet cannot be parsed at all.
///
/// Unsupported properties, values and selectors never produce an error;
/// they are reported through [`crate::Warnings`] instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    /// 1-based line of the failure.
    pub line: u32,
    /// 1-based column of the failure.
    pub column: u32,
    pub message: String,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to parse stylesheet at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl Error for CompileError {}

impl From<SyntaxError> for CompileError {
    fn from(error: SyntaxError) -> Self {
        Self {
            line: error.line,
            column: error.column,
            message: error.message,
        }
    }
}

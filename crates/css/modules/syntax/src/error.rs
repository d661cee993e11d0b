//! Fatal syntax errors.

use core::error::Error;
use core::fmt;
use cssparser::SourceLocation;

/// A parse failure that aborts the whole stylesheet.
///
/// Ordinary invalid rules and declarations are skipped by the parser and
/// never surface as errors; only structural failures end up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn too_deep(location: SourceLocation) -> Self {
        Self {
            line: location.line + 1,
            column: location.column,
            message: format!("blocks nested deeper than {} levels", crate::MAX_NESTING_DEPTH),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl Error for SyntaxError {}

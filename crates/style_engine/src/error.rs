use core::error::Error;
use core::fmt;

/// A contract violation between compiled rule sets and this runtime.
///
/// User data never produces these: unsupported values are dropped at
/// compile time and conditions that cannot be evaluated are simply false.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StyleError {
    /// A style function this runtime does not know.
    UnknownFunction(String),
    /// A known function with arguments of the wrong shape.
    InvalidArguments {
        function: String,
        reason: &'static str,
    },
}

impl StyleError {
    pub(crate) fn invalid(function: &str, reason: &'static str) -> Self {
        Self::InvalidArguments {
            function: function.to_owned(),
            reason,
        }
    }
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFunction(name) => write!(f, "unknown style function `{name}`"),
            Self::InvalidArguments { function, reason } => {
                write!(f, "invalid arguments for `{function}`: {reason}")
            }
        }
    }
}

impl Error for StyleError {}

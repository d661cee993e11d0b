//! CSS to style rule-set compiler.
//!
//! [`compile`] parses a stylesheet, optionally inlines single-use custom
//! properties, lowers every supported declaration into literal values or
//! runtime style functions and groups the resulting rules by class name:
//!
//! ```text
//! css text ─ parse ─ inline variables ─ walk rules ─┬─ per-property parsers
//!                                                   ├─ selector normalization
//!                                                   └─ sort by specificity ─ RuleSetDocument
//! ```
//!
//! Unsupported properties, values and selectors are dropped one at a time
//! and reported as [`Warnings`]; the only error is a stylesheet that cannot
//! be parsed at all.

#![forbid(unsafe_code)]

mod builder;
mod conditions;
mod error;
mod options;
mod parsers;
mod walk;
mod warnings;

pub use error::CompileError;
pub use options::CompileOptions;
pub use warnings::{Warning, WarningKind, Warnings};

use builder::{Scope, StylesheetBuilder};
use css_syntax::parse_stylesheet;
use css_variables::inline_variables;
use log::{debug, info};
use style_ir::RuleSetDocument;

/// Result of a successful compilation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompilerOutput {
    stylesheet: RuleSetDocument,
    warnings: Warnings,
}

impl CompilerOutput {
    /// The compiled rule-set document.
    #[inline]
    pub const fn stylesheet(&self) -> &RuleSetDocument {
        &self.stylesheet
    }

    /// Everything that was dropped while compiling.
    #[inline]
    pub const fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn into_parts(self) -> (RuleSetDocument, Warnings) {
        (self.stylesheet, self.warnings)
    }
}

/// Compile CSS source text.
///
/// # Errors
///
/// Returns [`CompileError`] when the stylesheet cannot be parsed, which only
/// happens for blocks nested deeper than [`css_syntax::MAX_NESTING_DEPTH`].
pub fn compile(css: &str, options: &CompileOptions) -> Result<CompilerOutput, CompileError> {
    let parsed = parse_stylesheet(css)?;
    let (sheet, used_variables) = if options.inline_variables {
        let inlined = inline_variables(&parsed, &options.preserve_variables);
        if !inlined.inlined_variables.is_empty() {
            debug!("Inlined variables: {:?}", inlined.inlined_variables);
        }
        (inlined.stylesheet, Some(inlined.used_variables))
    } else {
        (parsed, None)
    };

    let mut builder = StylesheetBuilder::new(options, used_variables);
    builder.walk(&sheet.rules, None, &Scope::default());
    let (stylesheet, warnings) = builder.finish();
    info!(
        "Compiled {} classes, {} keyframes, {} root and {} universal variables",
        stylesheet.rules.len(),
        stylesheet.keyframes.len(),
        stylesheet.root_variables.len(),
        stylesheet.universal_variables.len()
    );
    Ok(CompilerOutput { stylesheet, warnings })
}

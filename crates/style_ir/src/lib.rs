//! Compiled style representation.
//!
//! This crate holds the data model that travels between the CSS compiler and
//! the runtime resolver: style descriptors and functions, declarations, rules,
//! specificity vectors, media/container/attribute conditions and the rule-set
//! document that groups everything by class name.
//!
//! The serialized form is a stable, intentionally terse JSON shape:
//!
//! ```text
//! { "s": [[className, StyleRule[]]], "k": [[name, frames]], "vr": [...], "vu": [...] }
//! StyleRule  = { "s": specificity, "d"?, "v"?, "m"?, "cq"?, "c"?, "p"?, "aq"?, "a"?, "dv"?, "target"? }
//! StyleFunction = [{}, name, args, 1?]
//! ```

pub mod calc;
mod declaration;
mod descriptor;
mod document;
mod media;
mod rule;
mod specificity;

pub use declaration::{DynamicDeclaration, PropertyPath, StyleDeclaration};
pub use descriptor::{StyleDescriptor, StyleFunction, StyleObject, format_number};
pub use document::RuleSetDocument;
pub use media::{
    AttributeKind, AttributeOperator, AttributeQuery, ComparisonOp, ContainerQuery,
    MediaCondition, PseudoClassesQuery,
};
pub use rule::{AnimationFrames, Keyframe, StyleRule, VariableValue};
pub use specificity::Specificity;

/// Number of decimal places kept for every numeric output.
pub const DECIMAL_PLACES: i32 = 4;

/// Name of the synthetic variable carrying the element's resolved `color`.
pub const CURRENT_COLOR_VARIABLE: &str = "__rn-css-color";

/// Name of the synthetic variable carrying the element's resolved `fontSize`.
pub const EM_VARIABLE: &str = "__rn-css-em";

/// Name of the root variable carrying the root font size used by `rem()`.
pub const REM_VARIABLE: &str = "__rn-css-rem";

/// Round a value to [`DECIMAL_PLACES`] decimals, normalizing `-0` to `0`.
#[inline]
pub fn round(value: f64) -> f64 {
    let factor = 10f64.powi(DECIMAL_PLACES);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Serde helper: skip serializing `false` flags.
#[inline]
pub(crate) fn is_false(flag: &bool) -> bool {
    !*flag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_keeps_four_decimals() {
        assert_eq!(round(1.234_56), 1.2346);
        assert_eq!(round(-0.000_01), 0.0);
        assert_eq!(round(14.0 * 1.5), 21.0);
    }
}

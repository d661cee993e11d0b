//! Selector specificity.
//! Spec: <https://www.w3.org/TR/selectors-4/#specificity-rules>
//!
//! Classes and attribute selectors count in the class slot, supported
//! pseudo-classes in the pseudo-class slot. `:is()` contributes its most
//! specific argument and `:where()` contributes nothing.

use crate::{ComplexSelector, CompoundSelector, SimpleSelector};
use style_ir::Specificity;

/// Compute the specificity of a compound selector.
pub fn specificity_of_compound(compound: &CompoundSelector) -> Specificity {
    let mut total = Specificity::ZERO;
    for simple in &compound.simples {
        match simple {
            SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => {
                total.class_name = total.class_name.saturating_add(1);
            }
            SimpleSelector::PseudoClass(name) if name != "root" => {
                total.pseudo_class = total.pseudo_class.saturating_add(1);
            }
            SimpleSelector::PseudoElement(_) => {
                total.pseudo_element = total.pseudo_element.saturating_add(1);
            }
            SimpleSelector::PseudoClassFunction { name, arguments } if name == "is" => {
                let strongest = arguments
                    .iter()
                    .flat_map(|list| list.selectors.iter())
                    .map(specificity_of_complex)
                    .max();
                if let Some(strongest) = strongest {
                    total = total.add(strongest);
                }
            }
            _ => {}
        }
    }
    total
}

/// Compute the specificity of a complex selector (sum of its compounds).
pub fn specificity_of_complex(selector: &ComplexSelector) -> Specificity {
    selector
        .compounds()
        .fold(Specificity::ZERO, |total, (_, compound)| {
            total.add(specificity_of_compound(compound))
        })
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_complex_selector;
    use css_syntax::parse_values;

    fn of(text: &str) -> Specificity {
        specificity_of_complex(&parse_complex_selector(&parse_values(text)).unwrap())
    }

    #[test]
    fn counts_classes_and_pseudo_classes() {
        let spec = of(".a.b[disabled]:hover");
        assert_eq!(spec.class_name, 3);
        assert_eq!(spec.pseudo_class, 1);
    }

    #[test]
    fn where_is_free_and_is_is_not() {
        assert_eq!(of(".a:where(.b .c)").class_name, 1);
        assert_eq!(of(".a:is(.b .c, .d)").class_name, 3);
    }
}

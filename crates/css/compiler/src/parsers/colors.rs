//! Color-valued longhands.
//! Spec: <https://www.w3.org/TR/css-color-4/#the-color-property>

use super::values::camel_case;
use super::{Converter, Declarations, one};
use css_syntax::ComponentValue;
use style_ir::PropertyPath;

const COLOR_PROPERTIES: &[&str] = &[
    "color",
    "background-color",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "border-block-start-color",
    "border-block-end-color",
    "text-decoration-color",
    "fill",
    "stroke",
    "accent-color",
];

pub(super) fn parse(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) -> bool {
    let path = match name {
        "caret-color" => PropertyPath::anchored(&["cursorColor"]),
        "border-block-start-color" => PropertyPath::Name("borderTopColor".to_owned()),
        "border-block-end-color" => PropertyPath::Name("borderBottomColor".to_owned()),
        _ if COLOR_PROPERTIES.contains(&name) => PropertyPath::Name(camel_case(name)),
        _ => return false,
    };
    if let Some(value) = one(converter, values)
        && let Some(color) = converter.color(value)
    {
        out.set_path(path, color);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::parsers::values::var_function;
    use style_ir::CURRENT_COLOR_VARIABLE;

    #[test]
    fn colors_are_canonical() {
        assert_eq!(entries("color", "rgb(255 0 0 / 50%)"), vec![entry("color", "#ff000080")]);
        assert_eq!(entries("background-color", "transparent"), vec![entry("backgroundColor", "#00000000")]);
        assert_eq!(entries("caret-color", "blue"), vec![entry("^.cursorColor", "#0000ff")]);
    }

    #[test]
    fn current_color_is_a_variable() {
        assert_eq!(
            entries("border-top-color", "currentcolor"),
            vec![entry("borderTopColor", var_function(CURRENT_COLOR_VARIABLE, None))]
        );
    }
}

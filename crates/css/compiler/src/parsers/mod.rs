//! Per-property value parsers.
//!
//! Each parser lowers the component values of one declaration into
//! [`Declarations`]: property paths paired with literal values or style
//! function trees. Shorthands expand into their longhands here; the
//! stylesheet builder decides what becomes part of a rule's static object
//! and what stays a path-addressed dynamic declaration.

mod animation;
mod border;
mod colors;
mod edges;
mod flex;
mod images;
mod layout;
mod shadows;
mod transform;
mod typography;
pub(crate) mod values;

use crate::warnings::WarningKind;
use css_syntax::{ComponentValue, trim};
use style_ir::{PropertyPath, StyleDescriptor};
pub(crate) use values::Converter;

/// Output of one declaration.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Declarations {
    pub(crate) entries: Vec<(PropertyPath, StyleDescriptor)>,
}

impl Declarations {
    #[inline]
    pub(crate) fn set(&mut self, name: &str, value: StyleDescriptor) {
        self.entries.push((PropertyPath::Name(name.to_owned()), value));
    }

    #[inline]
    pub(crate) fn set_path(&mut self, path: PropertyPath, value: StyleDescriptor) {
        self.entries.push((path, value));
    }

    /// Set `name` when `value` parsed.
    #[inline]
    pub(crate) fn set_some(&mut self, name: &str, value: Option<StyleDescriptor>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }
}

/// Keywords every property accepts but that have no native counterpart.
const CSS_WIDE_KEYWORDS: &[&str] = &["inherit", "initial", "unset", "revert", "revert-layer"];

/// The single component of `values`, warning when there is more than one.
pub(crate) fn one<'values>(converter: &mut Converter<'_>, values: &'values [ComponentValue]) -> Option<&'values ComponentValue> {
    let value = values::single(values);
    if value.is_none() {
        converter.warn_value(values);
    }
    value
}

/// Lower one declaration. `name` is the lowercased CSS property name.
///
/// Unknown properties record a property warning, invalid values a value or
/// function warning; in both cases nothing is written to `out`.
pub(crate) fn parse_declaration(
    converter: &mut Converter<'_>,
    name: &str,
    values: &[ComponentValue],
    out: &mut Declarations,
) {
    let values = trim(values);
    if let [ComponentValue::Ident(keyword)] = values
        && CSS_WIDE_KEYWORDS.iter().any(|wide| keyword.eq_ignore_ascii_case(wide))
    {
        converter.warn_value(values);
        return;
    }
    let known = layout::parse(converter, name, values, out)
        || edges::parse(converter, name, values, out)
        || border::parse(converter, name, values, out)
        || colors::parse(converter, name, values, out)
        || flex::parse(converter, name, values, out)
        || typography::parse(converter, name, values, out)
        || transform::parse(converter, name, values, out)
        || shadows::parse(converter, name, values, out)
        || animation::parse(converter, name, values, out)
        || images::parse(converter, name, values, out);
    if !known {
        converter.warn(WarningKind::Property, name);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::options::CompileOptions;
    use crate::warnings::Warning;
    use css_syntax::parse_values;

    /// Parse `property: value` with default options.
    pub(crate) fn parse(property: &str, value: &str) -> (Vec<(PropertyPath, StyleDescriptor)>, Vec<Warning>) {
        parse_with(&CompileOptions::default(), property, value)
    }

    pub(crate) fn parse_with(
        options: &CompileOptions,
        property: &str,
        value: &str,
    ) -> (Vec<(PropertyPath, StyleDescriptor)>, Vec<Warning>) {
        let mut converter = Converter::new(options, property, false);
        let mut out = Declarations::default();
        parse_declaration(&mut converter, property, &parse_values(value), &mut out);
        (out.entries, converter.take_warnings())
    }

    /// Entries as `(dotted path, value)` pairs.
    pub(crate) fn entries(property: &str, value: &str) -> Vec<(String, StyleDescriptor)> {
        parse(property, value)
            .0
            .into_iter()
            .map(|(path, parsed)| (path.to_string(), parsed))
            .collect()
    }

    pub(crate) fn entry(path: &str, value: impl Into<StyleDescriptor>) -> (String, StyleDescriptor) {
        (path.to_owned(), value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use crate::warnings::WarningKind;

    #[test]
    fn unknown_properties_warn() {
        let (entries, warnings) = parse("grid-template-areas", "\"a b\"");
        assert!(entries.is_empty());
        assert_eq!(warnings[0].kind, WarningKind::Property);
        assert_eq!(warnings[0].detail, "grid-template-areas");
    }

    #[test]
    fn css_wide_keywords_are_dropped() {
        let (entries, warnings) = parse("color", "inherit");
        assert!(entries.is_empty());
        assert_eq!(warnings[0].kind, WarningKind::Value);
    }
}

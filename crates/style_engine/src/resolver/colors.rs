//! Runtime colors and gradients.
//! Spec: <https://www.w3.org/TR/css-color-4/#color-syntax>
//! Spec: <https://www.w3.org/TR/css-color-5/#color-mix>
//! Spec: <https://www.w3.org/TR/css-images-3/#gradients>

use super::{FunctionKind, Resolver, text};
use crate::error::StyleError;
use css_color::{ColorFormat, InterpolationSpace, Rgba, mix, parse_color_str};
use log::debug;
use style_ir::{StyleDescriptor, StyleFunction, StyleObject};

/// Canonical serialization of a resolved color value.
pub(crate) fn canonical(value: &StyleDescriptor) -> Option<String> {
    parse(value).map(|color| color.to_css(ColorFormat::default()))
}

fn parse(value: &StyleDescriptor) -> Option<Rgba> {
    value.as_str().and_then(parse_color_str)
}

impl Resolver<'_, '_> {
    /// `platformColor(names...)`, passed through to the host.
    pub(super) fn platform_color(&self, args: &[StyleDescriptor]) -> Result<StyleDescriptor, StyleError> {
        if args.is_empty() {
            return Err(StyleError::invalid("platformColor", "expected at least one color name"));
        }
        let platform = self.context.read(&self.context.store.environment().platform);
        let key = if platform == "android" { "resource_paths" } else { "semantic" };
        let mut object = StyleObject::new();
        object.insert(key.to_owned(), StyleDescriptor::Array(args.to_vec()));
        Ok(StyleDescriptor::Object(object))
    }

    /// `rgb()`, `hsl()`... whose arguments were only known at runtime.
    pub(super) fn color_function(&self, function: &StyleFunction) -> Result<StyleDescriptor, StyleError> {
        let mut tokens = Vec::with_capacity(function.args.len());
        for argument in &function.args {
            match text(&self.resolve(argument)?) {
                Some(token) => tokens.push(token),
                None => return Ok(StyleDescriptor::Undefined),
            }
        }
        let source = format!("{}({})", function.name, tokens.join(" "));
        Ok(parse_color_str(&source).map_or_else(
            || {
                debug!("Unresolvable color {source}");
                StyleDescriptor::Undefined
            },
            |color| StyleDescriptor::String(color.to_css(ColorFormat::default())),
        ))
    }

    /// `color-mix(space, [color, percent?], [color, percent?])`.
    pub(super) fn color_mix(&self, function: &StyleFunction) -> Result<StyleDescriptor, StyleError> {
        let [space, first, second] = function.args.as_slice() else {
            return Err(StyleError::invalid("color-mix", "expected a space and two operands"));
        };
        let space = space
            .as_str()
            .and_then(InterpolationSpace::parse)
            .ok_or_else(|| StyleError::invalid("color-mix", "unknown interpolation space"))?;
        let (Some((first, first_percent)), Some((second, second_percent))) =
            (self.mix_operand(first)?, self.mix_operand(second)?)
        else {
            return Ok(StyleDescriptor::Undefined);
        };
        Ok(mix(space, first, first_percent, second, second_percent).map_or(StyleDescriptor::Undefined, |color| {
            StyleDescriptor::String(color.to_css(ColorFormat::default()))
        }))
    }

    /// `[color, "p%"?]`; `None` when the color does not resolve.
    fn mix_operand(&self, operand: &StyleDescriptor) -> Result<Option<(Rgba, Option<f64>)>, StyleError> {
        let StyleDescriptor::Array(items) = operand else {
            return Err(StyleError::invalid("color-mix", "operand must be a list"));
        };
        let mut color = None;
        let mut percent = None;
        for item in items {
            let resolved = self.resolve(item)?;
            match resolved.as_str().and_then(|value| value.strip_suffix('%')) {
                Some(number) => percent = number.parse::<f64>().ok(),
                None => color = parse(&resolved),
            }
        }
        Ok(color.map(|found| (found, percent)))
    }

    /// `linear-gradient(direction, stops...)` and `radial-gradient(shape, stops...)`.
    pub(super) fn gradient(&self, kind: FunctionKind, function: &StyleFunction) -> Result<StyleDescriptor, StyleError> {
        let Some((lead, stops)) = function.args.split_first() else {
            return Err(StyleError::invalid(&function.name, "missing gradient arguments"));
        };
        let lead = self.resolve(lead)?;
        let mut color_stops = Vec::with_capacity(stops.len());
        for stop in stops {
            let StyleDescriptor::Array(parts) = self.resolve(stop)? else {
                return Err(StyleError::invalid(&function.name, "color stop must be a list"));
            };
            let Some((color, positions)) = parts.split_first() else {
                return Ok(StyleDescriptor::Undefined);
            };
            let Some(color) = canonical(color) else {
                return Ok(StyleDescriptor::Undefined);
            };
            let mut entry = StyleObject::new();
            entry.insert("color".to_owned(), color.into());
            if !positions.is_empty() {
                entry.insert("positions".to_owned(), StyleDescriptor::Array(positions.to_vec()));
            }
            color_stops.push(StyleDescriptor::Object(entry));
        }
        let (kind_name, lead_key) = if kind == FunctionKind::LinearGradient {
            ("linearGradient", "direction")
        } else {
            ("radialGradient", "shape")
        };
        let mut gradient = StyleObject::new();
        gradient.insert("type".to_owned(), kind_name.into());
        gradient.insert(lead_key.to_owned(), lead);
        gradient.insert("colorStops".to_owned(), StyleDescriptor::Array(color_stops));
        Ok(StyleDescriptor::Object(gradient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_colors_are_hex() {
        assert_eq!(canonical(&"red".into()).as_deref(), Some("#ff0000"));
        assert_eq!(canonical(&"rgb(0 0 255 / 50%)".into()).as_deref(), Some("#0000ff80"));
        assert_eq!(canonical(&4.0.into()), None);
    }
}

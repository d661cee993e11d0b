//! Parsing of `<color>` values.
//! Spec: <https://www.w3.org/TR/css-color-4/#typedef-color>

use crate::mix::parse_color_mix;
use crate::spaces::{
    display_p3_to_srgb, hsl_to_srgb, hwb_to_srgb, lab_to_xyz_d50, linear_to_srgb,
    oklab_to_linear_srgb, polar_to_rectangular, xyz_d50_to_d65, xyz_d65_to_srgb,
};
use crate::{Rgba, parse_css_color};
use css_syntax::{ComponentValue, parse_values, split_commas, split_whitespace, trim};
use log::debug;

/// Color-scheme state threaded through parsing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorContext {
    /// Pick the dark branch of `light-dark()`.
    pub dark: bool,
    /// Set when a `light-dark()` was encountered.
    pub saw_light_dark: bool,
}

/// Parse one component value as a static color.
///
/// Returns `None` for anything that cannot be resolved at this point
/// (`var()`, `currentcolor`, unknown functions, malformed input).
pub fn parse_color(value: &ComponentValue, context: &mut ColorContext) -> Option<Rgba> {
    match value {
        ComponentValue::Ident(name) => {
            if name.eq_ignore_ascii_case("transparent") {
                return Some(Rgba::TRANSPARENT);
            }
            if name.eq_ignore_ascii_case("currentcolor") {
                return None;
            }
            from_bytes(parse_css_color(name)?)
        }
        ComponentValue::Hash(hex) => {
            if !matches!(hex.len(), 3 | 4 | 6 | 8) {
                return None;
            }
            from_bytes(parse_css_color(&format!("#{hex}"))?)
        }
        ComponentValue::Function { name, args } => match name.as_str() {
            "rgb" | "rgba" => parse_rgb(args),
            "hsl" | "hsla" => parse_hsl(args),
            "hwb" => parse_hwb(args),
            "lab" => parse_lab(args, false),
            "lch" => parse_lab(args, true),
            "oklab" => parse_oklab(args, false),
            "oklch" => parse_oklab(args, true),
            "color" => parse_color_function(args),
            "color-mix" => parse_color_mix(args, context),
            "light-dark" => {
                context.saw_light_dark = true;
                let branches = split_commas(args);
                let [light, dark] = branches.as_slice() else {
                    return None;
                };
                let chosen = if context.dark { dark } else { light };
                match chosen {
                    [single] => parse_color(single, context),
                    _ => None,
                }
            }
            _ => {
                debug!("Unsupported color function {name}()");
                None
            }
        },
        _ => None,
    }
}

/// Parse a color from text (used when resolving values at runtime).
pub fn parse_color_str(text: &str) -> Option<Rgba> {
    match parse_values(text).as_slice() {
        [single] => parse_color(single, &mut ColorContext::default()),
        _ => None,
    }
}

fn from_bytes((red, green, blue, alpha): crate::Rgba8Tuple) -> Option<Rgba> {
    let unit = |byte: u8| f64::from(byte) / 255.0;
    Some(Rgba::new(unit(red), unit(green), unit(blue), unit(alpha)))
}

/// Split function arguments into three channels and an optional alpha,
/// accepting both the modern space syntax and the legacy comma syntax.
fn channels(args: &[ComponentValue]) -> Option<([&ComponentValue; 3], Option<&ComponentValue>)> {
    let args = trim(args);
    let parts: Vec<&ComponentValue> = if args.iter().any(|value| matches!(value, ComponentValue::Comma)) {
        let mut parts = Vec::new();
        for part in split_commas(args) {
            match part {
                [single] => parts.push(single),
                _ => return None,
            }
        }
        if parts.len() == 4 {
            let alpha = parts.pop();
            let [first, second, third] = parts.as_slice() else {
                return None;
            };
            return Some(([*first, *second, *third], alpha));
        }
        parts
    } else {
        let mut parts = Vec::new();
        let mut alpha = None;
        let mut after_slash = false;
        for part in split_whitespace(args) {
            for value in part {
                if value.is_delim('/') {
                    after_slash = true;
                } else if after_slash {
                    if alpha.is_some() {
                        return None;
                    }
                    alpha = Some(value);
                } else {
                    parts.push(value);
                }
            }
        }
        if after_slash && alpha.is_none() {
            return None;
        }
        let [first, second, third] = parts.as_slice() else {
            return None;
        };
        return Some(([*first, *second, *third], alpha));
    };
    let [first, second, third] = parts.as_slice() else {
        return None;
    };
    Some(([*first, *second, *third], None))
}

/// `<number> | <percentage> | none`, percentages scaled so `100%` equals `reference`.
fn number_or_percentage(value: &ComponentValue, reference: f64) -> Option<f64> {
    match value {
        ComponentValue::Number(number) => Some(*number),
        ComponentValue::Percentage(percent) => Some(percent / 100.0 * reference),
        ComponentValue::Ident(ident) if ident.eq_ignore_ascii_case("none") => Some(0.0),
        _ => None,
    }
}

/// `<hue>` in degrees.
fn hue(value: &ComponentValue) -> Option<f64> {
    match value {
        ComponentValue::Number(degrees) => Some(*degrees),
        ComponentValue::Dimension { value, unit } => match unit.as_str() {
            "deg" => Some(*value),
            "rad" => Some(value.to_degrees()),
            "grad" => Some(value * 0.9),
            "turn" => Some(value * 360.0),
            _ => None,
        },
        ComponentValue::Ident(ident) if ident.eq_ignore_ascii_case("none") => Some(0.0),
        _ => None,
    }
}

fn alpha(value: Option<&ComponentValue>) -> Option<f64> {
    value.map_or(Some(1.0), |given| number_or_percentage(given, 1.0))
}

fn parse_rgb(args: &[ComponentValue]) -> Option<Rgba> {
    let ([red, green, blue], alpha_value) = channels(args)?;
    let channel = |value: &ComponentValue| number_or_percentage(value, 255.0).map(|byte| byte / 255.0);
    Some(Rgba::from_srgb(
        [channel(red)?, channel(green)?, channel(blue)?],
        alpha(alpha_value)?,
    ))
}

fn parse_hsl(args: &[ComponentValue]) -> Option<Rgba> {
    let ([hue_value, saturation, lightness], alpha_value) = channels(args)?;
    let unit = |value: &ComponentValue| number_or_percentage(value, 100.0).map(|percent| percent / 100.0);
    let rgb = hsl_to_srgb([hue(hue_value)?, unit(saturation)?, unit(lightness)?]);
    Some(Rgba::from_srgb(rgb, alpha(alpha_value)?))
}

fn parse_hwb(args: &[ComponentValue]) -> Option<Rgba> {
    let ([hue_value, whiteness, blackness], alpha_value) = channels(args)?;
    let unit = |value: &ComponentValue| number_or_percentage(value, 100.0).map(|percent| percent / 100.0);
    let rgb = hwb_to_srgb([hue(hue_value)?, unit(whiteness)?, unit(blackness)?]);
    Some(Rgba::from_srgb(rgb, alpha(alpha_value)?))
}

fn parse_lab(args: &[ComponentValue], polar: bool) -> Option<Rgba> {
    let ([lightness, second, third], alpha_value) = channels(args)?;
    let lightness = number_or_percentage(lightness, 100.0)?;
    let lab = if polar {
        polar_to_rectangular([lightness, number_or_percentage(second, 150.0)?, hue(third)?])
    } else {
        [
            lightness,
            number_or_percentage(second, 125.0)?,
            number_or_percentage(third, 125.0)?,
        ]
    };
    let rgb = xyz_d65_to_srgb(xyz_d50_to_d65(lab_to_xyz_d50(lab)));
    Some(Rgba::from_srgb(rgb, alpha(alpha_value)?))
}

fn parse_oklab(args: &[ComponentValue], polar: bool) -> Option<Rgba> {
    let ([lightness, second, third], alpha_value) = channels(args)?;
    let lightness = number_or_percentage(lightness, 1.0)?;
    let oklab = if polar {
        polar_to_rectangular([lightness, number_or_percentage(second, 0.4)?, hue(third)?])
    } else {
        [
            lightness,
            number_or_percentage(second, 0.4)?,
            number_or_percentage(third, 0.4)?,
        ]
    };
    let rgb = linear_to_srgb(oklab_to_linear_srgb(oklab));
    Some(Rgba::from_srgb(rgb, alpha(alpha_value)?))
}

/// `color(<space> c1 c2 c3 [/ alpha])`.
fn parse_color_function(args: &[ComponentValue]) -> Option<Rgba> {
    let args = trim(args);
    let (space, rest) = args.split_first()?;
    let space = space.ident()?.to_ascii_lowercase();
    let ([first, second, third], alpha_value) = channels(rest)?;
    let triple = [
        number_or_percentage(first, 1.0)?,
        number_or_percentage(second, 1.0)?,
        number_or_percentage(third, 1.0)?,
    ];
    let rgb = match space.as_str() {
        "srgb" => triple,
        "srgb-linear" => linear_to_srgb(triple),
        "display-p3" => display_p3_to_srgb(triple),
        "xyz" | "xyz-d65" => xyz_d65_to_srgb(triple),
        "xyz-d50" => xyz_d65_to_srgb(xyz_d50_to_d65(triple)),
        _ => {
            debug!("Unsupported color space {space} in color()");
            return None;
        }
    };
    Some(Rgba::from_srgb(rgb, alpha(alpha_value)?))
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColorFormat;

    fn canonical(text: &str) -> Option<String> {
        parse_color_str(text).map(|color| color.to_css(ColorFormat::default()))
    }

    #[test]
    fn equivalent_notations_agree() {
        let expected = Some("#ff0000".to_owned());
        assert_eq!(canonical("red"), expected);
        assert_eq!(canonical("rgb(255 0 0)"), expected);
        assert_eq!(canonical("rgba(255, 0, 0, 1)"), expected);
        assert_eq!(canonical("hsl(0 100% 50%)"), expected);
        assert_eq!(canonical("hsl(0deg, 100%, 50%)"), expected);
        assert_eq!(canonical("hwb(0 0% 0%)"), expected);
        assert_eq!(canonical("oklch(62.8% 0.2577 29.23)"), expected);
        assert_eq!(canonical("color(srgb 1 0 0)"), expected);
    }

    #[test]
    fn canonical_output_is_a_fixed_point() {
        for input in ["oklch(70% 0.1 200)", "lab(50% 40 -20)", "hsl(210 40% 30% / 0.25)"] {
            let once = canonical(input).unwrap();
            assert_eq!(canonical(&once).unwrap(), once, "{input}");
        }
    }

    #[test]
    fn alpha_and_transparent() {
        assert_eq!(canonical("rgb(0 0 0 / 50%)").as_deref(), Some("#00000080"));
        assert_eq!(canonical("transparent").as_deref(), Some("#00000000"));
        assert_eq!(canonical("currentcolor"), None);
        assert_eq!(canonical("rgb(0 0)"), None);
    }

    #[test]
    fn unsupported_functions_and_spaces_are_rejected() {
        assert_eq!(canonical("device-cmyk(0 0 0 1)"), None);
        assert_eq!(canonical("color(rec2020 1 0 0)"), None);
        assert_eq!(canonical("color-mix(in cmyk, red, blue)"), None);
    }

    #[test]
    fn light_dark_picks_branch() {
        let values = parse_values("light-dark(white, black)");
        let mut light = ColorContext::default();
        let mut dark = ColorContext {
            dark: true,
            ..ColorContext::default()
        };
        let light_color = parse_color(&values[0], &mut light).unwrap();
        let dark_color = parse_color(&values[0], &mut dark).unwrap();
        assert!(light.saw_light_dark && dark.saw_light_dark);
        assert_eq!(light_color.to_css(ColorFormat::default()), "#ffffff");
        assert_eq!(dark_color.to_css(ColorFormat::default()), "#000000");
    }
}

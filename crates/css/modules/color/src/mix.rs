//! `color-mix()` interpolation.
//! Spec: <https://www.w3.org/TR/css-color-5/#color-mix>
//! Spec: <https://www.w3.org/TR/css-color-4/#interpolation>

use crate::parse::{ColorContext, parse_color};
use crate::spaces::{
    hsl_to_srgb, hwb_to_srgb, lab_to_xyz_d50, linear_srgb_to_oklab, linear_to_srgb,
    oklab_to_linear_srgb, polar_to_rectangular, rectangular_to_polar, srgb_to_hsl,
    srgb_to_linear, srgb_to_xyz_d65, xyz_d50_to_d65, xyz_d50_to_lab, xyz_d65_to_d50,
    xyz_d65_to_srgb,
};
use crate::Rgba;
use css_syntax::{ComponentValue, split_commas, split_whitespace};
use log::debug;

/// Color space used for interpolation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterpolationSpace {
    Srgb,
    SrgbLinear,
    Lab,
    Oklab,
    Xyz,
    Hsl,
    Hwb,
    Lch,
    Oklch,
}

impl InterpolationSpace {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "srgb" => Self::Srgb,
            "srgb-linear" => Self::SrgbLinear,
            "lab" => Self::Lab,
            "oklab" => Self::Oklab,
            "xyz" | "xyz-d65" | "xyz-d50" => Self::Xyz,
            "hsl" => Self::Hsl,
            "hwb" => Self::Hwb,
            "lch" => Self::Lch,
            "oklch" => Self::Oklch,
            _ => return None,
        })
    }

    /// Index of the hue coordinate for polar spaces.
    const fn hue_index(self) -> Option<usize> {
        match self {
            Self::Hsl | Self::Hwb => Some(0),
            Self::Lch | Self::Oklch => Some(2),
            Self::Srgb | Self::SrgbLinear | Self::Lab | Self::Oklab | Self::Xyz => None,
        }
    }

    fn from_srgb(self, rgb: [f64; 3]) -> [f64; 3] {
        let lab = || xyz_d50_to_lab(xyz_d65_to_d50(srgb_to_xyz_d65(rgb)));
        let oklab = || linear_srgb_to_oklab(srgb_to_linear(rgb));
        match self {
            Self::Srgb => rgb,
            Self::SrgbLinear => srgb_to_linear(rgb),
            Self::Xyz => srgb_to_xyz_d65(rgb),
            Self::Lab => lab(),
            Self::Oklab => oklab(),
            Self::Lch => rectangular_to_polar(lab()),
            Self::Oklch => rectangular_to_polar(oklab()),
            Self::Hsl => srgb_to_hsl(rgb),
            Self::Hwb => {
                let [hue, _, _] = srgb_to_hsl(rgb);
                let whiteness = rgb[0].min(rgb[1]).min(rgb[2]);
                let blackness = 1.0 - rgb[0].max(rgb[1]).max(rgb[2]);
                [hue, whiteness, blackness]
            }
        }
    }

    fn to_srgb(self, coordinates: [f64; 3]) -> [f64; 3] {
        let from_lab = |lab: [f64; 3]| xyz_d65_to_srgb(xyz_d50_to_d65(lab_to_xyz_d50(lab)));
        match self {
            Self::Srgb => coordinates,
            Self::SrgbLinear => linear_to_srgb(coordinates),
            Self::Xyz => xyz_d65_to_srgb(coordinates),
            Self::Lab => from_lab(coordinates),
            Self::Oklab => linear_to_srgb(oklab_to_linear_srgb(coordinates)),
            Self::Lch => from_lab(polar_to_rectangular(coordinates)),
            Self::Oklch => linear_to_srgb(oklab_to_linear_srgb(polar_to_rectangular(coordinates))),
            Self::Hsl => hsl_to_srgb(coordinates),
            Self::Hwb => hwb_to_srgb(coordinates),
        }
    }
}

/// Mix two colors. Percentages follow the `color-mix()` normalization rules.
pub fn mix(
    space: InterpolationSpace,
    first: Rgba,
    first_percent: Option<f64>,
    second: Rgba,
    second_percent: Option<f64>,
) -> Option<Rgba> {
    let (first_percent, second_percent) = match (first_percent, second_percent) {
        (None, None) => (50.0, 50.0),
        (Some(left), None) => (left, 100.0 - left),
        (None, Some(right)) => (100.0 - right, right),
        (Some(left), Some(right)) => (left, right),
    };
    if first_percent < 0.0 || second_percent < 0.0 {
        return None;
    }
    let sum = first_percent + second_percent;
    if sum <= 0.0 {
        return None;
    }
    let alpha_multiplier = if sum < 100.0 { sum / 100.0 } else { 1.0 };
    let weight = second_percent / sum;

    let mut start = space.from_srgb(first.channels());
    let mut end = space.from_srgb(second.channels());
    let hue_index = space.hue_index();
    if let Some(index) = hue_index {
        let difference = end[index] - start[index];
        if difference > 180.0 {
            start[index] += 360.0;
        } else if difference < -180.0 {
            end[index] += 360.0;
        }
    }

    let alpha = first.alpha * (1.0 - weight) + second.alpha * weight;
    let mut mixed = [0.0; 3];
    for (channel, slot) in mixed.iter_mut().enumerate() {
        if Some(channel) == hue_index {
            *slot = start[channel] * (1.0 - weight) + end[channel] * weight;
        } else {
            let premultiplied = start[channel] * first.alpha * (1.0 - weight)
                + end[channel] * second.alpha * weight;
            *slot = if alpha > 0.0 { premultiplied / alpha } else { 0.0 };
        }
    }
    if let Some(index) = hue_index {
        mixed[index] = mixed[index].rem_euclid(360.0);
    }
    Some(Rgba::from_srgb(space.to_srgb(mixed), alpha * alpha_multiplier))
}

/// One `<color> <percentage>?` operand, in either order.
fn operand(
    part: &[ComponentValue],
    context: &mut ColorContext,
) -> Option<(Rgba, Option<f64>)> {
    let mut color = None;
    let mut percent = None;
    for piece in split_whitespace(part) {
        match piece {
            [ComponentValue::Percentage(value)] if percent.is_none() => percent = Some(*value),
            [value] if color.is_none() => color = Some(parse_color(value, context)?),
            _ => return None,
        }
    }
    Some((color?, percent))
}

/// `color-mix(in <space>, <color> <p>?, <color> <p>?)`
pub(crate) fn parse_color_mix(args: &[ComponentValue], context: &mut ColorContext) -> Option<Rgba> {
    let parts = split_commas(args);
    let [method, first, second] = parts.as_slice() else {
        return None;
    };
    let words = split_whitespace(method);
    let space = match words.as_slice() {
        [[keyword], [name], ..] if keyword.is_ident("in") => {
            let name = name.ident()?;
            let Some(space) = InterpolationSpace::parse(name) else {
                debug!("Unsupported color-mix() interpolation space {name}");
                return None;
            };
            space
        }
        _ => return None,
    };
    let (first, first_percent) = operand(first, context)?;
    let (second, second_percent) = operand(second, context)?;
    mix(space, first, first_percent, second, second_percent)
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorFormat, parse_color_str};

    fn canonical(text: &str) -> String {
        parse_color_str(text).unwrap().to_css(ColorFormat::default())
    }

    #[test]
    fn srgb_midpoint() {
        assert_eq!(canonical("color-mix(in srgb, red, blue)"), "#800080");
        assert_eq!(canonical("color-mix(in srgb, red 25%, blue)"), "#4000bf");
    }

    #[test]
    fn percentages_below_hundred_reduce_alpha() {
        assert_eq!(canonical("color-mix(in srgb, red 30%, red 20%)"), "#ff000080");
    }

    #[test]
    fn identical_colors_mix_to_themselves() {
        for space in ["oklab", "oklch", "lab", "lch", "hsl", "hwb", "srgb-linear", "xyz"] {
            let mixed = canonical(&format!("color-mix(in {space}, #336699, #336699)"));
            assert_eq!(mixed, "#336699", "{space}");
        }
    }
}

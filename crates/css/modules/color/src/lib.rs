//! CSS Color Module Level 4: Color spaces, color values, and opacity.
//! Spec: <https://www.w3.org/TR/css-color-4/>
//! Spec: <https://www.w3.org/TR/css-color-5/#color-mix>
//!
//! Every supported notation is converted to one canonical sRGB form so that
//! visually identical inputs serialize to the same string.

mod mix;
mod parse;
mod spaces;

use core::fmt;
use csscolorparser::Color;

pub use mix::{InterpolationSpace, mix};
pub use parse::{ColorContext, parse_color, parse_color_str};

/// 8-bit RGBA channels.
pub type Rgba8Tuple = (u8, u8, u8, u8);

/// Parse a named or hex color into 8-bit RGBA channels.
///
/// Spec: <https://www.w3.org/TR/css-color-4/#named-colors>
/// Spec: <https://www.w3.org/TR/css-color-4/#hex-notation>
#[inline]
pub fn parse_css_color(input: &str) -> Option<Rgba8Tuple> {
    let parsed: Color = input.parse().ok()?;
    let [red, green, blue, alpha] = parsed.to_rgba8();
    Some((red, green, blue, alpha))
}

/// A color in gamma-encoded sRGB with channels in `0..=1`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

/// Output notation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColorFormat {
    /// `#rrggbb[aa]` when true, `rgb(r g b / a)` otherwise.
    pub hex: bool,
    /// Decimals kept for the alpha channel in functional notation.
    pub precision: u8,
}

impl Default for ColorFormat {
    #[inline]
    fn default() -> Self {
        Self {
            hex: true,
            precision: 3,
        }
    }
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Build from a channel triple, clipping into the sRGB gamut.
    pub(crate) fn from_srgb(rgb: [f64; 3], alpha: f64) -> Self {
        let clip = |channel: f64| if channel.is_nan() { 0.0 } else { channel.clamp(0.0, 1.0) };
        Self::new(clip(rgb[0]), clip(rgb[1]), clip(rgb[2]), clip(alpha))
    }

    #[inline]
    pub(crate) const fn channels(self) -> [f64; 3] {
        [self.red, self.green, self.blue]
    }

    /// Channels quantized to bytes.
    pub fn to_rgba8(self) -> [u8; 4] {
        let byte = |channel: f64| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        [byte(self.red), byte(self.green), byte(self.blue), byte(self.alpha)]
    }

    /// Canonical serialization.
    pub fn to_css(self, format: ColorFormat) -> String {
        let [red, green, blue, alpha] = self.to_rgba8();
        if format.hex {
            if alpha == 255 {
                format!("#{red:02x}{green:02x}{blue:02x}")
            } else {
                format!("#{red:02x}{green:02x}{blue:02x}{alpha:02x}")
            }
        } else if alpha == 255 {
            format!("rgb({red} {green} {blue})")
        } else {
            let factor = 10f64.powi(i32::from(format.precision));
            let rounded = (self.alpha * factor).round() / factor;
            format!("rgb({red} {green} {blue} / {rounded})")
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css(ColorFormat::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_hex_colors() {
        assert_eq!(parse_css_color("red"), Some((255, 0, 0, 255)));
        assert_eq!(parse_css_color("#00ff0080"), Some((0, 255, 0, 128)));
        assert_eq!(parse_css_color("not-a-color"), None);
    }

    #[test]
    fn serialization_formats() {
        let color = Rgba::new(1.0, 0.0, 0.0, 0.5);
        assert_eq!(color.to_css(ColorFormat::default()), "#ff000080");
        assert_eq!(
            color.to_css(ColorFormat {
                hex: false,
                precision: 3
            }),
            "rgb(255 0 0 / 0.5)"
        );
        assert_eq!(Rgba::TRANSPARENT.to_css(ColorFormat::default()), "#00000000");
    }
}

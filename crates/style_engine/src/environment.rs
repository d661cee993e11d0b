//! Process-wide environment signals: viewport, color scheme, font metrics.
//! Spec: <https://www.w3.org/TR/mediaqueries-5/#mq-features>

use serde::Deserialize;
use style_query::{Signal, batch};

/// Preferred color scheme.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Initial environment values.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentOptions {
    pub window_width: f64,
    pub window_height: f64,
    pub color_scheme: ColorScheme,
    /// Root font size used by `rem()`.
    pub root_font_size: f64,
    pub pixel_ratio: f64,
    pub font_scale: f64,
    /// Thinnest visible line; `None` derives it from the pixel ratio.
    pub hairline_width: Option<f64>,
    /// Platform name matched by `@media ios` and friends.
    pub platform: String,
    pub reduced_motion: bool,
}

impl Default for EnvironmentOptions {
    fn default() -> Self {
        Self {
            window_width: 390.0,
            window_height: 844.0,
            color_scheme: ColorScheme::Light,
            root_font_size: 14.0,
            pixel_ratio: 1.0,
            font_scale: 1.0,
            hairline_width: None,
            platform: "ios".to_owned(),
            reduced_motion: false,
        }
    }
}

fn hairline(options: &EnvironmentOptions) -> f64 {
    options.hairline_width.unwrap_or_else(|| {
        if options.pixel_ratio > 0.0 {
            1.0 / options.pixel_ratio
        } else {
            1.0
        }
    })
}

/// The environment as signals; every setter notifies only the components
/// that read the changed value.
#[derive(Debug)]
pub struct Environment {
    pub(crate) window_width: Signal<f64>,
    pub(crate) window_height: Signal<f64>,
    pub(crate) color_scheme: Signal<ColorScheme>,
    pub(crate) root_font_size: Signal<f64>,
    pub(crate) pixel_ratio: Signal<f64>,
    pub(crate) font_scale: Signal<f64>,
    pub(crate) hairline_width: Signal<f64>,
    pub(crate) platform: Signal<String>,
    pub(crate) reduced_motion: Signal<bool>,
}

impl Environment {
    pub(crate) fn new(options: &EnvironmentOptions) -> Self {
        Self {
            window_width: Signal::new(options.window_width),
            window_height: Signal::new(options.window_height),
            color_scheme: Signal::new(options.color_scheme),
            root_font_size: Signal::new(options.root_font_size),
            pixel_ratio: Signal::new(options.pixel_ratio),
            font_scale: Signal::new(options.font_scale),
            hairline_width: Signal::new(hairline(options)),
            platform: Signal::new(options.platform.clone()),
            reduced_motion: Signal::new(options.reduced_motion),
        }
    }

    /// Update both viewport dimensions as one change.
    pub fn set_window_size(&self, width: f64, height: f64) {
        batch(|| {
            self.window_width.set(width);
            self.window_height.set(height);
        });
    }

    pub fn set_color_scheme(&self, scheme: ColorScheme) {
        self.color_scheme.set(scheme);
    }

    pub fn set_root_font_size(&self, size: f64) {
        self.root_font_size.set(size);
    }

    pub fn set_pixel_ratio(&self, ratio: f64) {
        self.pixel_ratio.set(ratio);
    }

    pub fn set_font_scale(&self, scale: f64) {
        self.font_scale.set(scale);
    }

    pub fn set_hairline_width(&self, width: f64) {
        self.hairline_width.set(width);
    }

    pub fn set_platform(&self, platform: &str) {
        self.platform.set(platform.to_owned());
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        self.reduced_motion.set(reduced);
    }

    #[inline]
    pub fn window_size(&self) -> (f64, f64) {
        (self.window_width.peek(), self.window_height.peek())
    }

    #[inline]
    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme.peek()
    }

    /// Restore every value from `options` in one batch.
    pub fn reset(&self, options: &EnvironmentOptions) {
        batch(|| {
            self.set_window_size(options.window_width, options.window_height);
            self.color_scheme.set(options.color_scheme);
            self.root_font_size.set(options.root_font_size);
            self.pixel_ratio.set(options.pixel_ratio);
            self.font_scale.set(options.font_scale);
            self.hairline_width.set(hairline(options));
            self.platform.set(options.platform.clone());
            self.reduced_motion.set(options.reduced_motion);
        });
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_with_defaults() {
        let options: EnvironmentOptions =
            serde_json::from_str(r#"{"windowWidth": 800, "colorScheme": "dark", "pixelRatio": 2}"#).unwrap();
        assert_eq!(options.window_width, 800.0);
        assert_eq!(options.window_height, 844.0);
        assert_eq!(options.color_scheme, ColorScheme::Dark);
        assert_eq!(hairline(&options), 0.5);
    }

    #[test]
    fn window_size_updates_as_one_change() {
        use core::cell::Cell;
        use std::rc::Rc;
        use style_query::Effect;

        let environment = Environment::new(&EnvironmentOptions::default());
        let runs = Rc::new(Cell::new(0));
        let seen = Rc::clone(&runs);
        let effect = Effect::new(move || seen.set(seen.get() + 1));
        environment.window_width.get(Some(&effect));
        environment.window_height.get(Some(&effect));
        environment.set_window_size(1024.0, 768.0);
        assert_eq!(runs.get(), 1);
        assert_eq!(environment.window_size(), (1024.0, 768.0));
    }
}

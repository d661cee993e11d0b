//! Compiler configuration.

use css_color::ColorFormat;
use serde::Deserialize;

/// Options accepted by [`crate::compile`]. Deserializes from camelCase JSON.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// Pixels per `rem`. `None` keeps `rem()` for runtime resolution.
    pub inline_rem: Option<f64>,
    /// Substitute single-use custom properties and drop unused ones.
    pub inline_variables: bool,
    /// Custom properties (with or without `--`) that are never inlined or dropped.
    pub preserve_variables: Vec<String>,
    /// `#rrggbb[aa]` output instead of `rgb()`.
    pub hex_colors: bool,
    /// Decimals of the alpha channel in functional color output.
    pub color_precision: u8,
    /// Leading compound removed from every selector, e.g. `#app`.
    pub selector_prefix: Option<String>,
    /// Glob patterns over property names whose warnings are suppressed.
    pub ignored_warnings: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            inline_rem: Some(14.0),
            inline_variables: true,
            preserve_variables: Vec::new(),
            hex_colors: true,
            color_precision: 3,
            selector_prefix: None,
            ignored_warnings: Vec::new(),
        }
    }
}

impl CompileOptions {
    #[inline]
    pub(crate) const fn color_format(&self) -> ColorFormat {
        ColorFormat {
            hex: self.hex_colors,
            precision: self.color_precision,
        }
    }

    pub(crate) fn is_preserved(&self, variable: &str) -> bool {
        let bare = variable.trim_start_matches("--");
        self.preserve_variables
            .iter()
            .any(|name| name.trim_start_matches("--") == bare)
    }
}

#[allow(clippy::unwrap_used, reason = "Tests fail loudly on malformed fixtures")]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options: CompileOptions =
            serde_json::from_str(r#"{ "inlineRem": null, "hexColors": false }"#).unwrap();
        assert_eq!(options.inline_rem, None);
        assert!(!options.hex_colors);
        assert!(options.inline_variables);
        assert_eq!(options.color_precision, 3);
    }
}

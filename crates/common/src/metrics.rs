use serde::{Deserialize, Serialize};

/// Font used to measure and draw label text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    pub family: String,
    pub size_px: f64,
}

impl Default for Font {
    /// The HTML canvas default, `10px sans-serif`.
    fn default() -> Self {
        Self {
            family: "sans-serif".into(),
            size_px: 10.0,
        }
    }
}

impl Font {
    /// CSS font shorthand, e.g. `12px Helvetica`.
    pub fn css(&self) -> String {
        format!("{}px {}", self.size_px, self.family)
    }
}

/// Text measurement backend.
///
/// Implementations must be pure: the same text and font always produce the
/// same width, and measuring never mutates drawing state.
pub trait TextMetrics {
    /// Advance width of `text` in pixels.
    fn text_width(&self, text: &str, font: &Font) -> f64;
}

/// Headless metrics: every glyph advances a fixed fraction of the em size.
///
/// Stands in for a font engine where none is available (tests, CLI output).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvanceMetrics {
    pub em_ratio: f64,
}

impl Default for AdvanceMetrics {
    fn default() -> Self {
        Self { em_ratio: 0.6 }
    }
}

impl TextMetrics for AdvanceMetrics {
    fn text_width(&self, text: &str, font: &Font) -> f64 {
        text.chars().count() as f64 * font.size_px * self.em_ratio
    }
}

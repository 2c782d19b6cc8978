use serde::{Deserialize, Serialize};

/// Horizontal alignment of the text relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// Keyword as used by canvas `textAlign`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Visual options of a text overlay.
///
/// Every key is optional when deserialized; missing keys take the defaults
/// below. Keys use camelCase (`fillOpacity`, `textAlign`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    /// Text color. Also the fill color unless `fill_color` is set.
    pub color: String,
    /// Draw the glyph interiors. Canvas output is skipped entirely when false.
    pub fill: bool,
    pub fill_color: Option<String>,
    /// 0.0 ..= 1.0
    pub fill_opacity: f64,
    /// Clockwise rotation around the anchor, in radians.
    pub rotation: f64,
    /// Outline the glyphs (vector backend only).
    pub stroke: bool,
    /// Stroke opacity, 0.0 ..= 1.0
    pub opacity: f64,
    /// Stroke width in pixels.
    pub weight: f64,
    pub text_align: TextAlign,
    pub class_name: Option<String>,
    pub interactive: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: "black".into(),
            fill: true,
            fill_color: None,
            fill_opacity: 1.0,
            rotation: 0.0,
            stroke: false,
            opacity: 1.0,
            weight: 3.0,
            text_align: TextAlign::Center,
            class_name: None,
            interactive: false,
        }
    }
}

impl TextStyle {
    /// Color used for glyph fill.
    pub fn effective_fill_color(&self) -> &str {
        self.fill_color.as_deref().unwrap_or(&self.color)
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_rotation(mut self, radians: f64) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }

    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }
}

use glam::{DAffine2, DVec2};
use maptext_common::{AdvanceMetrics, Font, TextMetrics};
use maptext_overlay::TextAlign;
use serde::Serialize;

/// 2D drawing surface with canvas-style state: a current transform, fill
/// style, global alpha, text alignment and font.
pub trait DrawingSurface {
    /// Resize to `width` x `height` pixels. Clears pixels and resets all
    /// state (transform to identity, default font, alpha 1).
    fn resize(&mut self, width: u32, height: u32);
    /// Clear pixels, keeping state.
    fn clear(&mut self);
    /// Non-finite arguments leave the transform unchanged.
    fn translate(&mut self, x: f64, y: f64);
    /// Clockwise rotation in radians. Non-finite angles are ignored.
    fn rotate(&mut self, angle: f64);
    /// Replace the current transform outright.
    fn set_transform(&mut self, transform: DAffine2);
    fn set_fill_style(&mut self, color: &str);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_font(&mut self, font: &Font);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    /// Width of `text` under the current font. Does not change state.
    fn measure_text(&self, text: &str) -> f64;
    /// Current transform from user space to device pixels.
    fn transform(&self) -> DAffine2;
}

/// One state change or draw call recorded by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Resize {
        width: u32,
        height: u32,
    },
    Clear,
    Translate {
        x: f64,
        y: f64,
    },
    Rotate {
        angle: f64,
    },
    /// Column-major `[a, b, c, d, e, f]`, as for `setTransform`.
    SetTransform {
        matrix: [f64; 6],
    },
    FillStyle {
        color: String,
    },
    GlobalAlpha {
        alpha: f64,
    },
    TextAlign {
        align: TextAlign,
    },
    Font {
        font: String,
    },
    /// Text fill, resolved to device space.
    FillText {
        text: String,
        at: [f64; 2],
        angle: f64,
        color: String,
        alpha: f64,
        align: TextAlign,
    },
}

/// In-memory surface: keeps canvas state and records every mutation.
#[derive(Debug, Clone)]
pub struct RecordingSurface<M: TextMetrics = AdvanceMetrics> {
    width: u32,
    height: u32,
    transform: DAffine2,
    font: Font,
    fill_style: String,
    global_alpha: f64,
    text_align: TextAlign,
    metrics: M,
    commands: Vec<DrawCommand>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::with_metrics(AdvanceMetrics::default())
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: TextMetrics> RecordingSurface<M> {
    pub fn with_metrics(metrics: M) -> Self {
        Self {
            width: 0,
            height: 0,
            transform: DAffine2::IDENTITY,
            font: Font::default(),
            fill_style: "black".into(),
            global_alpha: 1.0,
            text_align: TextAlign::Left,
            metrics,
            commands: Vec::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Everything recorded since the last [`take_commands`](Self::take_commands).
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Text fills recorded since the last clear or resize.
    pub fn visible_text(&self) -> Vec<&DrawCommand> {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear | DrawCommand::Resize { .. }))
            .map_or(0, |i| i + 1);
        self.commands[start..]
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillText { .. }))
            .collect()
    }
}

impl<M: TextMetrics> DrawingSurface for RecordingSurface<M> {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.transform = DAffine2::IDENTITY;
        self.font = Font::default();
        self.fill_style = "black".into();
        self.global_alpha = 1.0;
        self.text_align = TextAlign::Left;
        self.commands.push(DrawCommand::Resize { width, height });
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn translate(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.transform = self.transform * DAffine2::from_translation(DVec2::new(x, y));
        self.commands.push(DrawCommand::Translate { x, y });
    }

    fn rotate(&mut self, angle: f64) {
        if !angle.is_finite() {
            return;
        }
        self.transform = self.transform * DAffine2::from_angle(angle);
        self.commands.push(DrawCommand::Rotate { angle });
    }

    fn set_transform(&mut self, transform: DAffine2) {
        if !transform.is_finite() {
            return;
        }
        self.transform = transform;
        self.commands.push(DrawCommand::SetTransform {
            matrix: transform.to_cols_array(),
        });
    }

    fn set_fill_style(&mut self, color: &str) {
        self.fill_style = color.to_string();
        self.commands.push(DrawCommand::FillStyle {
            color: color.to_string(),
        });
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        // out-of-range values are ignored, as on an HTML canvas
        if !(0.0..=1.0).contains(&alpha) {
            return;
        }
        self.global_alpha = alpha;
        self.commands.push(DrawCommand::GlobalAlpha { alpha });
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.text_align = align;
        self.commands.push(DrawCommand::TextAlign { align });
    }

    fn set_font(&mut self, font: &Font) {
        self.font = font.clone();
        self.commands.push(DrawCommand::Font { font: font.css() });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let at = self.transform.transform_point2(DVec2::new(x, y));
        let axis = self.transform.matrix2.x_axis;
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            at: at.to_array(),
            angle: axis.y.atan2(axis.x),
            color: self.fill_style.clone(),
            alpha: self.global_alpha,
            align: self.text_align,
        });
    }

    fn measure_text(&self, text: &str) -> f64 {
        self.metrics.text_width(text, &self.font)
    }

    fn transform(&self) -> DAffine2 {
        self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_then_rotate_composes_like_canvas() {
        let mut s = RecordingSurface::new();
        s.translate(100.0, 50.0);
        s.rotate(std::f64::consts::FRAC_PI_2);
        // local +x maps to device +y after a quarter turn
        let p = s.transform().transform_point2(DVec2::new(10.0, 0.0));
        assert!((p - DVec2::new(100.0, 60.0)).length() < 1e-9);
    }

    #[test]
    fn fill_text_resolves_device_position() {
        let mut s = RecordingSurface::new();
        s.translate(-10.0, -10.0);
        s.translate(30.0, 40.0);
        s.set_fill_style("red");
        s.fill_text("hi", 0.0, 0.0);
        match s.commands().last().unwrap() {
            DrawCommand::FillText { at, color, angle, .. } => {
                assert_eq!(*at, [20.0, 30.0]);
                assert_eq!(color, "red");
                assert_eq!(*angle, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn resize_resets_state() {
        let mut s = RecordingSurface::new();
        s.translate(5.0, 5.0);
        s.set_font(&Font {
            family: "serif".into(),
            size_px: 20.0,
        });
        s.resize(64, 32);
        assert_eq!(s.transform(), DAffine2::IDENTITY);
        assert_eq!(s.font(), &Font::default());
        assert_eq!(s.size(), (64, 32));
    }

    #[test]
    fn measure_uses_current_font_without_recording() {
        let mut s = RecordingSurface::new();
        let w10 = s.measure_text("abcd");
        s.set_font(&Font {
            family: "sans-serif".into(),
            size_px: 20.0,
        });
        let before = s.commands().len();
        assert_eq!(s.measure_text("abcd"), w10 * 2.0);
        assert_eq!(s.commands().len(), before);
    }

    #[test]
    fn non_finite_transforms_are_ignored() {
        let mut s = RecordingSurface::new();
        s.translate(10.0, 20.0);
        let before = s.transform();
        s.rotate(f64::NAN);
        s.rotate(f64::INFINITY);
        s.translate(f64::NAN, 0.0);
        s.set_transform(DAffine2::from_angle(f64::NAN));
        assert_eq!(s.transform(), before);
        assert_eq!(s.commands().len(), 1);
    }

    #[test]
    fn set_transform_replaces_without_drift() {
        let mut s = RecordingSurface::new();
        s.translate(-40.0, -30.0);
        let saved = s.transform();
        s.translate(123.456, 78.9);
        s.rotate(0.7);
        s.set_transform(saved);
        assert_eq!(s.transform(), saved);
    }

    #[test]
    fn invalid_alpha_is_ignored() {
        let mut s = RecordingSurface::new();
        s.set_global_alpha(1.5);
        assert!(s.commands().is_empty());
    }

    #[test]
    fn visible_text_starts_after_last_clear() {
        let mut s = RecordingSurface::new();
        s.fill_text("old", 0.0, 0.0);
        s.clear();
        s.fill_text("new", 0.0, 0.0);
        let visible = s.visible_text();
        assert_eq!(visible.len(), 1);
        assert!(matches!(visible[0], DrawCommand::FillText { text, .. } if text == "new"));
    }

    #[test]
    fn commands_serialize_with_op_tag() {
        let json = serde_json::to_string(&DrawCommand::Rotate { angle: 0.5 }).unwrap();
        assert_eq!(json, r#"{"op":"rotate","angle":0.5}"#);
    }
}

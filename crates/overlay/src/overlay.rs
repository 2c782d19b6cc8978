use glam::DVec2;
use maptext_common::{Bounds, LatLng, OverlayId};

use crate::style::TextStyle;

/// Errors from constructing a text overlay.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverlayError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Binding state of an overlay with respect to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    /// Constructed, never added to a display.
    #[default]
    Unbound,
    /// Added: the renderer has prepared its element.
    Bound,
    /// Removed from the display. Re-adding starts from fresh derived state.
    Removed,
}

/// Geometry derived from one projection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Anchor in layer space.
    pub point: DVec2,
    /// Measured text width the bounds were derived from.
    pub text_width: f64,
    /// Square box of half-extent `text_width / 2` around `point`.
    pub bounds: Bounds,
}

/// A text label anchored to a geographic coordinate.
///
/// Cloning yields a new, unbound label with the same coordinate, text and
/// style under a fresh id; backend registries never see two labels share one.
#[derive(Debug)]
pub struct TextOverlay {
    id: OverlayId,
    lat_lng: LatLng,
    text: String,
    style: TextStyle,
    projection: Option<Projection>,
    state: OverlayState,
}

impl TextOverlay {
    pub fn new(lat_lng: impl Into<LatLng>, text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            id: OverlayId::new(),
            lat_lng: lat_lng.into(),
            text: text.into(),
            style,
            projection: None,
            state: OverlayState::Unbound,
        }
    }

    /// Build an overlay from a loosely-typed text value (scene files, JSON).
    ///
    /// Anything other than a JSON string is rejected and nothing is built.
    pub fn from_value(
        lat_lng: impl Into<LatLng>,
        text: &serde_json::Value,
        style: TextStyle,
    ) -> Result<Self, OverlayError> {
        match text {
            serde_json::Value::String(s) => Ok(Self::new(lat_lng, s.clone(), style)),
            other => Err(OverlayError::InvalidArgument(format!(
                "text must be a string, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// The coordinate the overlay was constructed with.
    pub fn lat_lng(&self) -> LatLng {
        self.lat_lng
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Replace the style. Callers holding a renderer should follow up with
    /// its style update so retained elements pick up the change.
    pub fn set_style(&mut self, style: TextStyle) -> TextStyle {
        std::mem::replace(&mut self.style, style)
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state == OverlayState::Bound
    }

    /// Result of the latest projection pass, if any has run.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn point(&self) -> Option<DVec2> {
        self.projection.map(|p| p.point)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.projection.map(|p| p.bounds)
    }

    /// Record a projection pass: anchor point plus measured text width.
    ///
    /// The box reuses the width as its height; labels are treated as squares.
    pub fn apply_projection(&mut self, point: DVec2, text_width: f64) -> Projection {
        let half = text_width / 2.0;
        let projection = Projection {
            point,
            text_width,
            bounds: Bounds::from_center(point, DVec2::splat(half)),
        };
        tracing::trace!(
            id = %self.id,
            x = point.x,
            y = point.y,
            width = text_width,
            "overlay projected"
        );
        self.projection = Some(projection);
        projection
    }

    /// True when the overlay lies outside `visible`, or has not been
    /// projected yet.
    pub fn is_empty(&self, visible: &Bounds) -> bool {
        match &self.projection {
            Some(p) => !visible.intersects(&p.bounds),
            None => true,
        }
    }

    /// Transition to `Bound`. Returns false if already bound.
    pub fn bind(&mut self) -> bool {
        if self.state == OverlayState::Bound {
            return false;
        }
        self.projection = None;
        self.state = OverlayState::Bound;
        true
    }

    /// Transition to `Removed`. Returns false if not bound.
    pub fn unbind(&mut self) -> bool {
        if self.state != OverlayState::Bound {
            return false;
        }
        self.projection = None;
        self.state = OverlayState::Removed;
        true
    }
}

impl Clone for TextOverlay {
    fn clone(&self) -> Self {
        Self::new(self.lat_lng, self.text.clone(), self.style.clone())
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

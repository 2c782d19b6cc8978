use glam::DVec2;
use maptext_common::{Bounds, Font, LatLng};
use maptext_overlay::TextOverlay;
use serde::{Deserialize, Serialize};

/// What the host map exposes to renderers and the projection pipeline.
pub trait MapView {
    /// Geographic coordinate to layer-space point under the current view.
    fn project(&self, lat_lng: LatLng) -> DVec2;

    /// Layer-space rectangle currently visible in the map container.
    fn pixel_bounds(&self) -> Bounds;
}

/// Drawing model of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Redraws every frame onto a shared pixel surface; must cull before drawing.
    Immediate,
    /// Keeps one persistent node per overlay and mutates it in place.
    Retained,
}

/// Options shared by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Extra area drawn around the visible region, as a fraction of its size.
    pub padding: f64,
    pub font: Font,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            padding: 0.1,
            font: Font::default(),
        }
    }
}

/// Visible region of a renderer: the view's pixel bounds grown by `padding`
/// on each side and snapped to whole pixels.
pub fn padded_bounds(view: &dyn MapView, padding: f64) -> Bounds {
    view.pixel_bounds().pad(padding).round()
}

/// Capabilities every text rendering backend provides.
///
/// Overlays are passed by reference on every call; a backend keeps per-overlay
/// state keyed by `TextOverlay::id` and never holds the overlay itself.
pub trait TextRenderer {
    fn kind(&self) -> BackendKind;

    /// Rendered width of the overlay text under the current font, in pixels.
    /// Pure: no drawing state changes.
    fn measure_text_width(&self, overlay: &TextOverlay) -> f64;

    /// Allocate the overlay's persistent element (if any) and register it.
    fn prepare_element(&mut self, overlay: &TextOverlay);

    /// Draw or update the overlay according to its style and last projection.
    fn render(&mut self, overlay: &TextOverlay);

    /// Detach the overlay's element and drop it from every registry.
    fn remove_element(&mut self, overlay: &TextOverlay);

    /// Re-apply style-derived element state after a style change.
    fn update_style(&mut self, _overlay: &TextOverlay) {}

    /// Region outside of which overlays count as empty.
    fn visible_bounds(&self) -> Bounds;

    /// Recompute the visible region from the host view.
    fn update_bounds(&mut self, view: &dyn MapView);

    /// Start a drawing pass. Immediate-mode backends clear their surface.
    fn begin_pass(&mut self) {}

    /// Finish a drawing pass.
    fn end_pass(&mut self) {}
}

impl<R: TextRenderer + ?Sized> TextRenderer for Box<R> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn measure_text_width(&self, overlay: &TextOverlay) -> f64 {
        (**self).measure_text_width(overlay)
    }

    fn prepare_element(&mut self, overlay: &TextOverlay) {
        (**self).prepare_element(overlay)
    }

    fn render(&mut self, overlay: &TextOverlay) {
        (**self).render(overlay)
    }

    fn remove_element(&mut self, overlay: &TextOverlay) {
        (**self).remove_element(overlay)
    }

    fn update_style(&mut self, overlay: &TextOverlay) {
        (**self).update_style(overlay)
    }

    fn visible_bounds(&self) -> Bounds {
        (**self).visible_bounds()
    }

    fn update_bounds(&mut self, view: &dyn MapView) {
        (**self).update_bounds(view)
    }

    fn begin_pass(&mut self) {
        (**self).begin_pass()
    }

    fn end_pass(&mut self) {
        (**self).end_pass()
    }
}

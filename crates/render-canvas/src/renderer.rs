use std::collections::BTreeSet;

use glam::{DAffine2, DVec2};
use maptext_common::{Bounds, OverlayId};
use maptext_overlay::TextOverlay;
use maptext_render::{BackendKind, MapView, RendererConfig, TextRenderer, padded_bounds};

use crate::surface::{DrawingSurface, RecordingSurface};

/// Translation plus rotation applied to a surface. The transform in place
/// before the guard was taken is restored exactly when it drops.
struct TransformGuard<'a, S: DrawingSurface> {
    surface: &'a mut S,
    saved: DAffine2,
}

impl<'a, S: DrawingSurface> TransformGuard<'a, S> {
    fn new(surface: &'a mut S, offset: DVec2, angle: f64) -> Self {
        let saved = surface.transform();
        surface.translate(offset.x, offset.y);
        surface.rotate(angle);
        Self { surface, saved }
    }

    fn surface(&mut self) -> &mut S {
        &mut *self.surface
    }
}

impl<S: DrawingSurface> Drop for TransformGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.set_transform(self.saved);
    }
}

/// Immediate-mode text renderer drawing onto a [`DrawingSurface`].
///
/// Overlays are only drawn between [`begin_pass`](TextRenderer::begin_pass)
/// and [`end_pass`](TextRenderer::end_pass), and only when their box meets
/// the padded visible region.
pub struct CanvasRenderer<S: DrawingSurface = RecordingSurface> {
    surface: S,
    config: RendererConfig,
    bounds: Bounds,
    drawing: bool,
    layers: BTreeSet<OverlayId>,
    drawn: BTreeSet<OverlayId>,
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self::new(RecordingSurface::new(), RendererConfig::default())
    }
}

impl<S: DrawingSurface> CanvasRenderer<S> {
    pub fn new(mut surface: S, config: RendererConfig) -> Self {
        surface.set_font(&config.font);
        Self {
            surface,
            config,
            bounds: Bounds::new(DVec2::ZERO, DVec2::ZERO),
            drawing: false,
            layers: BTreeSet::new(),
            drawn: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Overlays with a prepared (registered) element.
    pub fn layers(&self) -> &BTreeSet<OverlayId> {
        &self.layers
    }

    /// Overlays actually drawn in the current or last pass.
    pub fn drawn(&self) -> &BTreeSet<OverlayId> {
        &self.drawn
    }
}

impl<S: DrawingSurface> TextRenderer for CanvasRenderer<S> {
    fn kind(&self) -> BackendKind {
        BackendKind::Immediate
    }

    fn measure_text_width(&self, overlay: &TextOverlay) -> f64 {
        self.surface.measure_text(overlay.text())
    }

    fn prepare_element(&mut self, overlay: &TextOverlay) {
        self.layers.insert(overlay.id());
    }

    fn render(&mut self, overlay: &TextOverlay) {
        if !self.drawing || overlay.is_empty(&self.bounds) {
            return;
        }
        let style = overlay.style();
        if !style.fill {
            return;
        }
        let Some(point) = overlay.point() else {
            return;
        };

        self.drawn.insert(overlay.id());

        let mut guard = TransformGuard::new(&mut self.surface, point, style.rotation);
        let surface = guard.surface();
        surface.set_fill_style(style.effective_fill_color());
        surface.set_global_alpha(style.fill_opacity.clamp(0.0, 1.0));
        surface.set_text_align(style.text_align);
        surface.fill_text(overlay.text(), 0.0, 0.0);
    }

    fn remove_element(&mut self, overlay: &TextOverlay) {
        let id = overlay.id();
        self.layers.remove(&id);
        self.drawn.remove(&id);
    }

    fn visible_bounds(&self) -> Bounds {
        self.bounds
    }

    fn update_bounds(&mut self, view: &dyn MapView) {
        let bounds = padded_bounds(view, self.config.padding);
        let size = bounds.size();
        self.surface.resize(size.x as u32, size.y as u32);
        self.surface.set_font(&self.config.font);
        // draw in layer-space coordinates directly
        self.surface.translate(-bounds.min.x, -bounds.min.y);
        self.bounds = bounds;
        tracing::debug!(%bounds, "canvas bounds updated");
    }

    fn begin_pass(&mut self) {
        self.surface.clear();
        self.drawn.clear();
        self.drawing = true;
    }

    fn end_pass(&mut self) {
        self.drawing = false;
        tracing::trace!(drawn = self.drawn.len(), "canvas pass complete");
    }
}

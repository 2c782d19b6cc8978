//! Projection and culling: turns host lifecycle events into renderer calls.

use maptext_overlay::{TextOverlay, TextStyle};

use crate::renderer::{BackendKind, MapView, TextRenderer};

/// Outcome of culling an overlay against the renderer's visible region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Bounding box misses the visible region. Immediate-mode backends draw
    /// nothing; retained-mode backends still update the element.
    Hidden,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

/// Cull the overlay's latest projection against the renderer's region.
pub fn visibility<R: TextRenderer + ?Sized>(overlay: &TextOverlay, renderer: &R) -> Visibility {
    if overlay.is_empty(&renderer.visible_bounds()) {
        Visibility::Hidden
    } else {
        Visibility::Visible
    }
}

/// Project the coordinate through the view and rederive the bounding box
/// from the renderer's measurement of the text.
pub fn project<R: TextRenderer + ?Sized>(
    overlay: &mut TextOverlay,
    renderer: &R,
    view: &dyn MapView,
) -> Visibility {
    let point = view.project(overlay.lat_lng());
    let width = renderer.measure_text_width(overlay);
    overlay.apply_projection(point, width);
    visibility(overlay, renderer)
}

/// Overlay was added to the display: bind, prepare its element, project and
/// draw. Returns `None` if the overlay was already bound.
pub fn add<R: TextRenderer + ?Sized>(
    overlay: &mut TextOverlay,
    renderer: &mut R,
    view: &dyn MapView,
) -> Option<Visibility> {
    if !overlay.bind() {
        tracing::warn!(id = %overlay.id(), "overlay already bound, ignoring add");
        return None;
    }
    renderer.prepare_element(overlay);
    let vis = project(overlay, &*renderer, view);
    renderer.render(overlay);
    tracing::debug!(id = %overlay.id(), ?vis, "overlay added");
    Some(vis)
}

/// View changed: reproject and redraw. Unbound overlays are skipped.
pub fn view_changed<R: TextRenderer + ?Sized>(
    overlay: &mut TextOverlay,
    renderer: &mut R,
    view: &dyn MapView,
) -> Option<Visibility> {
    if !overlay.is_bound() {
        return None;
    }
    let vis = project(overlay, &*renderer, view);
    renderer.render(overlay);
    Some(vis)
}

/// Draw again from the last projection without consulting the view.
pub fn redraw<R: TextRenderer + ?Sized>(
    overlay: &TextOverlay,
    renderer: &mut R,
) -> Option<Visibility> {
    if !overlay.is_bound() || overlay.projection().is_none() {
        return None;
    }
    renderer.render(overlay);
    Some(visibility(overlay, &*renderer))
}

/// Replace the overlay style and push it to a bound renderer.
pub fn restyle<R: TextRenderer + ?Sized>(
    overlay: &mut TextOverlay,
    renderer: &mut R,
    style: TextStyle,
) {
    overlay.set_style(style);
    if !overlay.is_bound() {
        return;
    }
    renderer.update_style(overlay);
    if renderer.kind() == BackendKind::Retained {
        renderer.render(overlay);
    }
}

/// Overlay was removed: detach its element. Returns false if it was not bound.
pub fn remove<R: TextRenderer + ?Sized>(overlay: &mut TextOverlay, renderer: &mut R) -> bool {
    if !overlay.is_bound() {
        return false;
    }
    renderer.remove_element(overlay);
    overlay.unbind();
    tracing::debug!(id = %overlay.id(), "overlay removed");
    true
}

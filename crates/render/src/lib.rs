//! Rendering Adapter: backend-agnostic contract for drawing text overlays.
//!
//! # Invariants
//! - Renderers never change an overlay's coordinate, text or style.
//! - Derived overlay geometry comes from the host view and the renderer's own
//!   text measurement, recomputed on every view change.
//! - Immediate-mode backends cull before drawing; retained-mode backends
//!   always update their elements.

mod pipeline;
mod renderer;

pub use pipeline::{Visibility, add, project, redraw, remove, restyle, view_changed, visibility};
pub use renderer::{BackendKind, MapView, RendererConfig, TextRenderer, padded_bounds};

pub fn crate_info() -> &'static str {
    "maptext-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}

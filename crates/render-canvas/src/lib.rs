//! Canvas render backend: immediate-mode text drawn onto a shared 2D surface.
//!
//! Every pass clears the surface and redraws all visible overlays.
//!
//! # Invariants
//! - Nothing is drawn outside an active pass, for culled overlays, or for
//!   overlays with fill disabled.
//! - Each draw leaves the surface transform exactly as it found it.

mod renderer;
mod surface;

pub use renderer::CanvasRenderer;
pub use surface::{DrawCommand, DrawingSurface, RecordingSurface};

pub fn crate_info() -> &'static str {
    "maptext-render-canvas v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("canvas"));
    }
}

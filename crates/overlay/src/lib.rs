//! Text overlay: a label anchored to a geographic coordinate.
//!
//! # Invariants
//! - Coordinate and text never change after construction.
//! - Derived geometry (screen point, bounding box) exists only after a
//!   projection pass and always reflects the latest one.
//! - The overlay never owns its renderer.

mod overlay;
mod style;

pub use overlay::{OverlayError, OverlayState, Projection, TextOverlay};
pub use style::{TextAlign, TextStyle};

pub fn crate_info() -> &'static str {
    "maptext-overlay v0.1.0"
}

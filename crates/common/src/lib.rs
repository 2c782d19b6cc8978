//! Shared primitives: geographic coordinates, layer-space boxes, overlay
//! identity, fonts and text metrics.
//!
//! # Invariants
//! - Layer-space boxes are always normalized (`min <= max` on both axes).
//! - Text metrics are pure functions of text and font.

mod bounds;
mod metrics;
mod types;

pub use bounds::{Bounds, round_half_up};
pub use glam::DVec2;
pub use metrics::{AdvanceMetrics, Font, TextMetrics};
pub use types::{LatLng, LatLngError, OverlayId};

pub fn crate_info() -> &'static str {
    "maptext-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}

//! Reference host: a Web Mercator map view that owns text overlays and a
//! renderer, and drives the overlay lifecycle.
//!
//! # Invariants
//! - Layer-space points stay stable while panning; only zoom or an explicit
//!   view reset moves the pixel origin.
//! - Every view change reprojects all bound overlays in one pass.
//! - Immediate-mode renderers are redrawn whenever the overlay set changes.

pub mod crs;
mod map;
mod scene;
mod view;

pub use map::{Map, PassStats};
pub use scene::{LabelSpec, Scene, SceneError};
pub use view::{ViewConfig, ViewState};

pub fn crate_info() -> &'static str {
    "maptext-map v0.1.0"
}

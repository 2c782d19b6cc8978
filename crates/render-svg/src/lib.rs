//! SVG render backend: retained-mode text nodes in an in-memory SVG tree.
//!
//! # Invariants
//! - Each bound overlay owns exactly one `<text>` node, keyed by its id.
//! - Text metrics come from the node itself, never from a separate estimate.
//! - Nodes are always updated on render; clipping is left to the viewer.

mod renderer;
mod tree;

pub use renderer::{INTERACTIVE_CLASS, SvgRenderer};
pub use tree::{NodeId, SvgTree};

pub fn crate_info() -> &'static str {
    "maptext-render-svg v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("svg"));
    }
}

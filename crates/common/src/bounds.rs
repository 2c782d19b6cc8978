use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in layer space (pixels, y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// Box spanning two arbitrary corners.
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box of the given half-extent on each axis, centered at `center`.
    pub fn from_center(center: DVec2, half_extent: DVec2) -> Self {
        Self::new(center - half_extent, center + half_extent)
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Closed containment: points on the edge are inside.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Closed intersection: boxes sharing only an edge still intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        let x = other.max.x >= self.min.x && other.min.x <= self.max.x;
        let y = other.max.y >= self.min.y && other.min.y <= self.max.y;
        x && y
    }

    /// Grow each side by `ratio` times the box size on that axis.
    pub fn pad(&self, ratio: f64) -> Self {
        let buffer = self.size().abs() * ratio;
        Self::new(self.min - buffer, self.max + buffer)
    }

    /// Snap both corners to whole pixels. Halves round toward positive
    /// infinity, so -80.5 becomes -80.
    pub fn round(&self) -> Self {
        Self::new(round_half_up(self.min), round_half_up(self.max))
    }

    pub fn translate(&self, offset: DVec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Round each component to the nearest integer, halves toward positive
/// infinity (`Math.round` semantics).
pub fn round_half_up(v: DVec2) -> DVec2 {
    (v + 0.5).floor()
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[({:.1}, {:.1}), ({:.1}, {:.1})]",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

use glam::DVec2;
use maptext_common::{Bounds, LatLng, round_half_up};
use maptext_render::MapView;
use serde::{Deserialize, Serialize};

use crate::crs;

/// Initial view of a map: where it looks and how large its container is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub center: LatLng,
    pub zoom: f64,
    /// Container size in pixels, `[width, height]`.
    pub size: [u32; 2],
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(0.0, 0.0),
            zoom: 1.0,
            size: [800, 600],
        }
    }
}

/// Live view state.
///
/// Layer space is absolute pixel space shifted by `pixel_origin`, fixed at
/// the last view reset. Panning moves the map pane instead, so layer points
/// stay valid until the next reset.
#[derive(Debug, Clone)]
pub struct ViewState {
    center: LatLng,
    zoom: f64,
    size: DVec2,
    pixel_origin: DVec2,
    pane_offset: DVec2,
}

impl ViewState {
    pub fn new(config: &ViewConfig) -> Self {
        let mut view = Self {
            center: config.center,
            zoom: config.zoom,
            size: DVec2::new(config.size[0] as f64, config.size[1] as f64),
            pixel_origin: DVec2::ZERO,
            pane_offset: DVec2::ZERO,
        };
        view.reset(config.center, config.zoom);
        view
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn size(&self) -> DVec2 {
        self.size
    }

    pub fn pixel_origin(&self) -> DVec2 {
        self.pixel_origin
    }

    /// Jump to a new center and zoom, re-anchoring layer space.
    pub fn reset(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
        self.pane_offset = DVec2::ZERO;
        self.pixel_origin = round_half_up(crs::project(center, zoom) - self.size / 2.0);
    }

    /// Shift the view by `offset` pixels without re-anchoring layer space.
    pub fn pan_by(&mut self, offset: DVec2) {
        self.pane_offset -= offset;
        let center_px = crs::project(self.center, self.zoom) + offset;
        self.center = crs::unproject(center_px, self.zoom);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = DVec2::new(width as f64, height as f64);
        self.reset(self.center, self.zoom);
    }

    pub fn container_point_to_layer_point(&self, p: DVec2) -> DVec2 {
        p - self.pane_offset
    }

    pub fn layer_point_to_container_point(&self, p: DVec2) -> DVec2 {
        p + self.pane_offset
    }

    pub fn layer_point_to_lat_lng(&self, p: DVec2) -> LatLng {
        crs::unproject(p + self.pixel_origin, self.zoom)
    }
}

impl MapView for ViewState {
    fn project(&self, lat_lng: LatLng) -> DVec2 {
        round_half_up(crs::project(lat_lng, self.zoom)) - self.pixel_origin
    }

    fn pixel_bounds(&self) -> Bounds {
        Bounds::new(
            self.container_point_to_layer_point(DVec2::ZERO),
            self.container_point_to_layer_point(self.size),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ViewConfig {
        ViewConfig {
            center: LatLng::new(0.0, 0.0),
            zoom: 2.0,
            size: [400, 300],
        }
    }

    #[test]
    fn center_projects_to_container_middle() {
        let view = ViewState::new(&config());
        assert_eq!(view.pixel_origin(), DVec2::new(312.0, 362.0));
        assert_eq!(view.project(LatLng::new(0.0, 0.0)), DVec2::new(200.0, 150.0));
    }

    #[test]
    fn pixel_bounds_cover_container() {
        let view = ViewState::new(&config());
        let b = view.pixel_bounds();
        assert_eq!(b.min, DVec2::ZERO);
        assert_eq!(b.max, DVec2::new(400.0, 300.0));
    }

    #[test]
    fn pan_keeps_layer_points_and_moves_bounds() {
        let mut view = ViewState::new(&config());
        let before = view.project(LatLng::new(10.0, 10.0));
        view.pan_by(DVec2::new(100.0, -50.0));
        assert_eq!(view.project(LatLng::new(10.0, 10.0)), before);
        let b = view.pixel_bounds();
        assert_eq!(b.min, DVec2::new(100.0, -50.0));
        assert_eq!(b.max, DVec2::new(500.0, 250.0));
        assert!(view.center().lng > 0.0);
    }

    #[test]
    fn reset_reanchors_layer_space() {
        let mut view = ViewState::new(&config());
        view.pan_by(DVec2::new(100.0, 0.0));
        view.reset(LatLng::new(0.0, 0.0), 3.0);
        assert_eq!(view.pixel_bounds().min, DVec2::ZERO);
        assert_eq!(view.project(LatLng::new(0.0, 0.0)), DVec2::new(200.0, 150.0));
    }

    #[test]
    fn layer_point_round_trip() {
        let view = ViewState::new(&config());
        let ll = view.layer_point_to_lat_lng(DVec2::new(200.0, 150.0));
        assert!(ll.lat.abs() < 1e-9 && ll.lng.abs() < 1e-9);
    }

    #[test]
    fn config_partial_yaml() {
        let c: ViewConfig = serde_yaml::from_str("zoom: 5\nsize: [100, 50]\n").unwrap();
        assert_eq!(c.zoom, 5.0);
        assert_eq!(c.size, [100, 50]);
        assert_eq!(c.center, LatLng::new(0.0, 0.0));
    }
}

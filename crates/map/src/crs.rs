//! Spherical Web Mercator (EPSG:3857) with 256px tiles.

use glam::DVec2;
use maptext_common::LatLng;
use std::f64::consts::PI;

pub const EARTH_RADIUS: f64 = 6_378_137.0;
/// Latitude where the projected world becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;
pub const TILE_SIZE: f64 = 256.0;

/// Pixel size of the whole world at `zoom`.
pub fn scale(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Coordinate to projected meters. Latitude is clamped to the square world.
pub fn project_meters(lat_lng: LatLng) -> DVec2 {
    let d = PI / 180.0;
    let lat = lat_lng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin = (lat * d).sin();
    DVec2::new(
        EARTH_RADIUS * lat_lng.lng * d,
        EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
    )
}

pub fn unproject_meters(p: DVec2) -> LatLng {
    let d = 180.0 / PI;
    LatLng::new(
        (2.0 * (p.y / EARTH_RADIUS).exp().atan() - PI / 2.0) * d,
        p.x * d / EARTH_RADIUS,
    )
}

/// Coordinate to absolute pixel space at `zoom` (y grows southward).
pub fn project(lat_lng: LatLng, zoom: f64) -> DVec2 {
    let k = 0.5 / (PI * EARTH_RADIUS);
    let m = project_meters(lat_lng);
    DVec2::new(k * m.x + 0.5, -k * m.y + 0.5) * scale(zoom)
}

pub fn unproject(p: DVec2, zoom: f64) -> LatLng {
    let k = 0.5 / (PI * EARTH_RADIUS);
    let n = p / scale(zoom);
    unproject_meters(DVec2::new((n.x - 0.5) / k, (n.y - 0.5) / -k))
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a text overlay. Backends key their registries by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub Uuid);

impl OverlayId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.8}", &self.0.to_string()[..8])
    }
}

/// Geographic coordinate in degrees, with optional altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatLngRepr")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            alt: None,
        }
    }

    pub fn with_alt(lat: f64, lng: f64, alt: f64) -> Self {
        Self {
            lat,
            lng,
            alt: Some(alt),
        }
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

impl From<[f64; 3]> for LatLng {
    fn from([lat, lng, alt]: [f64; 3]) -> Self {
        Self::with_alt(lat, lng, alt)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LatLng({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Errors from decoding a coordinate out of a loosely-typed source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LatLngError {
    #[error("coordinate array must have 2 or 3 elements, got {0}")]
    BadArity(usize),
    #[error("coordinate must be finite")]
    NotFinite,
}

/// Accepted wire shapes: `{lat, lng, alt?}` or `[lat, lng(, alt)]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LatLngRepr {
    Array(Vec<f64>),
    Object {
        lat: f64,
        lng: f64,
        #[serde(default)]
        alt: Option<f64>,
    },
}

impl TryFrom<LatLngRepr> for LatLng {
    type Error = LatLngError;

    fn try_from(repr: LatLngRepr) -> Result<Self, Self::Error> {
        let latlng = match repr {
            LatLngRepr::Array(v) => match v.as_slice() {
                [lat, lng] => Self::new(*lat, *lng),
                [lat, lng, alt] => Self::with_alt(*lat, *lng, *alt),
                other => return Err(LatLngError::BadArity(other.len())),
            },
            LatLngRepr::Object { lat, lng, alt } => Self { lat, lng, alt },
        };
        if !latlng.lat.is_finite() || !latlng.lng.is_finite() {
            return Err(LatLngError::NotFinite);
        }
        Ok(latlng)
    }
}

//! Validated records decoded from the event and boundary feeds.

use serde::{Deserialize, Serialize};

/// A geographic position in degrees, longitude first (GeoJSON order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Position in the `[lat, lon]` order map widgets expect.
    pub fn to_lat_lon(self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// One earthquake record.
///
/// `depth_km` may be negative (above the sea-level reference). Magnitude is
/// usually non-negative but is not constrained here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEvent {
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: f64,
    pub magnitude: f64,
    pub place: String,
    /// Event time in epoch milliseconds.
    pub timestamp_ms: i64,
}

impl GeoEvent {
    pub fn position(&self) -> LonLat {
        LonLat::new(self.longitude, self.latitude)
    }
}

/// One tectonic plate boundary polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySegment {
    pub vertices: Vec<LonLat>,
}

impl BoundarySegment {
    pub fn new(vertices: Vec<LonLat>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

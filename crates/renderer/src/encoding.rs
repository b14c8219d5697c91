//! Magnitude and depth encodings for event markers.
//!
//! Both functions are pure so the legend can sample [`color_from_depth`]
//! directly instead of keeping its own copy of the palette.

/// Meters of radius per magnitude unit above [`MAGNITUDE_OFFSET`].
pub const RADIUS_SCALE: f64 = 100_000.0;

/// Magnitude that maps to a zero radius.
pub const MAGNITUDE_OFFSET: f64 = 4.0;

/// Marker radius in meters for an event magnitude.
///
/// Linear and unclamped: magnitudes at or below 4 give a zero or negative
/// radius, which the map treats as "draw nothing".
pub fn radius_from_magnitude(magnitude: f64) -> f64 {
    RADIUS_SCALE * (magnitude - MAGNITUDE_OFFSET)
}

/// A half-open depth interval `[lower, upper)` with its color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBucket {
    pub lower: f64,
    pub upper: f64,
    pub color: &'static str,
}

impl ColorBucket {
    pub fn contains(&self, depth_km: f64) -> bool {
        self.lower <= depth_km && depth_km < self.upper
    }
}

/// Depth buckets, shallow to deep. Together they cover the whole real line.
pub const DEPTH_BUCKETS: [ColorBucket; 6] = [
    ColorBucket {
        lower: f64::NEG_INFINITY,
        upper: 10.0,
        color: "#faf0a9",
    },
    ColorBucket {
        lower: 10.0,
        upper: 30.0,
        color: "#f7cf64",
    },
    ColorBucket {
        lower: 30.0,
        upper: 50.0,
        color: "#fbaa32",
    },
    ColorBucket {
        lower: 50.0,
        upper: 70.0,
        color: "#ff8220",
    },
    ColorBucket {
        lower: 70.0,
        upper: 90.0,
        color: "#ff5142",
    },
    ColorBucket {
        lower: 90.0,
        upper: f64::INFINITY,
        color: "#ff0066",
    },
];

/// Index into [`DEPTH_BUCKETS`] for a depth.
///
/// Checks upper bounds top-down; anything that passes none of them (including
/// NaN) falls into the terminal bucket.
pub fn depth_bucket_index(depth_km: f64) -> usize {
    DEPTH_BUCKETS
        .iter()
        .position(|b| depth_km < b.upper)
        .unwrap_or(DEPTH_BUCKETS.len() - 1)
}

/// Marker color for an event depth in kilometers.
pub fn color_from_depth(depth_km: f64) -> &'static str {
    DEPTH_BUCKETS[depth_bucket_index(depth_km)].color
}

//! GeoJSON wire types for the two feeds.
//!
//! Features are kept as raw [`serde_json::Value`]s at the collection level so
//! that one malformed feature cannot fail deserialization of the whole
//! document. Each feature is then decoded on its own into [`Feature`].

use serde::{Deserialize, Serialize};

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    /// Undecoded features.
    pub features: Vec<serde_json::Value>,

    /// Feed-level metadata block (USGS summary feeds carry one).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FeedMetadata>,
}

impl FeatureCollection {
    pub fn new(features: Vec<serde_json::Value>) -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features,
            metadata: None,
        }
    }

    pub fn is_feature_collection(&self) -> bool {
        self.type_ == "FeatureCollection"
    }
}

/// Metadata block of a USGS summary feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FeedMetadata {
    /// Feed generation time in epoch milliseconds.
    #[serde(default)]
    pub generated: Option<i64>,

    #[serde(default)]
    pub title: Option<String>,

    /// Number of features the feed claims to contain.
    #[serde(default)]
    pub count: Option<u64>,
}

/// A single GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// Geometry may be `null` in GeoJSON.
    #[serde(default)]
    pub geometry: Option<Geometry>,

    /// Properties may be `null` or absent; boundary features carry none we read.
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
}

/// GeoJSON geometry types the feeds use.
///
/// Coordinates are kept as plain vectors so that short positions surface as
/// validation errors with a position index instead of a serde message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// `[longitude, latitude, depth]` for earthquake events.
    Point { coordinates: Vec<f64> },

    LineString { coordinates: Vec<Vec<f64>> },

    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },

    /// Any other geometry type.
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    /// GeoJSON type name, for error reporting.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Unsupported => "unsupported",
        }
    }
}

/// The event properties the map reads. Other USGS properties are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EventProperties {
    #[serde(default)]
    pub mag: Option<f64>,

    #[serde(default)]
    pub place: Option<String>,

    /// Event time in epoch milliseconds.
    #[serde(default)]
    pub time: Option<i64>,
}

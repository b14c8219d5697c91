//! GeoJSON feed decoding.
//!
//! Both remote documents (the earthquake summary feed and the plate-boundary
//! collection) are GeoJSON `FeatureCollection`s. This crate holds the wire
//! types and turns each feature into a validated [`GeoEvent`] or
//! [`BoundarySegment`]. A document that is not a feature collection fails as a
//! whole; a single bad feature is skipped and reported, never fatal.
//!
//! # Example
//!
//! ```rust
//! use feed_protocol::decode_events;
//!
//! let doc = br#"{"type":"FeatureCollection","features":[
//!     {"type":"Feature",
//!      "geometry":{"type":"Point","coordinates":[10.0,20.0,5.0]},
//!      "properties":{"mag":4.5,"place":"Somewhere","time":1700000000000}}
//! ]}"#;
//!
//! let decoded = decode_events(doc).unwrap();
//! assert_eq!(decoded.items.len(), 1);
//! assert!(decoded.skipped.is_empty());
//! ```
//!
//! [`GeoEvent`]: quake_common::GeoEvent
//! [`BoundarySegment`]: quake_common::BoundarySegment

pub mod errors;
pub mod geojson;
pub mod parse;

pub use errors::{FeatureError, FeedError};
pub use geojson::{EventProperties, Feature, FeatureCollection, FeedMetadata, Geometry};
pub use parse::{
    decode_boundaries, decode_events, event_from_feature, segments_from_feature, Decoded,
    SkippedFeature,
};

/// Media types served by the feeds.
pub mod media_types {
    /// GeoJSON media type
    pub const GEO_JSON: &str = "application/geo+json";
    /// JSON media type
    pub const JSON: &str = "application/json";
}

//! Feed decoding error types.

use quake_common::QuakeError;
use thiserror::Error;

/// Errors that reject a whole document.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The body is not JSON at all.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The body is JSON but not a GeoJSON FeatureCollection.
    #[error("Not a FeatureCollection: {0}")]
    NotFeatureCollection(String),
}

impl From<FeedError> for QuakeError {
    fn from(err: FeedError) -> Self {
        QuakeError::InvalidDocument(err.to_string())
    }
}

/// Reasons a single feature is skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// The feature object does not have the GeoJSON shape.
    #[error("malformed feature: {0}")]
    Shape(String),

    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("expected {expected} geometry, found {found}")]
    UnexpectedGeometry {
        expected: &'static str,
        found: &'static str,
    },

    /// A coordinate array is shorter than required.
    #[error("missing coordinate at position {0}")]
    MissingCoordinate(usize),

    #[error("non-finite value for {0}")]
    NonFinite(&'static str),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("missing property: {0}")]
    MissingProperty(&'static str),

    /// A line with fewer than two vertices.
    #[error("line has {0} vertices, need at least 2")]
    DegenerateLine(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_error_into_quake_error() {
        let err: QuakeError = FeedError::NotFeatureCollection("type is Feature".into()).into();
        assert!(matches!(err, QuakeError::InvalidDocument(_)));
        assert_eq!(err.http_status_code(), 502);
    }

    #[test]
    fn test_feature_error_messages() {
        assert_eq!(
            FeatureError::MissingProperty("mag").to_string(),
            "missing property: mag"
        );
        assert_eq!(
            FeatureError::UnexpectedGeometry {
                expected: "Point",
                found: "LineString"
            }
            .to_string(),
            "expected Point geometry, found LineString"
        );
    }
}

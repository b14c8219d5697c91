//! Validated decoding of feed documents into typed records.

use quake_common::{BoundarySegment, GeoEvent, LonLat};
use serde_json::Value;
use tracing::debug;

use crate::errors::{FeatureError, FeedError};
use crate::geojson::{EventProperties, Feature, FeatureCollection, FeedMetadata, Geometry};

/// Result of decoding one document: the records that validated plus the features that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    /// Features in the document, valid or not.
    pub features: usize,
    pub skipped: Vec<SkippedFeature>,
    pub metadata: Option<FeedMetadata>,
}

impl<T> Decoded<T> {
    /// Total features seen in the document.
    pub fn total(&self) -> usize {
        self.features
    }

    /// Features that validated. Differs from `items.len()` when one feature yields several items.
    pub fn accepted(&self) -> usize {
        self.features - self.skipped.len()
    }
}

/// A feature that failed validation, by its position in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: FeatureError,
}

/// Decode the earthquake feed.
pub fn decode_events(body: &[u8]) -> Result<Decoded<GeoEvent>, FeedError> {
    let collection = read_collection(body)?;
    let metadata = collection.metadata;
    let features = collection.features.len();
    let mut items = Vec::with_capacity(collection.features.len());
    let mut skipped = Vec::new();

    for (index, value) in collection.features.into_iter().enumerate() {
        match event_from_feature(value) {
            Ok(event) => items.push(event),
            Err(reason) => {
                debug!(index = index, reason = %reason, "Skipping malformed event feature");
                skipped.push(SkippedFeature { index, reason });
            }
        }
    }

    Ok(Decoded {
        items,
        features,
        skipped,
        metadata,
    })
}

/// Decode the plate-boundary feed. A MultiLineString feature yields one segment per line.
pub fn decode_boundaries(body: &[u8]) -> Result<Decoded<BoundarySegment>, FeedError> {
    let collection = read_collection(body)?;
    let metadata = collection.metadata;
    let features = collection.features.len();
    let mut items = Vec::with_capacity(collection.features.len());
    let mut skipped = Vec::new();

    for (index, value) in collection.features.into_iter().enumerate() {
        match segments_from_feature(value) {
            Ok(segments) => items.extend(segments),
            Err(reason) => {
                debug!(index = index, reason = %reason, "Skipping malformed boundary feature");
                skipped.push(SkippedFeature { index, reason });
            }
        }
    }

    Ok(Decoded {
        items,
        features,
        skipped,
        metadata,
    })
}

fn read_collection(body: &[u8]) -> Result<FeatureCollection, FeedError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| FeedError::InvalidJson(e.to_string()))?;

    let collection: FeatureCollection = serde_json::from_value(value)
        .map_err(|e| FeedError::NotFeatureCollection(e.to_string()))?;

    if !collection.is_feature_collection() {
        return Err(FeedError::NotFeatureCollection(format!(
            "type is {:?}",
            collection.type_
        )));
    }

    Ok(collection)
}

fn read_feature(value: Value) -> Result<Feature, FeatureError> {
    let feature: Feature =
        serde_json::from_value(value).map_err(|e| FeatureError::Shape(e.to_string()))?;
    if feature.type_ != "Feature" {
        return Err(FeatureError::Shape(format!(
            "type is {:?}, expected \"Feature\"",
            feature.type_
        )));
    }
    Ok(feature)
}

/// Validate one event feature: Point geometry `[lon, lat, depth]` plus `mag`, `place`, `time`.
pub fn event_from_feature(value: Value) -> Result<GeoEvent, FeatureError> {
    let feature = read_feature(value)?;

    let coordinates = match feature.geometry {
        Some(Geometry::Point { coordinates }) => coordinates,
        Some(other) => {
            return Err(FeatureError::UnexpectedGeometry {
                expected: "Point",
                found: other.type_name(),
            })
        }
        None => return Err(FeatureError::MissingGeometry),
    };

    let longitude = coordinate(&coordinates, 0, "longitude")?;
    let latitude = coordinate(&coordinates, 1, "latitude")?;
    let depth_km = coordinate(&coordinates, 2, "depth")?;
    check_position(longitude, latitude)?;

    let properties: EventProperties = match feature.properties {
        Some(Value::Null) | None => return Err(FeatureError::MissingProperty("properties")),
        Some(props) => {
            serde_json::from_value(props).map_err(|e| FeatureError::Shape(e.to_string()))?
        }
    };

    let magnitude = properties.mag.ok_or(FeatureError::MissingProperty("mag"))?;
    if !magnitude.is_finite() {
        return Err(FeatureError::NonFinite("mag"));
    }
    let place = properties
        .place
        .ok_or(FeatureError::MissingProperty("place"))?;
    let timestamp_ms = properties
        .time
        .ok_or(FeatureError::MissingProperty("time"))?;

    Ok(GeoEvent {
        longitude,
        latitude,
        depth_km,
        magnitude,
        place,
        timestamp_ms,
    })
}

/// Validate one boundary feature into its polyline(s).
pub fn segments_from_feature(value: Value) -> Result<Vec<BoundarySegment>, FeatureError> {
    let feature = read_feature(value)?;

    match feature.geometry {
        Some(Geometry::LineString { coordinates }) => Ok(vec![line(&coordinates)?]),
        Some(Geometry::MultiLineString { coordinates }) => {
            coordinates.iter().map(|l| line(l)).collect()
        }
        Some(other) => Err(FeatureError::UnexpectedGeometry {
            expected: "LineString",
            found: other.type_name(),
        }),
        None => Err(FeatureError::MissingGeometry),
    }
}

fn line(positions: &[Vec<f64>]) -> Result<BoundarySegment, FeatureError> {
    if positions.len() < 2 {
        return Err(FeatureError::DegenerateLine(positions.len()));
    }
    let vertices = positions
        .iter()
        .map(|p| {
            let lon = coordinate(p, 0, "longitude")?;
            let lat = coordinate(p, 1, "latitude")?;
            check_position(lon, lat)?;
            Ok(LonLat::new(lon, lat))
        })
        .collect::<Result<Vec<_>, FeatureError>>()?;
    Ok(BoundarySegment::new(vertices))
}

fn coordinate(values: &[f64], index: usize, field: &'static str) -> Result<f64, FeatureError> {
    let v = *values
        .get(index)
        .ok_or(FeatureError::MissingCoordinate(index))?;
    if !v.is_finite() {
        return Err(FeatureError::NonFinite(field));
    }
    Ok(v)
}

fn check_position(lon: f64, lat: f64) -> Result<(), FeatureError> {
    if !(-180.0..=180.0).contains(&lon) {
        return Err(FeatureError::OutOfRange {
            field: "longitude",
            value: lon,
        });
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(FeatureError::OutOfRange {
            field: "latitude",
            value: lat,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_from_feature() {
        let event = event_from_feature(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [10.0, 20.0, 5.0]},
            "properties": {"mag": 4.5, "place": "Test", "time": 1_700_000_000_000i64}
        }))
        .unwrap();
        assert_eq!(event.longitude, 10.0);
        assert_eq!(event.latitude, 20.0);
        assert_eq!(event.depth_km, 5.0);
        assert_eq!(event.magnitude, 4.5);
    }

    #[test]
    fn test_event_negative_depth_is_valid() {
        let event = event_from_feature(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-155.3, 19.4, -1.2]},
            "properties": {"mag": 4.6, "place": "Hawaii", "time": 0}
        }))
        .unwrap();
        assert_eq!(event.depth_km, -1.2);
    }

    #[test]
    fn test_event_missing_depth() {
        let err = event_from_feature(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [10.0, 20.0]},
            "properties": {"mag": 4.5, "place": "Test", "time": 0}
        }))
        .unwrap_err();
        assert_eq!(err, FeatureError::MissingCoordinate(2));
    }

    #[test]
    fn test_event_null_magnitude() {
        let err = event_from_feature(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [10.0, 20.0, 5.0]},
            "properties": {"mag": null, "place": "Test", "time": 0}
        }))
        .unwrap_err();
        assert_eq!(err, FeatureError::MissingProperty("mag"));
    }

    #[test]
    fn test_event_latitude_out_of_range() {
        let err = event_from_feature(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [10.0, 95.0, 5.0]},
            "properties": {"mag": 4.5, "place": "Test", "time": 0}
        }))
        .unwrap_err();
        assert!(matches!(err, FeatureError::OutOfRange { field: "latitude", .. }));
    }

    #[test]
    fn test_multilinestring_yields_each_line() {
        let segments = segments_from_feature(json!({
            "type": "Feature",
            "geometry": {"type": "MultiLineString", "coordinates": [
                [[0.0, 0.0], [1.0, 1.0]],
                [[2.0, 2.0], [3.0, 3.0], [4.0, 4.0]]
            ]},
            "properties": null
        }))
        .unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].len(), 3);
    }

    #[test]
    fn test_single_vertex_line_rejected() {
        let err = segments_from_feature(json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0]]}
        }))
        .unwrap_err();
        assert_eq!(err, FeatureError::DegenerateLine(1));
    }

    #[test]
    fn test_feature_type_is_checked() {
        let err = event_from_feature(json!({
            "type": "Station",
            "geometry": {"type": "Point", "coordinates": [10.0, 20.0, 5.0]},
            "properties": {"mag": 4.5, "place": "Test", "time": 0}
        }))
        .unwrap_err();
        assert!(matches!(err, FeatureError::Shape(_)));

        let err = segments_from_feature(json!({
            "type": "FeatureCollection",
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}
        }))
        .unwrap_err();
        assert!(matches!(err, FeatureError::Shape(_)));
    }

    #[test]
    fn test_multilinestring_counts_as_one_feature() {
        let doc = br#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"MultiLineString","coordinates":[
                [[0.0,0.0],[1.0,1.0]],[[2.0,2.0],[3.0,3.0]]]}},
            {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0.0,0.0]]}}
        ]}"#;
        let decoded = decode_boundaries(doc).unwrap();
        assert_eq!(decoded.items.len(), 2);
        assert_eq!(decoded.total(), 2);
        assert_eq!(decoded.accepted(), 1);
        assert_eq!(decoded.skipped.len(), 1);
    }

    #[test]
    fn test_document_must_be_feature_collection() {
        let err = decode_events(br#"{"type":"Feature","features":[]}"#).unwrap_err();
        assert!(matches!(err, FeedError::NotFeatureCollection(_)));

        let err = decode_events(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FeedError::InvalidJson(_)));
    }
}

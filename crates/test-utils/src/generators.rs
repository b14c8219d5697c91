//! Generators for synthetic feed documents.
//!
//! Valid features mirror the USGS summary feed shape; malformed features
//! cover each way a real feed has been seen to break.

use serde_json::{json, Value};

/// Fixed event time used by generated features (2023-11-14T22:13:20Z).
pub const SAMPLE_TIME_MS: i64 = 1_700_000_000_000;

/// A valid earthquake feature.
///
/// # Example
///
/// ```
/// use test_utils::event_feature;
///
/// let f = event_feature(10.0, 20.0, 5.0, 4.5);
/// assert_eq!(f["geometry"]["coordinates"][2], 5.0);
/// ```
pub fn event_feature(lon: f64, lat: f64, depth_km: f64, mag: f64) -> Value {
    json!({
        "type": "Feature",
        "properties": {
            "mag": mag,
            "place": format!("{:.1} km near {:.2},{:.2}", depth_km, lat, lon),
            "time": SAMPLE_TIME_MS,
            "type": "earthquake"
        },
        "geometry": {"type": "Point", "coordinates": [lon, lat, depth_km]},
        "id": format!("us{}{}", lon as i64, lat as i64)
    })
}

/// A valid event feature with an explicit place and time.
pub fn event_feature_at(lon: f64, lat: f64, depth_km: f64, mag: f64, place: &str, time_ms: i64) -> Value {
    json!({
        "type": "Feature",
        "properties": {"mag": mag, "place": place, "time": time_ms},
        "geometry": {"type": "Point", "coordinates": [lon, lat, depth_km]}
    })
}

/// The `n`th kind of malformed event feature, cycling through every variant.
pub fn malformed_event_feature(n: usize) -> Value {
    match n % 6 {
        // depth missing
        0 => json!({
            "type": "Feature",
            "properties": {"mag": 5.0, "place": "x", "time": SAMPLE_TIME_MS},
            "geometry": {"type": "Point", "coordinates": [10.0, 20.0]}
        }),
        // null magnitude
        1 => json!({
            "type": "Feature",
            "properties": {"mag": null, "place": "x", "time": SAMPLE_TIME_MS},
            "geometry": {"type": "Point", "coordinates": [10.0, 20.0, 5.0]}
        }),
        // null geometry
        2 => json!({
            "type": "Feature",
            "properties": {"mag": 5.0, "place": "x", "time": SAMPLE_TIME_MS},
            "geometry": null
        }),
        // no properties
        3 => json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [10.0, 20.0, 5.0]}
        }),
        // string coordinate
        4 => json!({
            "type": "Feature",
            "properties": {"mag": 5.0, "place": "x", "time": SAMPLE_TIME_MS},
            "geometry": {"type": "Point", "coordinates": ["10", 20.0, 5.0]}
        }),
        // not an object
        _ => json!("garbage"),
    }
}

/// A boundary LineString feature.
pub fn boundary_feature(vertices: &[(f64, f64)]) -> Value {
    let coordinates: Vec<[f64; 2]> = vertices.iter().map(|&(lon, lat)| [lon, lat]).collect();
    json!({
        "type": "Feature",
        "properties": {"LAYER": "plate boundary", "Name": "AF-AN"},
        "geometry": {"type": "LineString", "coordinates": coordinates}
    })
}

/// Serialize features as a FeatureCollection document.
pub fn feature_collection(features: Vec<Value>) -> String {
    json!({"type": "FeatureCollection", "features": features}).to_string()
}

/// A feed with `valid` good events (spread over every depth bucket) and `malformed` bad ones,
/// interleaved.
pub fn mixed_event_feed(valid: usize, malformed: usize) -> String {
    let depths = [5.0, 15.0, 35.0, 55.0, 75.0, 300.0];
    let mut features = Vec::with_capacity(valid + malformed);
    let mut bad = 0;
    for i in 0..valid {
        let depth = depths[i % depths.len()];
        features.push(event_feature(
            (i % 360) as f64 - 180.0,
            (i % 180) as f64 - 90.0,
            depth,
            4.5 + (i % 5) as f64 * 0.3,
        ));
        if bad < malformed {
            features.push(malformed_event_feature(bad));
            bad += 1;
        }
    }
    while bad < malformed {
        features.push(malformed_event_feature(bad));
        bad += 1;
    }
    feature_collection(features)
}

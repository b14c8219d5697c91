//! Canned feed documents for quake-map tests.
//!
//! Trimmed copies of the shapes served by the USGS summary feed and the
//! PB2002 plate-boundary collection.

/// A USGS-style event feed with three valid events and its metadata block.
pub const EVENT_FEED: &str = r#"{
  "type": "FeatureCollection",
  "metadata": {
    "generated": 1700000000000,
    "url": "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_month.geojson",
    "title": "USGS Magnitude 4.5+ Earthquakes, Past Month",
    "status": 200,
    "api": "1.10.3",
    "count": 3
  },
  "features": [
    {
      "type": "Feature",
      "properties": {"mag": 4.5, "place": "Shallow test event", "time": 1700000000000, "tsunami": 0},
      "geometry": {"type": "Point", "coordinates": [10, 20, 5]},
      "id": "us7000a001"
    },
    {
      "type": "Feature",
      "properties": {"mag": 5.2, "place": "112 km SW of Tual, Indonesia", "time": 1699990000000, "tsunami": 0},
      "geometry": {"type": "Point", "coordinates": [131.91, -6.42, 75]},
      "id": "us7000a002"
    },
    {
      "type": "Feature",
      "properties": {"mag": 6.1, "place": "Fiji region", "time": 1699980000000, "tsunami": 1},
      "geometry": {"type": "Point", "coordinates": [-178.2, -17.9, 562.3]},
      "id": "us7000a003"
    }
  ],
  "bbox": [-178.2, -17.9, 5, 131.91, 20, 562.3]
}"#;

/// A PB2002-style boundary collection with two LineStrings.
pub const BOUNDARY_FEED: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"LAYER": "plate boundary", "Name": "AF-AN", "Source": "Mueller et al. [1987]", "PlateA": "AF", "PlateB": "AN", "Type": ""},
      "geometry": {"type": "LineString", "coordinates": [[-0.4379, -54.8518], [-0.0381, -54.6772], [0.443, -54.4654]]}
    },
    {
      "type": "Feature",
      "properties": {"LAYER": "plate boundary", "Name": "AN-AU", "Source": "by Peter Bird, 1999", "PlateA": "AN", "PlateB": "AU", "Type": ""},
      "geometry": {"type": "LineString", "coordinates": [[100.0, -45.0], [101.5, -46.2]]}
    }
  ]
}"#;

/// An event document whose features are all malformed.
pub const ALL_MALFORMED_FEED: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"mag": 4.8}, "geometry": {"type": "Point", "coordinates": [1, 2, 3]}},
    {"type": "Feature", "properties": {"mag": 4.8, "place": "p", "time": 1}, "geometry": {"type": "LineString", "coordinates": [[1, 2], [3, 4]]}}
  ]
}"#;

/// An upstream error page in place of JSON.
pub const HTML_ERROR_PAGE: &str = "<html><body><h1>503 Service Unavailable</h1></body></html>";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_json() {
        for doc in [EVENT_FEED, BOUNDARY_FEED, ALL_MALFORMED_FEED] {
            let v: serde_json::Value = serde_json::from_str(doc).unwrap();
            assert_eq!(v["type"], "FeatureCollection");
        }
    }
}

//! Tests for tile coordinates and URL templates.

use quake_common::tile::{TileCoord, TileUrlTemplate, MAX_ZOOM};
use quake_common::QuakeError;

// ============================================================================
// Coordinate validation
// ============================================================================

#[test]
fn test_checked_accepts_world_tile() {
    let coord = TileCoord::checked(0, 0, 0).unwrap();
    assert_eq!(coord, TileCoord::new(0, 0, 0));
}

#[test]
fn test_checked_accepts_last_column() {
    assert!(TileCoord::checked(2, 3, 3).is_ok());
}

#[test]
fn test_checked_rejects_out_of_matrix() {
    let err = TileCoord::checked(2, 4, 0).unwrap_err();
    assert!(matches!(err, QuakeError::InvalidTile(_)));
    assert_eq!(err.http_status_code(), 400);
}

#[test]
fn test_checked_rejects_deep_zoom() {
    assert!(TileCoord::checked(MAX_ZOOM + 1, 0, 0).is_err());
}

// ============================================================================
// Template expansion
// ============================================================================

#[test]
fn test_template_without_subdomain_placeholder() {
    let t = TileUrlTemplate::new("http://localhost/tiles/greyscale/{z}/{x}/{y}.png");
    assert_eq!(
        t.expand(&TileCoord::new(5, 10, 12)),
        "http://localhost/tiles/greyscale/5/10/12.png"
    );
}

#[test]
fn test_template_with_empty_subdomains() {
    let t = TileUrlTemplate {
        template: "https://{s}example.org/{z}/{x}/{y}.png".to_string(),
        subdomains: vec![],
    };
    assert_eq!(
        t.expand(&TileCoord::new(1, 1, 0)),
        "https://example.org/1/1/0.png"
    );
}

#[test]
fn test_template_deserializes_default_subdomains() {
    let t: TileUrlTemplate =
        serde_json::from_str(r#"{"template": "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png"}"#)
            .unwrap();
    assert_eq!(t.subdomains, vec!["a", "b", "c"]);
}

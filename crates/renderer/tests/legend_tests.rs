//! Tests for the depth legend.

use renderer::encoding::{color_from_depth, depth_bucket_index};
use renderer::legend::{
    build_depth_legend, build_legend, ControlPosition, Legend, DEPTH_LEGEND_BOUNDARIES,
};

#[test]
fn test_one_entry_per_boundary() {
    let entries = build_legend(&DEPTH_LEGEND_BOUNDARIES, color_from_depth);
    assert_eq!(entries.len(), DEPTH_LEGEND_BOUNDARIES.len());
}

#[test]
fn test_swatch_sampled_one_unit_above_boundary() {
    let entries = build_legend(&DEPTH_LEGEND_BOUNDARIES, color_from_depth);
    for (entry, &b) in entries.iter().zip(DEPTH_LEGEND_BOUNDARIES.iter()) {
        assert_eq!(entry.swatch_color, color_from_depth(b + 1.0));
    }
}

#[test]
fn test_default_swatches() {
    let entries = build_legend(&DEPTH_LEGEND_BOUNDARIES, color_from_depth);
    let swatches: Vec<&str> = entries.iter().map(|e| e.swatch_color.as_str()).collect();
    // The [10, 30) color is never shown: the first row samples -9.
    assert_eq!(swatches, vec!["#faf0a9", "#fbaa32", "#ff8220", "#ff5142", "#ff0066"]);
}

#[test]
fn test_terminal_entry_is_open_ended() {
    let entries = build_legend(&DEPTH_LEGEND_BOUNDARIES, color_from_depth);
    let last = entries.last().unwrap();
    assert!(last.range_label.ends_with('+'));
    assert_eq!(last.upper, None);
    assert!(entries[..entries.len() - 1]
        .iter()
        .all(|e| e.range_label.contains('\u{2013}')));
}

#[test]
fn test_legend_follows_color_function() {
    let entries = build_legend(&[0.0, 100.0], |d| if d < 50.0 { "#000000" } else { "#ffffff" });
    assert_eq!(entries[0].swatch_color, "#000000");
    assert_eq!(entries[1].swatch_color, "#ffffff");
    assert_eq!(entries[1].range_label, "100+");
}

#[test]
fn test_fractional_boundaries_flagged() {
    let legend = Legend {
        title: "Depth (km)".to_string(),
        position: ControlPosition::BottomRight,
        entries: build_legend(&[9.5, 10.0, 30.0], color_from_depth),
    };
    let issues = legend.misalignments(depth_bucket_index);
    // 9.5 + 1 = 10.5 lands at or past the next boundary and in the same bucket as the next row.
    assert!(issues.iter().any(|m| m.entry == 0));
    assert!(issues.iter().any(|m| m.entry == 1));
}

#[test]
fn test_depth_legend_html() {
    let legend = build_depth_legend();
    let html = legend.to_html();
    assert!(html.starts_with("<div class=\"info legend\""));
    assert!(html.contains("<h4>Depth (km)</h4>"));
    assert_eq!(html.matches("<i style=\"background:").count(), 5);
    assert!(html.contains("90+"));
    assert_eq!(legend.position, ControlPosition::BottomRight);
}

//! Event → circle marker transformation.

use chrono::{DateTime, Utc};
use quake_common::{GeoEvent, VisualMarker};
use serde::{Deserialize, Serialize};

use crate::encoding::{color_from_depth, radius_from_magnitude};
use crate::html::escape;

/// Marker drawing options shared by every event in a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f64,

    /// Draw an outline in the fill color.
    #[serde(default)]
    pub stroke: bool,
}

fn default_fill_opacity() -> f64 {
    0.75
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            fill_opacity: default_fill_opacity(),
            stroke: false,
        }
    }
}

/// Transform one event with the default marker style.
pub fn transform(event: &GeoEvent) -> VisualMarker {
    transform_with_style(event, &MarkerStyle::default())
}

/// Transform one event into its marker.
pub fn transform_with_style(event: &GeoEvent, style: &MarkerStyle) -> VisualMarker {
    let fill_color = color_from_depth(event.depth_km).to_string();
    let stroke_color = style.stroke.then(|| fill_color.clone());

    VisualMarker {
        center: event.position(),
        radius_meters: radius_from_magnitude(event.magnitude),
        fill_color,
        stroke_color,
        fill_opacity: style.fill_opacity,
        label: popup_label(event),
    }
}

/// Popup markup: place heading, then magnitude and date.
pub fn popup_label(event: &GeoEvent) -> String {
    format!(
        "<h2>{}</h2><hr><h3>Magnitude: {}<br>Date: {}</h3>",
        escape(&event.place),
        event.magnitude,
        format_event_time(event.timestamp_ms)
    )
}

/// Human-readable UTC time for an epoch-millisecond timestamp.
pub fn format_event_time(timestamp_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_ms) {
        Some(dt) => dt.format("%a %b %d %Y %H:%M:%S UTC").to_string(),
        None => "Unknown date".to_string(),
    }
}

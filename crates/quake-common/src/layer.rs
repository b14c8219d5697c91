//! Layer groups and the renderable elements they own.

use serde::{Deserialize, Serialize};

use crate::{BoundarySegment, LonLat};

/// Unique identifier for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A circle marker derived from one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualMarker {
    pub center: LonLat,
    /// Radius in meters. Zero or negative means nothing is drawn.
    pub radius_meters: f64,
    pub fill_color: String,
    /// `None` disables the outline.
    pub stroke_color: Option<String>,
    pub fill_opacity: f64,
    /// Popup HTML.
    pub label: String,
}

impl VisualMarker {
    /// Whether the rendering layer should draw this marker at all.
    pub fn is_visible(&self) -> bool {
        self.radius_meters > 0.0
    }
}

/// Fixed style applied to every boundary polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "#99ff66".to_string(),
            weight: 2.0,
        }
    }
}

/// What a layer group holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContent {
    Markers {
        markers: Vec<VisualMarker>,
    },
    Boundaries {
        segments: Vec<BoundarySegment>,
        style: LineStyle,
    },
}

/// A named collection of map elements toggled as one unit.
///
/// Groups are populated once when constructed and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerGroup {
    pub id: LayerId,
    pub title: String,
    content: LayerContent,
}

impl LayerGroup {
    pub fn markers(id: LayerId, title: impl Into<String>, markers: Vec<VisualMarker>) -> Self {
        Self {
            id,
            title: title.into(),
            content: LayerContent::Markers { markers },
        }
    }

    pub fn boundaries(
        id: LayerId,
        title: impl Into<String>,
        segments: Vec<BoundarySegment>,
        style: LineStyle,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: LayerContent::Boundaries { segments, style },
        }
    }

    pub fn content(&self) -> &LayerContent {
        &self.content
    }

    /// Markers of a marker layer; empty for boundary layers.
    pub fn marker_slice(&self) -> &[VisualMarker] {
        match &self.content {
            LayerContent::Markers { markers } => markers,
            LayerContent::Boundaries { .. } => &[],
        }
    }

    /// Segments of a boundary layer; empty for marker layers.
    pub fn segment_slice(&self) -> &[BoundarySegment] {
        match &self.content {
            LayerContent::Markers { .. } => &[],
            LayerContent::Boundaries { segments, .. } => segments,
        }
    }

    /// Number of elements in the group.
    pub fn len(&self) -> usize {
        match &self.content {
            LayerContent::Markers { markers } => markers.len(),
            LayerContent::Boundaries { segments, .. } => segments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

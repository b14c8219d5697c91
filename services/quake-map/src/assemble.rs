//! Layer assembly: fetch a feed, decode it, turn every valid feature into a
//! map element and group the result into one overlay layer.
//!
//! A layer is built all-or-nothing. A failed fetch or an undecodable document
//! yields an error and no group; malformed features inside an otherwise valid
//! document are skipped and counted.

use std::sync::Arc;

use feed_protocol::{decode_boundaries, decode_events, Decoded};
use metrics::counter;
use quake_common::{LayerGroup, LayerId, LineStyle, QuakeError, QuakeResult};
use renderer::{transform_with_style, MarkerStyle};
use tracing::{info, instrument, warn};

use crate::config::MapConfig;
use crate::fetch::FeedSource;

pub const EVENTS_LAYER_ID: &str = "earthquakes";
pub const BOUNDARIES_LAYER_ID: &str = "tectonic_plates";

/// Builds the event and boundary overlays from their feeds.
pub struct LayerAssembler {
    source: Arc<dyn FeedSource>,
    marker_style: MarkerStyle,
    boundary_style: LineStyle,
    events_title: String,
    boundaries_title: String,
}

impl LayerAssembler {
    pub fn new(source: Arc<dyn FeedSource>, config: &MapConfig) -> Self {
        Self {
            source,
            marker_style: config.markers.clone(),
            boundary_style: config.boundary_style.clone(),
            events_title: config.overlays.events_title.clone(),
            boundaries_title: config.overlays.boundaries_title.clone(),
        }
    }

    pub fn events_title(&self) -> &str {
        &self.events_title
    }

    pub fn boundaries_title(&self) -> &str {
        &self.boundaries_title
    }

    /// Fetch the event feed at `url` and build one marker per valid event.
    #[instrument(skip(self), fields(layer = EVENTS_LAYER_ID))]
    pub async fn build_event_layer(&self, url: &str) -> QuakeResult<LayerGroup> {
        let body = self.fetch(EVENTS_LAYER_ID, url).await?;
        let decoded = decode_events(&body).map_err(|e| load_failed(EVENTS_LAYER_ID, e.into()))?;
        record_decode(EVENTS_LAYER_ID, &decoded);

        let markers = decoded
            .items
            .iter()
            .map(|event| transform_with_style(event, &self.marker_style))
            .collect::<Vec<_>>();

        info!(
            markers = markers.len(),
            skipped = decoded.skipped.len(),
            "Event layer assembled"
        );

        Ok(LayerGroup::markers(
            LayerId::new(EVENTS_LAYER_ID),
            self.events_title.clone(),
            markers,
        ))
    }

    /// Fetch the boundary feed at `url` and build one styled polyline per segment.
    #[instrument(skip(self), fields(layer = BOUNDARIES_LAYER_ID))]
    pub async fn build_boundary_layer(&self, url: &str) -> QuakeResult<LayerGroup> {
        let body = self.fetch(BOUNDARIES_LAYER_ID, url).await?;
        let decoded =
            decode_boundaries(&body).map_err(|e| load_failed(BOUNDARIES_LAYER_ID, e.into()))?;
        record_decode(BOUNDARIES_LAYER_ID, &decoded);

        info!(
            segments = decoded.items.len(),
            skipped = decoded.skipped.len(),
            "Boundary layer assembled"
        );

        Ok(LayerGroup::boundaries(
            LayerId::new(BOUNDARIES_LAYER_ID),
            self.boundaries_title.clone(),
            decoded.items,
            self.boundary_style.clone(),
        ))
    }

    async fn fetch(&self, layer: &'static str, url: &str) -> QuakeResult<bytes::Bytes> {
        self.source
            .fetch(url)
            .await
            .map_err(|e| load_failed(layer, e))
    }
}

fn record_decode<T>(layer: &'static str, decoded: &Decoded<T>) {
    counter!("features_decoded_total", "layer" => layer).increment(decoded.accepted() as u64);

    if !decoded.skipped.is_empty() {
        counter!("features_skipped_total", "layer" => layer)
            .increment(decoded.skipped.len() as u64);
        warn!(
            skipped = decoded.skipped.len(),
            total = decoded.total(),
            first_index = decoded.skipped[0].index,
            first_reason = %decoded.skipped[0].reason,
            "Skipped malformed features"
        );
    }
}

fn load_failed(layer: &'static str, err: QuakeError) -> QuakeError {
    counter!("layer_load_failures_total", "layer" => layer).increment(1);
    err
}

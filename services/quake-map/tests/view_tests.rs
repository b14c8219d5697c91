//! End-to-end view composition against in-memory feeds.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use quake_common::{QuakeError, QuakeResult};
use quake_map::{
    FeedSource, MapConfig, MemoryFeedSource, ViewComposer, ViewModel, BOUNDARIES_LAYER_ID,
    EVENTS_LAYER_ID,
};
use test_utils::fixtures;
use test_utils::{event_feature, feature_collection};

const EVENTS: &str = "mem://events";
const PLATES: &str = "mem://plates";

fn config() -> Arc<MapConfig> {
    let mut config = MapConfig::default();
    config.feeds.events_url = EVENTS.to_string();
    config.feeds.boundaries_url = PLATES.to_string();
    Arc::new(config)
}

fn composer(source: MemoryFeedSource) -> ViewComposer {
    ViewComposer::new(config(), Arc::new(source)).unwrap()
}

fn both_feeds() -> MemoryFeedSource {
    MemoryFeedSource::new()
        .with_document(EVENTS, fixtures::EVENT_FEED)
        .with_document(PLATES, fixtures::BOUNDARY_FEED)
}

/// Delays one URL, serves everything else straight from memory.
struct SlowSource {
    inner: MemoryFeedSource,
    slow_url: &'static str,
    delay: Duration,
}

#[async_trait]
impl FeedSource for SlowSource {
    async fn fetch(&self, url: &str) -> QuakeResult<Bytes> {
        if url == self.slow_url {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.fetch(url).await
    }
}

// ============================================================================
// Composition
// ============================================================================

#[tokio::test]
async fn test_initial_view_usable_before_feeds() {
    let composer = composer(MemoryFeedSource::new());
    let view = composer.initial_view().unwrap();

    assert_eq!(view.viewport().center, [0.0, 0.0]);
    assert_eq!(view.viewport().zoom, 2);
    assert_eq!(view.base_layers().len(), 3);
    assert_eq!(view.active_base().title, "Satellite");
    assert!(view.overlays().is_empty());
    assert!(view.legend_html().unwrap().contains("Depth (km)"));
}

#[tokio::test]
async fn test_both_overlays_attached_in_control_order() {
    let view = composer(both_feeds()).compose().await.unwrap();

    let control = view.layer_control();
    let overlays: Vec<&str> = control.overlays.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(overlays, vec!["Earthquakes", "Tectonic Plates"]);
    assert!(control.overlays.iter().all(|e| e.checked));
    assert!(view.notices().is_empty());
}

#[tokio::test]
async fn test_overlays_attach_in_arrival_order() {
    let source = SlowSource {
        inner: both_feeds(),
        slow_url: EVENTS,
        delay: Duration::from_millis(50),
    };
    let composer = ViewComposer::new(config(), Arc::new(source)).unwrap();
    let view = composer.compose().await.unwrap();

    let ids: Vec<&str> = view.overlays().iter().map(|o| o.group.id.as_str()).collect();
    assert_eq!(ids, vec![BOUNDARIES_LAYER_ID, EVENTS_LAYER_ID]);
    assert!(view.notices().is_empty());
}

#[tokio::test]
async fn test_build_single_overlay() {
    let composer = composer(MemoryFeedSource::new().with_document(PLATES, fixtures::BOUNDARY_FEED));

    let plates = composer.build_overlay(BOUNDARIES_LAYER_ID).await.unwrap();
    assert_eq!(plates.len(), 2);

    let err = composer.build_overlay(EVENTS_LAYER_ID).await.unwrap_err();
    assert!(err.is_upstream());

    let err = composer.build_overlay("volcanoes").await.unwrap_err();
    assert!(matches!(err, QuakeError::LayerNotFound(_)));
    assert!(!err.is_upstream());

    let sources: Vec<&str> = composer.overlay_sources().iter().map(|(id, _)| *id).collect();
    assert_eq!(sources, vec![EVENTS_LAYER_ID, BOUNDARIES_LAYER_ID]);
}

#[tokio::test]
async fn test_shallow_and_intermediate_event_markers() {
    let doc = feature_collection(vec![
        event_feature(10.0, 20.0, 5.0, 4.5),
        event_feature(30.0, 40.0, 75.0, 5.0),
    ]);
    let source = MemoryFeedSource::new()
        .with_document(EVENTS, doc)
        .with_document(PLATES, fixtures::BOUNDARY_FEED);
    let view = composer(source).compose().await.unwrap();

    let markers = view.overlay(EVENTS_LAYER_ID).unwrap().group.marker_slice();
    assert_eq!(markers[0].fill_color, "#faf0a9");
    assert_eq!(markers[0].radius_meters, 50_000.0);
    assert_eq!(markers[1].fill_color, "#ff5142");
}

#[tokio::test]
async fn test_event_feed_failure_leaves_boundaries() {
    let source = MemoryFeedSource::new().with_document(PLATES, fixtures::BOUNDARY_FEED);
    let view = composer(source).compose().await.unwrap();

    assert!(view.overlay(EVENTS_LAYER_ID).is_none());
    assert_eq!(view.overlay(BOUNDARIES_LAYER_ID).unwrap().group.len(), 2);

    let control = view.layer_control();
    let overlays: Vec<&str> = control.overlays.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(overlays, vec![BOUNDARIES_LAYER_ID]);

    assert_eq!(view.notices().len(), 1);
    assert_eq!(view.notices()[0].layer.as_str(), EVENTS_LAYER_ID);
    assert!(view.notices()[0].message.starts_with("Earthquakes could not be loaded"));

    let model = ViewModel::build(&view, Some(""));
    assert_eq!(model.overlays.len(), 1);
    assert_eq!(model.notices.len(), 1);
}

#[tokio::test]
async fn test_both_feeds_failing_still_gives_base_map() {
    let view = composer(MemoryFeedSource::new()).compose().await.unwrap();
    assert!(view.overlays().is_empty());
    assert_eq!(view.notices().len(), 2);
    assert_eq!(view.layer_control().base_layers.len(), 3);
}

// ============================================================================
// Layer control
// ============================================================================

#[tokio::test]
async fn test_base_switch_leaves_overlays_unchanged() {
    let mut view = composer(both_feeds()).compose().await.unwrap();
    view.set_overlay_visible(BOUNDARIES_LAYER_ID, false).unwrap();
    let before: Vec<_> = view.overlays().iter().map(|o| (o.group.clone(), o.visible)).collect();

    view.select_base("greyscale").unwrap();
    view.select_base("humanitarian").unwrap();

    let after: Vec<_> = view.overlays().iter().map(|o| (o.group.clone(), o.visible)).collect();
    assert_eq!(before, after);
    assert_eq!(view.active_base().id.as_str(), "humanitarian");
}

#[tokio::test]
async fn test_overlay_toggles_are_independent() {
    let mut view = composer(both_feeds()).compose().await.unwrap();
    let base_before = view.active_base().id.clone();

    view.toggle_overlay(EVENTS_LAYER_ID).unwrap();

    assert!(!view.overlay(EVENTS_LAYER_ID).unwrap().visible);
    assert!(view.overlay(BOUNDARIES_LAYER_ID).unwrap().visible);
    assert_eq!(view.active_base().id, base_before);
    assert_eq!(view.overlay(EVENTS_LAYER_ID).unwrap().group.len(), 3);
}

#[tokio::test]
async fn test_configured_default_base_layer() {
    let mut config = (*config()).clone();
    config.view.default_base_layer = Some("greyscale".to_string());
    let composer = ViewComposer::new(Arc::new(config), Arc::new(both_feeds())).unwrap();

    let view = composer.initial_view().unwrap();
    assert_eq!(view.active_base().title, "Greyscale");
}

//! Map view composition.
//!
//! [`MapView`] is the application context: it owns the viewport, the base
//! layers (exactly one active), the overlay layers with their visibility, the
//! attached legend and any load notices. [`ViewComposer`] builds the view with
//! base layers and legend first, then attaches each overlay as its feed arrives.

use std::fmt;
use std::sync::Arc;

use quake_common::{LayerGroup, LayerId, QuakeError, QuakeResult, TileUrlTemplate};
use renderer::{build_depth_legend, Legend, TilePostProcessor};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assemble::{LayerAssembler, BOUNDARIES_LAYER_ID, EVENTS_LAYER_ID};
use crate::config::{BaseLayerConfig, MapConfig};
use crate::fetch::FeedSource;

/// Initial map position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u32,
}

/// A background imagery layer with its tile post-processor.
#[derive(Clone)]
pub struct BaseLayer {
    pub id: LayerId,
    pub title: String,
    pub upstream: TileUrlTemplate,
    pub attribution: String,
    processor: Arc<dyn TilePostProcessor>,
}

impl fmt::Debug for BaseLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseLayer")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("upstream", &self.upstream.template)
            .field("processor", &self.processor.name())
            .finish()
    }
}

impl BaseLayer {
    pub fn new(
        id: LayerId,
        title: impl Into<String>,
        upstream: TileUrlTemplate,
        attribution: impl Into<String>,
        processor: Arc<dyn TilePostProcessor>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            upstream,
            attribution: attribution.into(),
            processor,
        }
    }

    pub fn from_config(config: &BaseLayerConfig) -> QuakeResult<Self> {
        let processor = config
            .post_processor
            .build()
            .map_err(|e| QuakeError::Config(format!("base layer '{}': {}", config.id, e)))?;

        Ok(Self::new(
            LayerId::new(config.id.clone()),
            config.title.clone(),
            config.tiles.clone(),
            config.attribution.clone(),
            Arc::from(processor),
        ))
    }

    pub fn processor(&self) -> &dyn TilePostProcessor {
        self.processor.as_ref()
    }

    /// Tiles need to go through the proxy to be post-processed.
    pub fn needs_proxy(&self) -> bool {
        !self.processor.is_identity()
    }

    /// Template the page loads tiles from. Processed layers go through the tile
    /// proxy at `proxy_base`; without one they cannot be shown and yield `None`.
    pub fn page_template(&self, proxy_base: Option<&str>) -> Option<TileUrlTemplate> {
        if !self.needs_proxy() {
            return Some(self.upstream.clone());
        }
        proxy_base.map(|base| TileUrlTemplate {
            template: format!(
                "{}/tiles/{}/{{z}}/{{x}}/{{y}}.png",
                base.trim_end_matches('/'),
                self.id
            ),
            subdomains: Vec::new(),
        })
    }
}

/// An overlay layer and whether it is currently shown.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub group: LayerGroup,
    pub visible: bool,
}

/// A non-fatal problem shown on the page, such as a feed that failed to load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub layer: LayerId,
    pub title: String,
    pub message: String,
}

/// One row of the layer control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlEntry {
    pub id: String,
    pub title: String,
    pub checked: bool,
}

/// The layer switcher: base layers as radio buttons, overlays as checkboxes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerControl {
    pub collapsed: bool,
    pub base_layers: Vec<ControlEntry>,
    pub overlays: Vec<ControlEntry>,
}

#[derive(Debug, Clone)]
struct AttachedLegend {
    legend: Legend,
    html: String,
}

/// The composed map.
#[derive(Debug, Clone)]
pub struct MapView {
    viewport: Viewport,
    base_layers: Vec<BaseLayer>,
    active_base: usize,
    overlays: Vec<Overlay>,
    legend: Option<AttachedLegend>,
    notices: Vec<Notice>,
}

impl MapView {
    /// A view with its base layers registered; the first one is active.
    pub fn new(viewport: Viewport, base_layers: Vec<BaseLayer>) -> QuakeResult<Self> {
        if base_layers.is_empty() {
            return Err(QuakeError::Config(
                "a map view needs at least one base layer".to_string(),
            ));
        }

        Ok(Self {
            viewport,
            base_layers,
            active_base: 0,
            overlays: Vec::new(),
            legend: None,
            notices: Vec::new(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn base_layers(&self) -> &[BaseLayer] {
        &self.base_layers
    }

    pub fn active_base(&self) -> &BaseLayer {
        &self.base_layers[self.active_base]
    }

    /// Make `id` the visible base layer. Overlays are not touched.
    pub fn select_base(&mut self, id: &str) -> QuakeResult<()> {
        let idx = self
            .base_layers
            .iter()
            .position(|b| b.id.as_str() == id)
            .ok_or_else(|| QuakeError::LayerNotFound(id.to_string()))?;
        self.active_base = idx;
        Ok(())
    }

    /// Render the legend body once and pin it to the map.
    pub fn attach_legend(&mut self, legend: Legend) {
        let html = legend.to_html();
        self.legend = Some(AttachedLegend { legend, html });
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref().map(|l| &l.legend)
    }

    pub fn legend_html(&self) -> Option<&str> {
        self.legend.as_ref().map(|l| l.html.as_str())
    }

    /// Register a populated overlay, initially visible. Replaces an overlay with the same id.
    pub fn add_overlay(&mut self, group: LayerGroup) {
        match self.overlays.iter_mut().find(|o| o.group.id == group.id) {
            Some(existing) => existing.group = group,
            None => self.overlays.push(Overlay {
                group,
                visible: true,
            }),
        }
    }

    /// Attach a finished layer build. A failed build leaves the overlay out and records a notice.
    pub fn attach_loaded(&mut self, id: &str, title: &str, result: QuakeResult<LayerGroup>) {
        match result {
            Ok(group) => {
                debug!(layer = id, elements = group.len(), "Attaching overlay");
                self.add_overlay(group);
            }
            Err(err) => {
                warn!(layer = id, error = %err, "Overlay unavailable");
                self.notices.push(Notice {
                    layer: LayerId::new(id),
                    title: title.to_string(),
                    message: format!("{} could not be loaded: {}", title, err),
                });
            }
        }
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn overlay(&self, id: &str) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.group.id.as_str() == id)
    }

    fn overlay_mut(&mut self, id: &str) -> QuakeResult<&mut Overlay> {
        self.overlays
            .iter_mut()
            .find(|o| o.group.id.as_str() == id)
            .ok_or_else(|| QuakeError::LayerNotFound(id.to_string()))
    }

    pub fn set_overlay_visible(&mut self, id: &str, visible: bool) -> QuakeResult<()> {
        self.overlay_mut(id)?.visible = visible;
        Ok(())
    }

    /// Flip an overlay's visibility and return the new state.
    pub fn toggle_overlay(&mut self, id: &str) -> QuakeResult<bool> {
        let overlay = self.overlay_mut(id)?;
        overlay.visible = !overlay.visible;
        Ok(overlay.visible)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn layer_control(&self) -> LayerControl {
        LayerControl {
            collapsed: false,
            base_layers: self
                .base_layers
                .iter()
                .enumerate()
                .map(|(i, b)| ControlEntry {
                    id: b.id.to_string(),
                    title: b.title.clone(),
                    checked: i == self.active_base,
                })
                .collect(),
            overlays: self
                .overlays
                .iter()
                .map(|o| ControlEntry {
                    id: o.group.id.to_string(),
                    title: o.group.title.clone(),
                    checked: o.visible,
                })
                .collect(),
        }
    }
}

/// Builds [`MapView`]s from configuration and the two feeds.
pub struct ViewComposer {
    config: Arc<MapConfig>,
    assembler: LayerAssembler,
    base_layers: Vec<BaseLayer>,
}

impl ViewComposer {
    pub fn new(config: Arc<MapConfig>, source: Arc<dyn FeedSource>) -> QuakeResult<Self> {
        let base_layers = config
            .base_layers
            .iter()
            .map(BaseLayer::from_config)
            .collect::<QuakeResult<Vec<_>>>()?;
        let assembler = LayerAssembler::new(source, &config);

        Ok(Self {
            config,
            assembler,
            base_layers,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn base_layer(&self, id: &str) -> Option<&BaseLayer> {
        self.base_layers.iter().find(|b| b.id.as_str() == id)
    }

    /// Viewport, base layers and legend. Usable before either feed has loaded.
    pub fn initial_view(&self) -> QuakeResult<MapView> {
        let view_config = &self.config.view;
        let mut view = MapView::new(
            Viewport {
                center: view_config.center,
                zoom: view_config.zoom,
            },
            self.base_layers.clone(),
        )?;

        if let Some(default) = &view_config.default_base_layer {
            view.select_base(default)?;
        }

        view.attach_legend(build_depth_legend());
        Ok(view)
    }

    /// Overlay layers in control order, as `(id, title)`.
    pub fn overlay_sources(&self) -> [(&'static str, &str); 2] {
        [
            (EVENTS_LAYER_ID, self.assembler.events_title()),
            (BOUNDARIES_LAYER_ID, self.assembler.boundaries_title()),
        ]
    }

    /// Fetch and assemble a single overlay by id.
    pub async fn build_overlay(&self, id: &str) -> QuakeResult<LayerGroup> {
        let feeds = &self.config.feeds;
        match id {
            EVENTS_LAYER_ID => self.assembler.build_event_layer(&feeds.events_url).await,
            BOUNDARIES_LAYER_ID => {
                self.assembler
                    .build_boundary_layer(&feeds.boundaries_url)
                    .await
            }
            other => Err(QuakeError::LayerNotFound(other.to_string())),
        }
    }

    /// Fetch both feeds concurrently, attaching each layer as soon as its feed resolves.
    pub async fn load_overlays(&self, view: &mut MapView) {
        let feeds = &self.config.feeds;
        let events = self.assembler.build_event_layer(&feeds.events_url);
        let boundaries = self.assembler.build_boundary_layer(&feeds.boundaries_url);
        tokio::pin!(events, boundaries);

        let mut events_done = false;
        let mut boundaries_done = false;
        while !(events_done && boundaries_done) {
            tokio::select! {
                biased;
                result = &mut events, if !events_done => {
                    events_done = true;
                    view.attach_loaded(EVENTS_LAYER_ID, self.assembler.events_title(), result);
                }
                result = &mut boundaries, if !boundaries_done => {
                    boundaries_done = true;
                    view.attach_loaded(
                        BOUNDARIES_LAYER_ID,
                        self.assembler.boundaries_title(),
                        result,
                    );
                }
            }
        }

        info!(
            overlays = view.overlays().len(),
            notices = view.notices().len(),
            "Map view composed"
        );
    }

    pub async fn compose(&self) -> QuakeResult<MapView> {
        let mut view = self.initial_view()?;
        self.load_overlays(&mut view).await;
        Ok(view)
    }
}

//! Map configuration.
//!
//! Loaded from a YAML file (default `config/quake-map.yaml`). Every section is
//! optional; a missing section falls back to the public USGS/OSM deployment.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use quake_common::{LineStyle, TileUrlTemplate, MAX_ZOOM};
use renderer::{MarkerStyle, PostProcessorConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_EVENTS_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_month.geojson";

pub const DEFAULT_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub feeds: FeedConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default = "default_base_layers")]
    pub base_layers: Vec<BaseLayerConfig>,
    #[serde(default)]
    pub overlays: OverlayConfig,
    #[serde(default)]
    pub markers: MarkerStyle,
    #[serde(default)]
    pub boundary_style: LineStyle,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Remote feature-collection documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_events_url")]
    pub events_url: String,
    #[serde(default = "default_boundaries_url")]
    pub boundaries_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            events_url: default_events_url(),
            boundaries_url: default_boundaries_url(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            feeds: FeedConfig::default(),
            view: ViewConfig::default(),
            base_layers: default_base_layers(),
            overlays: OverlayConfig::default(),
            markers: MarkerStyle::default(),
            boundary_style: LineStyle::default(),
            http: HttpConfig::default(),
        }
    }
}

fn default_events_url() -> String {
    DEFAULT_EVENTS_URL.to_string()
}

fn default_boundaries_url() -> String {
    DEFAULT_BOUNDARIES_URL.to_string()
}

/// Initial viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Page title.
    #[serde(default = "default_title")]
    pub title: String,
    /// `[lat, lon]`
    #[serde(default)]
    pub center: [f64; 2],
    #[serde(default = "default_zoom")]
    pub zoom: u32,
    /// Base layer shown first. Defaults to the first configured layer.
    #[serde(default)]
    pub default_base_layer: Option<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            center: [0.0, 0.0],
            zoom: default_zoom(),
            default_base_layer: None,
        }
    }
}

fn default_title() -> String {
    "Earthquake Map".to_string()
}

fn default_zoom() -> u32 {
    2
}

/// One selectable background layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseLayerConfig {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub tiles: TileUrlTemplate,
    #[serde(default)]
    pub attribution: String,
    #[serde(default)]
    pub post_processor: PostProcessorConfig,
}

impl BaseLayerConfig {
    fn osm(id: &str, title: &str, template: &str, post_processor: PostProcessorConfig) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            tiles: TileUrlTemplate::new(template),
            attribution: OSM_ATTRIBUTION.to_string(),
            post_processor,
        }
    }
}

fn default_base_layers() -> Vec<BaseLayerConfig> {
    vec![
        BaseLayerConfig::osm(
            "satellite",
            "Satellite",
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            PostProcessorConfig::Identity,
        ),
        BaseLayerConfig::osm(
            "greyscale",
            "Greyscale",
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            PostProcessorConfig::Grayscale {
                red: 21.0,
                green: 71.0,
                blue: 8.0,
                divider_tune: 0.0,
            },
        ),
        BaseLayerConfig::osm(
            "humanitarian",
            "Humanitarian",
            "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png",
            PostProcessorConfig::Identity,
        ),
    ]
}

/// Overlay titles as shown in the layer control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_events_title")]
    pub events_title: String,
    #[serde(default = "default_boundaries_title")]
    pub boundaries_title: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            events_title: default_events_title(),
            boundaries_title: default_boundaries_title(),
        }
    }
}

fn default_events_title() -> String {
    "Earthquakes".to_string()
}

fn default_boundaries_title() -> String {
    "Tectonic Plates".to_string()
}

/// Outbound HTTP settings for feeds and upstream tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("quake-map/", env!("CARGO_PKG_VERSION")).to_string()
}

impl MapConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: MapConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        info!(
            path = %path.display(),
            base_layers = config.base_layers.len(),
            "Loaded map configuration"
        );
        Ok(config)
    }

    /// Load `path` if given and present, otherwise use the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            Some(p) => {
                debug!(path = %p.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_layers.is_empty() {
            bail!("at least one base layer is required");
        }

        let mut seen = HashSet::new();
        for layer in &self.base_layers {
            if !seen.insert(layer.id.as_str()) {
                bail!("duplicate base layer id '{}'", layer.id);
            }
            if layer.tiles.template.is_empty() {
                bail!("base layer '{}' has an empty tile template", layer.id);
            }
            layer
                .post_processor
                .build()
                .with_context(|| format!("base layer '{}'", layer.id))?;
        }

        if let Some(default) = &self.view.default_base_layer {
            if !seen.contains(default.as_str()) {
                bail!("default base layer '{}' is not configured", default);
            }
        }

        if self.view.zoom > MAX_ZOOM {
            bail!("zoom {} exceeds maximum {}", self.view.zoom, MAX_ZOOM);
        }

        let [lat, lon] = self.view.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            bail!("view center [{}, {}] is not a valid [lat, lon]", lat, lon);
        }

        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be positive");
        }

        Ok(())
    }
}

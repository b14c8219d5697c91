//! XYZ tile coordinates and tile-server URL templates.

use serde::{Deserialize, Serialize};

use crate::{QuakeError, QuakeResult};

/// Highest zoom level any supported tile provider serves.
pub const MAX_ZOOM: u32 = 19;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Build a coordinate, rejecting zooms and columns/rows outside the Web Mercator pyramid.
    pub fn checked(z: u32, x: u32, y: u32) -> QuakeResult<Self> {
        if z > MAX_ZOOM {
            return Err(QuakeError::InvalidTile(format!(
                "zoom {} exceeds maximum {}",
                z, MAX_ZOOM
            )));
        }
        let n = 1u32 << z;
        if x >= n || y >= n {
            return Err(QuakeError::InvalidTile(format!(
                "tile {}/{}/{} outside {}x{} matrix",
                z, x, y, n, n
            )));
        }
        Ok(Self { z, x, y })
    }

    /// Generate a cache key string.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }
}

/// A `{s}`/`{z}`/`{x}`/`{y}` tile URL template, as used by slippy-map tile servers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileUrlTemplate {
    pub template: String,
    #[serde(default = "default_subdomains")]
    pub subdomains: Vec<String>,
}

fn default_subdomains() -> Vec<String> {
    vec!["a".to_string(), "b".to_string(), "c".to_string()]
}

impl TileUrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            subdomains: default_subdomains(),
        }
    }

    /// Subdomain for a tile, rotating on `x + y` so neighbouring tiles spread across hosts.
    pub fn subdomain(&self, coord: &TileCoord) -> &str {
        if self.subdomains.is_empty() {
            return "";
        }
        let idx = (coord.x as usize + coord.y as usize) % self.subdomains.len();
        &self.subdomains[idx]
    }

    /// Expand the template for one tile.
    pub fn expand(&self, coord: &TileCoord) -> String {
        self.template
            .replace("{s}", self.subdomain(coord))
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }
}

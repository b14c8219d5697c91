//! Post-processing applied to base-layer tiles after they load.
//!
//! Each visual treatment is a [`TilePostProcessor`]; a base layer holds one and
//! the tile proxy runs it over every upstream tile.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Tile processing errors.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("Failed to decode tile: {0}")]
    Decode(String),

    #[error("Failed to encode tile: {0}")]
    Encode(String),

    #[error("Invalid post-processor: {0}")]
    InvalidConfig(String),
}

impl From<TileError> for quake_common::QuakeError {
    fn from(err: TileError) -> Self {
        quake_common::QuakeError::TileProcessing(err.to_string())
    }
}

/// A per-pixel treatment applied to a decoded tile.
pub trait TilePostProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    /// True when [`process`](Self::process) leaves tiles untouched, so they can be linked
    /// straight from the upstream server.
    fn is_identity(&self) -> bool {
        false
    }

    fn process(&self, tile: &mut RgbaImage);
}

/// Leaves tiles as served.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl TilePostProcessor for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn is_identity(&self) -> bool {
        true
    }

    fn process(&self, _tile: &mut RgbaImage) {}
}

/// Weighted-luminance grayscale. Alpha is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grayscale {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub divider_tune: f32,
}

impl Default for Grayscale {
    fn default() -> Self {
        Self {
            red: 21.0,
            green: 71.0,
            blue: 8.0,
            divider_tune: 0.0,
        }
    }
}

impl Grayscale {
    pub fn new(red: f32, green: f32, blue: f32, divider_tune: f32) -> Result<Self, TileError> {
        let g = Self {
            red,
            green,
            blue,
            divider_tune,
        };
        if !(g.divider() > 0.0) {
            return Err(TileError::InvalidConfig(format!(
                "grayscale weights must sum to a positive divider, got {}",
                g.divider()
            )));
        }
        Ok(g)
    }

    pub fn divider(&self) -> f32 {
        self.red + self.green + self.blue + self.divider_tune
    }

    /// Gray level for one pixel.
    pub fn luminance(&self, r: u8, g: u8, b: u8) -> u8 {
        let gray =
            (self.red * r as f32 + self.green * g as f32 + self.blue * b as f32) / self.divider();
        gray.round().clamp(0.0, 255.0) as u8
    }
}

impl TilePostProcessor for Grayscale {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn process(&self, tile: &mut RgbaImage) {
        for pixel in tile.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            let gray = self.luminance(r, g, b);
            *pixel = Rgba([gray, gray, gray, a]);
        }
    }
}

/// Post-processor selection as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostProcessorConfig {
    #[default]
    Identity,
    Grayscale {
        #[serde(default = "default_red")]
        red: f32,
        #[serde(default = "default_green")]
        green: f32,
        #[serde(default = "default_blue")]
        blue: f32,
        #[serde(default)]
        divider_tune: f32,
    },
}

fn default_red() -> f32 {
    21.0
}
fn default_green() -> f32 {
    71.0
}
fn default_blue() -> f32 {
    8.0
}

impl PostProcessorConfig {
    pub fn build(&self) -> Result<Box<dyn TilePostProcessor>, TileError> {
        match *self {
            PostProcessorConfig::Identity => Ok(Box::new(Identity)),
            PostProcessorConfig::Grayscale {
                red,
                green,
                blue,
                divider_tune,
            } => Ok(Box::new(Grayscale::new(red, green, blue, divider_tune)?)),
        }
    }
}

/// Decode an encoded tile, run the processor over it and re-encode as PNG.
///
/// Identity processors return the input unchanged without decoding.
pub fn process_encoded(body: &[u8], processor: &dyn TilePostProcessor) -> Result<Vec<u8>, TileError> {
    if processor.is_identity() {
        return Ok(body.to_vec());
    }

    let mut tile = image::load_from_memory(body)
        .map_err(|e| TileError::Decode(e.to_string()))?
        .to_rgba8();

    processor.process(&mut tile);

    let mut out = Vec::new();
    DynamicImage::ImageRgba8(tile)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .map_err(|e| TileError::Encode(e.to_string()))?;
    Ok(out)
}

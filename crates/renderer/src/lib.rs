//! Visual encoding for earthquake map layers.
//!
//! Implements:
//! - Magnitude → radius and depth → color encoding
//! - Depth legend sampled from the same color function
//! - Event → circle marker transformation
//! - Tile post-processing (identity, grayscale)

pub mod encoding;
pub mod html;
pub mod legend;
pub mod marker;
pub mod tile_filter;

pub use encoding::{color_from_depth, depth_bucket_index, radius_from_magnitude, ColorBucket, DEPTH_BUCKETS};
pub use legend::{build_depth_legend, build_legend, ControlPosition, Legend, LegendEntry};
pub use marker::{transform, transform_with_style, MarkerStyle};
pub use tile_filter::{
    process_encoded, Grayscale, Identity, PostProcessorConfig, TileError, TilePostProcessor,
};

//! Common types shared across the quake-map crates.

pub mod error;
pub mod event;
pub mod layer;
pub mod tile;

pub use error::{QuakeError, QuakeResult};
pub use event::{BoundarySegment, GeoEvent, LonLat};
pub use layer::{LayerContent, LayerGroup, LayerId, LineStyle, VisualMarker};
pub use tile::{TileCoord, TileUrlTemplate, MAX_ZOOM};

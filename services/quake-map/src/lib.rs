//! Earthquake map service.
//!
//! Fetches the USGS event feed and the plate-boundary feed, turns them into
//! overlay layers over a set of switchable base maps, and serves the result as
//! a Leaflet page. The page can also be rendered once to a file.

pub mod assemble;
pub mod config;
pub mod fetch;
pub mod page;
pub mod server;
pub mod view;

pub use assemble::{LayerAssembler, BOUNDARIES_LAYER_ID, EVENTS_LAYER_ID};
pub use config::MapConfig;
pub use fetch::{FeedSource, HttpFeedSource, MemoryFeedSource};
pub use page::{render_page, OverlayModel, PendingOverlay, ViewModel};
pub use server::{create_router, run_server, ServerState};
pub use view::{BaseLayer, LayerControl, MapView, Notice, ViewComposer, Viewport};

//! HTTP server for the map page, the composed view and the tile proxy.
//!
//! Provides endpoints for:
//! - `/` the map page, served before either feed is fetched
//! - `/api/view` the same view as JSON
//! - `/api/overlays/{id}` one overlay, fetched and assembled on request
//! - `/tiles/{base}/{z}/{x}/{y}.png` upstream tiles run through a base layer's post-processor
//! - `/health`

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use metrics::counter;
use quake_common::{QuakeError, QuakeResult, TileCoord};
use renderer::process_encoded;
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use crate::config::MapConfig;
use crate::fetch::FeedSource;
use crate::page::{render_page, OverlayModel, PendingOverlay, ViewModel};
use crate::view::ViewComposer;

/// Tile proxy base for pages served by this server.
const SAME_ORIGIN: &str = "";

/// Shared state for all handlers.
pub struct ServerState {
    pub composer: ViewComposer,
    pub source: Arc<dyn FeedSource>,
}

impl ServerState {
    pub fn new(config: Arc<MapConfig>, source: Arc<dyn FeedSource>) -> QuakeResult<Self> {
        let composer = ViewComposer::new(config, Arc::clone(&source))?;
        Ok(Self { composer, source })
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
    /// Set when a feed or tile server failed rather than this service.
    pub upstream: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

fn error_response(err: QuakeError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let upstream = err.is_upstream();
    if upstream {
        warn!(error = %err, status = status.as_u16(), "Upstream request failed");
    } else if status.is_server_error() {
        error!(error = %err, status = status.as_u16(), "Request failed");
    } else {
        debug!(error = %err, status = status.as_u16(), "Request rejected");
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            status: status.as_u16(),
            upstream,
        }),
    )
        .into_response()
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/view", get(view_handler))
        .route("/api/overlays/:id", get(overlay_handler))
        .route("/tiles/:layer/:z/:x/:y", get(tile_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state))
}

pub async fn run_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    info!(address = %addr, "Starting map server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Base layers and legend only; the page fetches each overlay itself.
fn initial_model(state: &ServerState) -> QuakeResult<ViewModel> {
    let view = state.composer.initial_view()?;
    let pending = state
        .composer
        .overlay_sources()
        .iter()
        .map(|(id, title)| PendingOverlay {
            id: id.to_string(),
            title: title.to_string(),
            url: format!("/api/overlays/{}", id),
        })
        .collect();

    Ok(ViewModel::build(&view, Some(SAME_ORIGIN)).with_pending(pending))
}

async fn index_handler(Extension(state): Extension<Arc<ServerState>>) -> Response {
    let page = initial_model(&state)
        .and_then(|model| render_page(&state.composer.config().view.title, &model));

    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(e),
    }
}

async fn view_handler(Extension(state): Extension<Arc<ServerState>>) -> Response {
    match initial_model(&state) {
        Ok(model) => Json(model).into_response(),
        Err(e) => error_response(e),
    }
}

async fn overlay_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    match state.composer.build_overlay(&id).await {
        Ok(group) => {
            debug!(layer = %id, elements = group.len(), "Overlay served");
            Json(OverlayModel::from_group(&group, true)).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn tile_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Path((layer, z, x, y)): Path<(String, u32, u32, String)>,
) -> Response {
    match proxy_tile(&state, &layer, z, x, &y).await {
        Ok(png) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            png,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

async fn proxy_tile(
    state: &ServerState,
    layer: &str,
    z: u32,
    x: u32,
    y_file: &str,
) -> QuakeResult<Vec<u8>> {
    let y = y_file
        .strip_suffix(".png")
        .unwrap_or(y_file)
        .parse::<u32>()
        .map_err(|_| QuakeError::InvalidTile(format!("invalid tile row '{}'", y_file)))?;
    let coord = TileCoord::checked(z, x, y)?;

    let base = state
        .composer
        .base_layer(layer)
        .cloned()
        .ok_or_else(|| QuakeError::LayerNotFound(layer.to_string()))?;

    let url = base.upstream.expand(&coord);
    let body = state.source.fetch(&url).await?;

    let png = tokio::task::spawn_blocking(move || process_encoded(&body, base.processor()))
        .await
        .map_err(|e| QuakeError::Internal(format!("tile task failed: {}", e)))??;

    counter!("tiles_processed_total", "layer" => layer.to_string()).increment(1);
    debug!(layer = layer, tile = %coord.cache_key(), bytes = png.len(), "Tile processed");
    Ok(png)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "quake-map",
    })
}

//! Earthquake map service.
//!
//! Two modes:
//! - `render` fetches both feeds once and writes a self-contained HTML page
//! - `serve` runs the HTTP server; pages load each overlay after they are shown

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use quake_map::{
    render_page, run_server, FeedSource, HttpFeedSource, MapConfig, ServerState, ViewComposer,
    ViewModel,
};

#[derive(Parser, Debug)]
#[command(name = "quake-map")]
#[command(about = "Earthquake map with depth-colored events and plate boundaries")]
struct Args {
    /// Configuration file (defaults are used when it does not exist)
    #[arg(long, env = "QUAKE_MAP_CONFIG", default_value = "config/quake-map.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the feeds once and write the map page to a file
    Render {
        /// Output HTML file
        #[arg(short, long, default_value = "quake-map.html")]
        output: PathBuf,

        /// Base URL of a running tile proxy for post-processed base layers
        #[arg(long, env = "TILE_PROXY_URL")]
        tile_proxy_url: Option<String>,
    },

    /// Serve the map page, view API and tile proxy
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value = "8080")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = Arc::new(MapConfig::load_or_default(Some(&args.config))?);
    let source: Arc<dyn FeedSource> =
        Arc::new(HttpFeedSource::new(&config.http).context("Failed to build HTTP client")?);

    match args.command {
        Command::Render {
            output,
            tile_proxy_url,
        } => {
            info!(output = %output.display(), "Rendering map page");

            let composer = ViewComposer::new(config.clone(), source)?;
            let view = composer.compose().await?;
            let model = ViewModel::build(&view, tile_proxy_url.as_deref());
            let html = render_page(&config.view.title, &model)?;

            tokio::fs::write(&output, html)
                .await
                .with_context(|| format!("Failed to write {:?}", output))?;

            info!(
                output = %output.display(),
                overlays = model.overlays.len(),
                notices = model.notices.len(),
                "Map page written"
            );
        }
        Command::Serve { port } => {
            let state = Arc::new(ServerState::new(config, source)?);
            run_server(state, port).await?;
        }
    }

    Ok(())
}

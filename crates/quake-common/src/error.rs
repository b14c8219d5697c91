//! Error types for quake-map services.

use thiserror::Error;

/// Result type alias using QuakeError.
pub type QuakeResult<T> = Result<T, QuakeError>;

/// Primary error type for feed loading, tile proxying and view composition.
#[derive(Debug, Error)]
pub enum QuakeError {
    // === Fetch Errors ===
    #[error("Fetch failed for {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Request timeout")]
    Timeout,

    // === Data Errors ===
    #[error("Invalid feed document: {0}")]
    InvalidDocument(String),

    // === View Errors ===
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Invalid tile request: {0}")]
    InvalidTile(String),

    #[error("Tile processing failed: {0}")]
    TileProcessing(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuakeError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            QuakeError::InvalidTile(_) => 400,

            QuakeError::LayerNotFound(_) => 404,

            QuakeError::FetchFailed { .. }
            | QuakeError::UpstreamStatus { .. }
            | QuakeError::InvalidDocument(_)
            | QuakeError::TileProcessing(_) => 502,

            QuakeError::Timeout => 504,

            _ => 500,
        }
    }

    /// Whether the error came from a remote collaborator rather than from this process.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            QuakeError::FetchFailed { .. }
                | QuakeError::UpstreamStatus { .. }
                | QuakeError::Timeout
                | QuakeError::InvalidDocument(_)
        )
    }
}

impl From<std::io::Error> for QuakeError {
    fn from(err: std::io::Error) -> Self {
        QuakeError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for QuakeError {
    fn from(err: serde_json::Error) -> Self {
        QuakeError::InvalidDocument(format!("JSON error: {}", err))
    }
}

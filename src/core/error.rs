use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the distribution/repair glue layer.
/// Every module returns `Result<T, DistroError>`.
#[derive(Debug, Error)]
pub enum DistroError {
    // ── Configuration ───────────────────────────────────
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Manifest fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    // ── Repair worker ───────────────────────────────────
    #[error("Repair receiver not initialized. Call spawn_receiver() first.")]
    NotInitialized,

    #[error("Repair worker error: {0}")]
    Worker(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type DistroResult<T> = Result<T, DistroError>;

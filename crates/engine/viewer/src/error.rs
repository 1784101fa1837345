//! Error types for the viewer core

use thiserror::Error;

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Errors surfaced by the viewers
///
/// Missing poses, empty hit-test results and a not-yet-loaded model are
/// normal per-frame states and are never reported through this type.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// RON configuration could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// Model fetch or parse failed
    #[error("Failed to load model {url}: {reason}")]
    AssetLoad { url: String, reason: String },
}

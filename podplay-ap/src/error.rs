//! Error types for podplay-ap
//!
//! Transport commands never return these: playback failures are absorbed by
//! the engine and surface as session state. Errors here cover the service
//! plumbing around the engine (configuration, catalog, HTTP).

use thiserror::Error;

/// Main error type for podplay-ap
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Episode catalog could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Remote catalog request failed
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type using podplay-ap Error
pub type Result<T> = std::result::Result<T, Error>;

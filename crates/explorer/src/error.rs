//! Error types for `specscope-explorer`.

use thiserror::Error;

/// Main error type for schema exploration.
///
/// Every public operation in this crate either returns a value or fails with exactly one
/// of these kinds; no partial results accompany an error. Nothing here is fatal to the
/// process: the cache and registry remain usable after any failure.
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// The identifier is neither a saved API name nor an absolute URL.
    #[error("Invalid API identifier: {0}")]
    InvalidIdentifier(String),

    /// Network/HTTP failure while fetching a schema document.
    #[error("Fetch error: failed to fetch schema from '{url}': {message}")]
    Fetch { url: String, message: String },

    /// The response body is not well-formed JSON/YAML.
    #[error("Parse error: failed to parse schema from '{url}': {message}")]
    Parse { url: String, message: String },

    /// The body parses but is not a recognizable OpenAPI/Swagger document.
    #[error("Invalid schema: {0}")]
    Shape(String),

    /// A path, method, model, or saved API is absent. The message is preformatted by the
    /// caller (e.g. `Path '/x' not found`) and surfaced verbatim at the tool boundary.
    #[error("{0}")]
    NotFound(String),

    /// Malformed filter or pagination parameters.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Registry persistence / environment errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for exploration operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;

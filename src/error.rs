//! Beancounter error types

/// Beancounter error types
#[derive(Debug, thiserror::Error)]
pub enum BeancounterError {
    // Backend/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("no backend configured")]
    NoBackend,

    #[error("configuration error: {0}")]
    Configuration(String),

    // Export pipeline errors (exporter construction, flush, shutdown)
    #[error("telemetry pipeline error: {0}")]
    Pipeline(String),
}

/// Result type alias for Beancounter operations
pub type Result<T> = std::result::Result<T, BeancounterError>;

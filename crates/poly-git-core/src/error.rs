//! Error types for the poly-git core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the framing layer and by registry validation.
///
/// Per-request failures (unknown methods, failing tools) are never
/// represented here; they are answered on the wire.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error on the underlying byte stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The stream ended while a frame could not be completed
    #[error("framing error: {message}")]
    Framing { message: String },

    /// Two adapters expose the same tool name
    #[error("duplicate tool {name}: kept from '{kept}', also claimed by '{rejected}'")]
    ToolCollision {
        name: String,
        kept: String,
        rejected: String,
    },

    /// A tool name lies outside its adapter's namespace
    #[error("tool {name} is outside the namespace of its adapter prefix '{prefix}'")]
    ToolOutsideNamespace { name: String, prefix: String },

    /// The same prefix was registered by more than one adapter
    #[error("adapter prefix '{prefix}' is registered more than once")]
    DuplicatePrefix { prefix: String },
}

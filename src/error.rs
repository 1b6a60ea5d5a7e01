//! Error types for notation conversion and typesetting

use thiserror::Error;

use crate::notation::NotationError;

/// Result type alias for typesetting operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting or typesetting an expression
#[derive(Error, Debug)]
pub enum Error {
    /// The engine has not finished loading, failed to load, or has shut down
    #[error("Rendering engine is not available")]
    RenderingEngineUnavailable,

    /// The engine rejected the conversion (e.g. malformed TeX)
    #[error("Rendering failed: {0}")]
    RenderingFailure(String),

    /// The engine produced a result node that could not be serialized
    #[error("Rendered result could not be extracted: {0}")]
    ResultUnextractable(String),

    /// Failed to initialize the engine
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    /// Failed to read or fetch the engine script
    #[error("Failed to load engine script: {0}")]
    LoadError(String),

    /// Network error while fetching the engine script
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The expression exceeds `max_expression_bytes`
    #[error("Expression of {len} bytes exceeds the {max} byte limit")]
    InputRejected { len: usize, max: usize },

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// The maspace input could not be turned into TeX
    #[error(transparent)]
    Notation(#[from] NotationError),
}

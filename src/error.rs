//! Error types for odata-remap.

use thiserror::Error;

/// The main error type for query remapping.
#[derive(Debug, Error)]
pub enum RemapError {
    /// Failed to parse the raw OData query string.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// An expression node the translator cannot express was left in the output.
    #[error("Unsupported expression node: {0}")]
    UnsupportedNode(String),

    /// Expression nesting went past the configured bound.
    #[error("Expression nested deeper than {max} levels")]
    DepthExceeded { max: usize },

    /// Nothing survived translation, so the query cannot be sent to the backend.
    #[error("Unable to express the query for the backend: nothing left to send")]
    NoTranslatableContent,

    /// No mapping profile with this name.
    #[error("Unknown entity: '{0}'")]
    UnknownEntity(String),

    /// Backend payload is not a record, a list of records or a `value` envelope.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemapError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

/// Result type alias for remapping operations.
pub type RemapResult<T> = Result<T, RemapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RemapError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_depth_display() {
        let err = RemapError::DepthExceeded { max: 8 };
        assert_eq!(err.to_string(), "Expression nested deeper than 8 levels");
    }
}

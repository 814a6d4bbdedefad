use std::io;

use thiserror::Error;

/// Library-wide error type for wildslot operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Malformed slot definition or request.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Slot key is invalid.
    #[error(
        "Invalid slot key '{0}': segments must be non-empty and contain only letters, digits, '-' or '_', separated by '/'"
    )]
    InvalidSlotKey(String),

    /// Condition expression could not be parsed.
    #[error("Invalid condition '{condition}': {reason}")]
    InvalidCondition { condition: String, reason: String },

    /// Slot or group not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Destination key is already taken.
    #[error("Slot '{key}' already exists")]
    Conflict { key: String },

    /// Slot references nest deeper than the configured bound.
    #[error("Recursion limit of {depth} exceeded while resolving '{key}'")]
    Recursion { key: String, depth: usize },

    /// YAML slot file could not be read.
    #[error("Failed to parse {path}: {details}")]
    YamlParseError { path: String, details: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// Provide an `io::ErrorKind`-like view for callers mapping errors to exit codes.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::Configuration(_)
            | AppError::Validation(_)
            | AppError::InvalidSlotKey(_)
            | AppError::InvalidCondition { .. }
            | AppError::YamlParseError { .. }
            | AppError::TomlParseError(_)
            | AppError::Json(_) => io::ErrorKind::InvalidInput,
            AppError::NotFound(_) => io::ErrorKind::NotFound,
            AppError::Conflict { .. } => io::ErrorKind::AlreadyExists,
            AppError::Recursion { .. } => io::ErrorKind::Other,
        }
    }
}

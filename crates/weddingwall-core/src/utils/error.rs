//! WeddingWall error handling.
//!
//! Defines the error type shared by the core, the command layer and the FFI.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Local cache store failure
    #[error("cache store error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection failure or any other transport-level problem
    #[error("network failure: {0}")]
    Network(String),

    /// Request did not complete within its bound
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Valid response with zero items
    #[error("empty result")]
    EmptyResult,

    /// Response body could not be parsed or failed validation
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Navigation index out of range
    #[error("invalid navigation: index {index} out of range for {len} photos")]
    InvalidNavigation { index: usize, len: usize },

    /// Missing or rejected session
    #[error("not authenticated")]
    Unauthorized,

    /// Authenticated but not allowed
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// Upload rejected before it was sent
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// Unsupported image format
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Configuration problem
    #[error("config error: {0}")]
    Config(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::MalformedResponse(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Copyable summary of an [`AppError`], used in refresh outcomes and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Network,
    Timeout,
    EmptyResult,
    MalformedResponse,
    InvalidNavigation,
    Unauthorized,
    Http,
    Storage,
    Other,
}

impl AppError {
    /// Summarize this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Network(_) => ErrorKind::Network,
            AppError::Timeout(_) => ErrorKind::Timeout,
            AppError::EmptyResult => ErrorKind::EmptyResult,
            AppError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            AppError::InvalidNavigation { .. } => ErrorKind::InvalidNavigation,
            AppError::Unauthorized => ErrorKind::Unauthorized,
            AppError::Forbidden(_) | AppError::NotFound(_) | AppError::Server { .. } => {
                ErrorKind::Http
            }
            AppError::Database(_) | AppError::Io(_) => ErrorKind::Storage,
            _ => ErrorKind::Other,
        }
    }
}

/// Error shape returned by the command layer and the FFI.
#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        let code = match &err {
            AppError::Database(_) => "E_CACHE",
            AppError::Io(_) => "E_IO_ERROR",
            AppError::Network(_) => "E_NETWORK",
            AppError::Timeout(_) => "E_TIMEOUT",
            AppError::EmptyResult => "E_EMPTY",
            AppError::MalformedResponse(_) => "E_MALFORMED",
            AppError::InvalidNavigation { .. } => "E_NAVIGATION",
            AppError::Unauthorized => "E_UNAUTHORIZED",
            AppError::Forbidden(_) => "E_FORBIDDEN",
            AppError::NotFound(_) => "E_NOT_FOUND",
            AppError::Server { .. } => "E_SERVER",
            AppError::InvalidUpload(_) => "E_INVALID_UPLOAD",
            AppError::UnsupportedFormat(_) => "E_UNSUPPORTED_FORMAT",
            AppError::Config(_) => "E_CONFIG",
            AppError::General(_) => "E_GENERAL",
        };

        CommandError {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

/// Result alias used throughout the crate.
pub type AppResult<T> = Result<T, AppError>;

//! Error types for the Bookgraph Server
//!
//! This module contains the error types used throughout the server.

use thiserror::Error;
use bookgraph_store::GraphStoreError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage error
    #[error("Store error: {0}")]
    StoreError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl From<GraphStoreError> for ServerError {
    fn from(err: GraphStoreError) -> Self {
        if err.is_not_found() {
            ServerError::NotFound(err.to_string())
        } else if err.is_invalid_input() {
            ServerError::ValidationError(err.to_string())
        } else {
            ServerError::StoreError(err.to_string())
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::InternalError(format!("IO error: {}", err))
    }
}

impl ServerError {
    /// Check if the error was caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServerError::NotFound(_) | ServerError::ValidationError(_))
    }
}

//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use veritas_core::{AuthError, LibraryError, LoadError};

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A login, registration or federated sign-in did not succeed.
    #[error("Authentication Error: {0}")]
    Auth(#[from] AuthError),

    /// A category listing could not be loaded.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// A library search or admin operation failed.
    #[error("Library Error: {0}")]
    Library(#[from] LibraryError),

    /// Represents an error from the underlying HTTP client library.
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g. reading a file to upload).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

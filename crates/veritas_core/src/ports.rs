//! crates/veritas_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core logic depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! controllers independent of the HTTP client and the identity provider in use.

use async_trait::async_trait;

use crate::domain::{
    CategoryQuery, CategoryRecord, ContentPatch, LibraryEntry, ProviderAccount, SearchFilter,
    UploadReceipt, UploadRequest,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the underlying HTTP stack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs in with an email and password. An unknown account is reported as
    /// `PortError::NotFound`.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> PortResult<ProviderAccount>;

    /// Creates a new email/password account and returns it signed in.
    async fn create_account(&self, email: &str, password: &str) -> PortResult<ProviderAccount>;

    /// Exchanges an identity token from an external sign-in flow for a session.
    async fn sign_in_with_federated_token(&self, id_token: &str) -> PortResult<ProviderAccount>;
}

#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Fetches the raw listing for one category and content type.
    /// Non-2xx responses are reported as `PortError::Status`.
    async fn fetch_category(&self, query: &CategoryQuery) -> PortResult<Vec<CategoryRecord>>;
}

#[async_trait]
pub trait LibraryService: Send + Sync {
    async fn search(&self, filter: &SearchFilter) -> PortResult<Vec<LibraryEntry>>;

    async fn upload(&self, token: &str, request: &UploadRequest) -> PortResult<UploadReceipt>;

    async fn update(&self, token: &str, item_id: i64, patch: &ContentPatch) -> PortResult<()>;

    async fn delete(&self, token: &str, item_id: i64) -> PortResult<()>;
}

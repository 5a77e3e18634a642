pub mod auth;
pub mod catalog;
pub mod domain;
pub mod library;
pub mod ports;
pub mod role;

#[cfg(test)]
mod mocks;

pub use auth::{confirm_password, AdminPolicy, AuthController, AuthError, MIN_PASSWORD_LEN};
pub use catalog::{CategoryLoader, LoadError, ViewState};
pub use domain::{
    CategoryQuery, CategoryRecord, ContentItem, ContentPatch, ContentType, Identity,
    LibraryEntry, ProviderAccount, Role, SearchFilter, Session, SessionStatus, UploadReceipt,
    UploadRequest,
};
pub use library::{Library, LibraryError};
pub use ports::{ContentBackend, IdentityProvider, LibraryService, PortError, PortResult};

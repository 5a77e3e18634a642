//! crates/veritas_core/src/library.rs
//!
//! Browsing and administering the general library listing.
//!
//! The admin checks here only spare the backend requests that are bound to fail;
//! the backend remains responsible for authorising every privileged call.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    ContentPatch, LibraryEntry, Role, SearchFilter, Session, UploadReceipt, UploadRequest,
};
use crate::ports::{LibraryService, PortError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("An authenticated administrator session is required")]
    NotAuthorized,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Rejected by backend: {0}")]
    Rejected(String),
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl From<PortError> for LibraryError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Transport(reason) => LibraryError::Transport(reason),
            PortError::Status(code) => LibraryError::Rejected(format!("backend returned status {code}")),
            PortError::NotFound(reason)
            | PortError::Rejected(reason)
            | PortError::Unexpected(reason) => LibraryError::Rejected(reason),
        }
    }
}

pub struct Library {
    service: Arc<dyn LibraryService>,
}

impl Library {
    pub fn new(service: Arc<dyn LibraryService>) -> Self {
        Self { service }
    }

    pub async fn search(&self, filter: SearchFilter) -> Result<Vec<LibraryEntry>, LibraryError> {
        let filter = SearchFilter {
            query: non_blank(filter.query),
            category: non_blank(filter.category),
        };
        Ok(self.service.search(&filter).await?)
    }

    pub async fn upload(
        &self,
        session: &Session,
        request: UploadRequest,
    ) -> Result<UploadReceipt, LibraryError> {
        let token = admin_credential(session)?;
        for (field, value) in [
            ("title", &request.title),
            ("category", &request.category),
            ("file name", &request.file_name),
        ] {
            if value.trim().is_empty() {
                return Err(LibraryError::InvalidInput(format!("{field} must not be empty")));
            }
        }
        if request.data.is_empty() {
            return Err(LibraryError::InvalidInput("file is empty".to_string()));
        }

        let receipt = self.service.upload(token, &request).await?;
        info!(file_id = %receipt.file_id, category = %request.category, "Content uploaded");
        Ok(receipt)
    }

    pub async fn update(
        &self,
        session: &Session,
        item_id: i64,
        patch: ContentPatch,
    ) -> Result<(), LibraryError> {
        let token = admin_credential(session)?;
        let patch = ContentPatch {
            title: non_blank(patch.title),
            category: non_blank(patch.category),
        };
        if patch.is_empty() {
            return Err(LibraryError::InvalidInput(
                "nothing to change, supply a title or category".to_string(),
            ));
        }

        self.service.update(token, item_id, &patch).await?;
        info!(item_id, "Content updated");
        Ok(())
    }

    pub async fn delete(&self, session: &Session, item_id: i64) -> Result<(), LibraryError> {
        let token = admin_credential(session)?;
        self.service.delete(token, item_id).await?;
        info!(item_id, "Content deleted");
        Ok(())
    }
}

fn admin_credential(session: &Session) -> Result<&str, LibraryError> {
    match session.identity() {
        Some(identity) if identity.role == Role::Admin => Ok(identity.credential()),
        _ => Err(LibraryError::NotAuthorized),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

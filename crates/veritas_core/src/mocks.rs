//! Mock implementations of the service ports for unit tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::{
    CategoryQuery, CategoryRecord, ContentPatch, LibraryEntry, ProviderAccount, SearchFilter,
    UploadReceipt, UploadRequest,
};
use crate::ports::{ContentBackend, IdentityProvider, LibraryService, PortResult};

mock! {
    pub Identity {}

    #[async_trait]
    impl IdentityProvider for Identity {
        async fn sign_in_with_password(&self, email: &str, password: &str)
            -> PortResult<ProviderAccount>;
        async fn create_account(&self, email: &str, password: &str) -> PortResult<ProviderAccount>;
        async fn sign_in_with_federated_token(&self, id_token: &str) -> PortResult<ProviderAccount>;
    }
}

mock! {
    pub Backend {}

    #[async_trait]
    impl ContentBackend for Backend {
        async fn fetch_category(&self, query: &CategoryQuery) -> PortResult<Vec<CategoryRecord>>;
    }
}

mock! {
    pub Library {}

    #[async_trait]
    impl LibraryService for Library {
        async fn search(&self, filter: &SearchFilter) -> PortResult<Vec<LibraryEntry>>;
        async fn upload(&self, token: &str, request: &UploadRequest) -> PortResult<UploadReceipt>;
        async fn update(&self, token: &str, item_id: i64, patch: &ContentPatch) -> PortResult<()>;
        async fn delete(&self, token: &str, item_id: i64) -> PortResult<()>;
    }
}

pub fn account(user_id: &str, email: &str) -> ProviderAccount {
    ProviderAccount {
        user_id: user_id.to_string(),
        email: Some(email.to_string()),
        id_token: format!("token-{user_id}"),
    }
}

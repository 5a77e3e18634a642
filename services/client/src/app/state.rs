//! services/client/src/app/state.rs
//!
//! Defines the application's shared state: the two controllers, the library
//! facade and the configuration they were built from.

use std::sync::Arc;

use veritas_core::{AuthController, CategoryLoader, Library};

use crate::adapters::{http_client, IdentityToolkitAdapter, VeritasApiAdapter};
use crate::config::Config;
use crate::error::ClientError;

/// Created once at startup and handed to every command.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthController>,
    pub loader: Arc<CategoryLoader>,
    pub library: Arc<Library>,
}

impl AppState {
    /// Wires the HTTP adapters into the core controllers.
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let client = http_client(config.http_timeout)?;

        let identity = Arc::new(IdentityToolkitAdapter::new(
            client.clone(),
            config.identity_base_url.clone(),
            config.identity_api_key.clone(),
            config.federated_provider.clone(),
        ));
        let api = Arc::new(VeritasApiAdapter::new(client, config.api_base_url.clone()));

        let auth = Arc::new(AuthController::new(identity, config.admin_policy.clone()));
        let loader = Arc::new(CategoryLoader::new(api.clone()));
        let library = Arc::new(Library::new(api));

        Ok(Self {
            config: Arc::new(config),
            auth,
            loader,
            library,
        })
    }
}

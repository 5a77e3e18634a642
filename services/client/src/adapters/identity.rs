//! services/client/src/adapters/identity.rs
//!
//! This module contains the adapter for an Identity Toolkit style REST identity
//! provider (email/password accounts plus federated token exchange).
//! It implements the `IdentityProvider` port from the core crate.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;
use veritas_core::ports::{IdentityProvider, PortError, PortResult};
use veritas_core::ProviderAccount;

use super::describe_transport;

/// Redirect URI sent with federated exchanges; the provider requires one even
/// when the token was obtained out of band.
const FEDERATED_REQUEST_URI: &str = "http://localhost";

/// Provider error code for a sign-in against an unknown email.
const EMAIL_NOT_FOUND: &str = "EMAIL_NOT_FOUND";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct IdentityToolkitAdapter {
    client: Client,
    base_url: Url,
    api_key: String,
    provider_id: String,
}

impl IdentityToolkitAdapter {
    pub fn new(client: Client, base_url: Url, api_key: String, provider_id: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            provider_id,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}",
            self.base_url.as_str().trim_end_matches('/'),
            method
        )
    }

    /// Form-encodes the token and provider id for the `postBody` field.
    fn federated_post_body(&self, id_token: &str) -> String {
        let mut scratch = self.base_url.clone();
        scratch
            .query_pairs_mut()
            .clear()
            .append_pair("id_token", id_token)
            .append_pair("providerId", &self.provider_id);
        scratch.query().unwrap_or_default().to_string()
    }

    async fn call<B: Serialize + Sync>(&self, method: &str, body: &B) -> PortResult<ProviderAccount> {
        debug!(method, "Calling identity provider");
        let response = self
            .client
            .post(self.endpoint(method))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| PortError::Transport(describe_transport(&e)))?;

        let status = response.status();
        if status.is_success() {
            let account: AccountRecord = response
                .json()
                .await
                .map_err(|e| PortError::Transport(describe_transport(&e)))?;
            return Ok(account.to_domain());
        }

        // Error bodies are best effort; fall back to the bare status.
        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => Err(classify_error(&envelope.error.message)),
            Err(_) => Err(PortError::Status(status.as_u16())),
        }
    }
}

/// Error messages look like `CODE` or `CODE : human readable detail`.
fn classify_error(message: &str) -> PortError {
    let code = message.split(" : ").next().unwrap_or(message).trim();
    if code == EMAIL_NOT_FOUND {
        PortError::NotFound(message.to_string())
    } else {
        PortError::Rejected(message.to_string())
    }
}

//=========================================================================================
// Wire Structs
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FederatedRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}
impl AccountRecord {
    fn to_domain(self) -> ProviderAccount {
        ProviderAccount {
            user_id: self.local_id,
            email: self.email.filter(|email| !email.is_empty()),
            id_token: self.id_token,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

//=========================================================================================
// `IdentityProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityProvider for IdentityToolkitAdapter {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> PortResult<ProviderAccount> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.call("signInWithPassword", &body).await
    }

    async fn create_account(&self, email: &str, password: &str) -> PortResult<ProviderAccount> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.call("signUp", &body).await
    }

    async fn sign_in_with_federated_token(&self, id_token: &str) -> PortResult<ProviderAccount> {
        let body = FederatedRequest {
            post_body: self.federated_post_body(id_token),
            request_uri: FEDERATED_REQUEST_URI,
            return_idp_credential: true,
            return_secure_token: true,
        };
        self.call("signInWithIdp", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http_client;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn adapter(base: &str) -> IdentityToolkitAdapter {
        IdentityToolkitAdapter::new(
            http_client(Duration::from_secs(5)).expect("client builds"),
            Url::parse(base).expect("valid url"),
            "test-key".to_string(),
            "google.com".to_string(),
        )
    }

    #[tokio::test]
    async fn password_sign_in_returns_account() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::Json(json!({
                "email": "a@b.com",
                "password": "secret1",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_body(r#"{"localId":"uid-1","email":"a@b.com","idToken":"tok"}"#)
            .create_async()
            .await;

        let account = adapter(&server.url())
            .sign_in_with_password("a@b.com", "secret1")
            .await
            .expect("sign-in succeeds");

        mock.assert_async().await;
        assert_eq!(account.user_id, "uid-1");
        assert_eq!(account.email.as_deref(), Some("a@b.com"));
        assert_eq!(account.id_token, "tok");
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND"}}"#)
            .create_async()
            .await;

        let result = adapter(&server.url())
            .sign_in_with_password("admin@veritas.com", "Admin@123456")
            .await;

        assert_eq!(result, Err(PortError::NotFound("EMAIL_NOT_FOUND".to_string())));
    }

    #[tokio::test]
    async fn other_provider_errors_are_rejections() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/accounts:signUp")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(
                r#"{"error":{"code":400,"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}"#,
            )
            .create_async()
            .await;

        let result = adapter(&server.url()).create_account("a@b.com", "123").await;

        assert!(matches!(result, Err(PortError::Rejected(message)) if message.starts_with("WEAK_PASSWORD")));
    }

    #[tokio::test]
    async fn unreadable_error_body_falls_back_to_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/accounts:signUp")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let result = adapter(&server.url()).create_account("a@b.com", "secret1").await;

        assert_eq!(result, Err(PortError::Status(503)));
    }

    #[tokio::test]
    async fn federated_exchange_posts_token_and_provider() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/accounts:signInWithIdp")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "postBody": "id_token=google-token&providerId=google.com",
                "requestUri": "http://localhost",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_body(r#"{"localId":"fed-1","email":"","idToken":"tok"}"#)
            .create_async()
            .await;

        let account = adapter(&server.url())
            .sign_in_with_federated_token("google-token")
            .await
            .expect("exchange succeeds");

        mock.assert_async().await;
        assert_eq!(account.user_id, "fed-1");
        assert_eq!(account.email, None);
    }

    #[test]
    fn federated_post_body_escapes_reserved_characters() {
        let adapter = adapter("https://identitytoolkit.googleapis.com/v1?stale=1");
        assert_eq!(
            adapter.federated_post_body("a&b=c"),
            "id_token=a%26b%3Dc&providerId=google.com"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let adapter = adapter("https://identitytoolkit.googleapis.com/v1");
        assert_eq!(
            adapter.endpoint("signUp"),
            "https://identitytoolkit.googleapis.com/v1/accounts:signUp"
        );
    }
}

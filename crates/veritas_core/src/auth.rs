//! crates/veritas_core/src/auth.rs
//!
//! The session/auth controller. It owns the one `Session` of the running client
//! and is the only code allowed to change it.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{Identity, ProviderAccount, Session};
use crate::ports::{IdentityProvider, PortError};
use crate::role::{self, Enrollment};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Rejected by backend: {0}")]
    BackendRejected(String),
    #[error("Transport failure: {0}")]
    TransportFailure(String),
    #[error("An authentication attempt is already in progress")]
    AlreadyInProgress,
}

impl From<PortError> for AuthError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Transport(reason) => AuthError::TransportFailure(reason),
            PortError::NotFound(reason)
            | PortError::Rejected(reason)
            | PortError::Unexpected(reason) => AuthError::BackendRejected(reason),
            PortError::Status(code) => {
                AuthError::BackendRejected(format!("identity provider returned status {code}"))
            }
        }
    }
}

//=========================================================================================
// Admin policy
//=========================================================================================

/// Externally configured administrator bootstrap values. Every field is optional;
/// an unset field disables the behaviour that depends on it.
#[derive(Clone, Default)]
pub struct AdminPolicy {
    admin_email: Option<String>,
    admin_password: Option<String>,
    enrollment_code: Option<String>,
}

impl AdminPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin_credentials(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.admin_email = Some(email.into());
        self.admin_password = Some(password.into());
        self
    }

    pub fn with_enrollment_code(mut self, code: impl Into<String>) -> Self {
        self.enrollment_code = Some(code.into());
        self
    }

    fn is_admin_pair(&self, email: &str, password: &str) -> bool {
        matches!(
            (&self.admin_email, &self.admin_password),
            (Some(admin_email), Some(admin_password))
                if admin_email == email && admin_password == password
        )
    }

    fn enrollment(&self, supplied: Option<&str>) -> Enrollment {
        match (&self.enrollment_code, supplied) {
            (Some(expected), Some(code)) if !code.is_empty() && expected == code => {
                Enrollment::Granted
            }
            _ => Enrollment::Denied,
        }
    }
}

impl fmt::Debug for AdminPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminPolicy")
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("enrollment_code", &self.enrollment_code.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

//=========================================================================================
// Input validation
//=========================================================================================

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

fn validate_new_password(password: &str) -> Result<(), AuthError> {
    require("password", password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Checks a registration password against its confirmation field.
pub fn confirm_password(password: &str, confirmation: &str) -> Result<(), AuthError> {
    if password != confirmation {
        return Err(AuthError::InvalidInput("passwords don't match".to_string()));
    }
    Ok(())
}

//=========================================================================================
// Controller
//=========================================================================================

struct SessionSlot {
    session: Session,
    /// Bumped by every new attempt and by sign-out. An attempt only writes its
    /// result back while the generation it started with is still current.
    generation: u64,
}

pub struct AuthController {
    provider: Arc<dyn IdentityProvider>,
    policy: AdminPolicy,
    slot: Mutex<SessionSlot>,
}

impl AuthController {
    pub fn new(provider: Arc<dyn IdentityProvider>, policy: AdminPolicy) -> Self {
        Self {
            provider,
            policy,
            slot: Mutex::new(SessionSlot {
                session: Session::Unauthenticated,
                generation: 0,
            }),
        }
    }

    /// A snapshot of the current session.
    pub async fn session(&self) -> Session {
        self.slot.lock().await.session.clone()
    }

    /// Creates an email/password account. The role is Admin only when `admin_code`
    /// matches the configured enrollment secret.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        admin_code: Option<&str>,
    ) -> Result<Session, AuthError> {
        let email = require("email", email)?;
        validate_new_password(password)?;

        let ticket = self.begin().await?;
        let enrollment = self.policy.enrollment(admin_code);
        let outcome = self
            .provider
            .create_account(email, password)
            .await
            .map(|account| into_identity(account, email, enrollment))
            .map_err(AuthError::from);
        self.finish(ticket, outcome).await
    }

    /// Signs in with email and password. The configured administrator pair is
    /// provisioned on first use.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let raw_email = email;
        let email = require("email", email)?;
        require("password", password)?;

        let ticket = self.begin().await?;
        // The administrator pair must match exactly, padding included.
        let account = if self.policy.is_admin_pair(raw_email, password) {
            self.admin_sign_in(email, password).await
        } else {
            self.provider.sign_in_with_password(email, password).await
        };
        let outcome = account
            .map(|account| into_identity(account, email, Enrollment::NotOffered))
            .map_err(AuthError::from);
        self.finish(ticket, outcome).await
    }

    pub async fn sign_in_with_federated_token(&self, id_token: &str) -> Result<Session, AuthError> {
        let id_token = require("identity token", id_token)?;

        let ticket = self.begin().await?;
        let outcome = self
            .provider
            .sign_in_with_federated_token(id_token)
            .await
            .map(|account| {
                let role = role::classify(account.email.as_deref(), Enrollment::NotOffered);
                Identity::new(account.user_id, account.email, role, account.id_token)
            })
            .map_err(AuthError::from);
        self.finish(ticket, outcome).await
    }

    /// Drops the current session. Any attempt still in flight will not overwrite it.
    pub async fn sign_out(&self) {
        let mut slot = self.slot.lock().await;
        slot.generation += 1;
        if let Some(user_id) = slot.session.user_id() {
            info!(user_id, "Signed out");
        }
        slot.session = Session::Unauthenticated;
    }

    async fn admin_sign_in(&self, email: &str, password: &str) -> Result<ProviderAccount, PortError> {
        match self.provider.sign_in_with_password(email, password).await {
            Err(PortError::NotFound(_)) => {
                debug!("Administrator account missing, provisioning it");
                self.provider.create_account(email, password).await?;
                self.provider.sign_in_with_password(email, password).await
            }
            other => other,
        }
    }

    async fn begin(&self) -> Result<u64, AuthError> {
        let mut slot = self.slot.lock().await;
        if slot.session == Session::Authenticating {
            return Err(AuthError::AlreadyInProgress);
        }
        slot.generation += 1;
        slot.session = Session::Authenticating;
        Ok(slot.generation)
    }

    async fn finish(
        &self,
        ticket: u64,
        outcome: Result<Identity, AuthError>,
    ) -> Result<Session, AuthError> {
        let mut slot = self.slot.lock().await;
        let current = slot.generation == ticket;
        if !current {
            debug!("Session changed while authenticating, keeping the newer state");
        }

        match outcome {
            Ok(identity) => {
                info!(user_id = %identity.user_id, role = ?identity.role, "Authenticated");
                let session = Session::Authenticated(identity);
                if current {
                    slot.session = session.clone();
                }
                Ok(session)
            }
            Err(error) => {
                warn!(%error, "Authentication failed");
                if current {
                    slot.session = Session::Failed(error.clone());
                }
                Err(error)
            }
        }
    }
}

/// Builds the session identity, preferring the email the provider reports.
fn into_identity(account: ProviderAccount, submitted_email: &str, enrollment: Enrollment) -> Identity {
    let email = account
        .email
        .unwrap_or_else(|| submitted_email.to_string());
    let role = role::classify(Some(email.as_str()), enrollment);
    Identity::new(account.user_id, Some(email), role, account.id_token)
}

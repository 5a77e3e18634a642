//! crates/veritas_core/src/role.rs
//!
//! The one rule that decides whether a session is an administrator.
//!
//! Every authentication path goes through [`classify`]. The rule is client-side
//! and trivially spoofable; it should be replaced by a role claim issued by the
//! backend once one exists.

use crate::domain::Role;

/// Marker the email rule looks for.
pub const ADMIN_MARKER: &str = "admin";

/// Whether an enrollment code took part in the authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrollment {
    /// No code was offered; the email decides.
    NotOffered,
    /// A code was offered and matched the configured secret.
    Granted,
    /// A code was expected but missing or wrong.
    Denied,
}

pub fn classify(email: Option<&str>, enrollment: Enrollment) -> Role {
    match enrollment {
        Enrollment::Granted => Role::Admin,
        Enrollment::Denied => Role::Standard,
        Enrollment::NotOffered => match email {
            Some(email) if email.contains(ADMIN_MARKER) => Role::Admin,
            _ => Role::Standard,
        },
    }
}

//! crates/veritas_core/src/domain.rs
//!
//! Defines the pure, core data structures for the library client.
//! These structs are independent of any HTTP client or serialization format.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, NaiveDate};

use crate::auth::AuthError;

//=========================================================================================
// Session
//=========================================================================================

/// The privilege level of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Standard,
}

/// Who is signed in. Only exists inside an authenticated session, so the user id
/// and role are always present together.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
    credential: String,
}

impl Identity {
    pub fn new(user_id: String, email: Option<String>, role: Role, credential: String) -> Self {
        Self {
            user_id,
            email,
            role,
            credential,
        }
    }

    /// The backend session credential, sent as a bearer token on admin calls.
    pub fn credential(&self) -> &str {
        &self.credential
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// The authentication state of the running client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated(Identity),
    Failed(AuthError),
}

/// The bare status of a [`Session`], without the data its variants carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Failed,
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        match self {
            Session::Unauthenticated => SessionStatus::Unauthenticated,
            Session::Authenticating => SessionStatus::Authenticating,
            Session::Authenticated(_) => SessionStatus::Authenticated,
            Session::Failed(_) => SessionStatus::Failed,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity().map(|identity| identity.user_id.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.identity().map(|identity| identity.role)
    }

    pub fn last_error(&self) -> Option<&AuthError> {
        match self {
            Session::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

/// Account data handed back by the identity provider after any successful sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderAccount {
    pub user_id: String,
    pub email: Option<String>,
    pub id_token: String,
}

impl fmt::Debug for ProviderAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderAccount")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("id_token", &"<redacted>")
            .finish()
    }
}

//=========================================================================================
// Content
//=========================================================================================

/// The three kinds of media the library holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Document,
    Audio,
    Image,
}

impl ContentType {
    /// The lowercase token the backend expects in category URLs.
    pub fn wire_token(self) -> &'static str {
        match self {
            ContentType::Document => "pdf",
            ContentType::Audio => "audio",
            ContentType::Image => "image",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentType::Document => "Document",
            ContentType::Audio => "Audio",
            ContentType::Image => "Image",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown content type '{0}', expected one of document, pdf, audio, image")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" | "pdf" => Ok(ContentType::Document),
            "audio" => Ok(ContentType::Audio),
            "image" => Ok(ContentType::Image),
            _ => Err(UnknownContentType(s.to_string())),
        }
    }
}

/// Input to a category fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryQuery {
    pub category_name: String,
    pub content_type: ContentType,
}

impl CategoryQuery {
    pub fn new(category_name: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            category_name: category_name.into(),
            content_type,
        }
    }

    /// A query can only be sent when it names a category.
    pub fn is_valid(&self) -> bool {
        !self.category_name.trim().is_empty()
    }
}

/// One element of a category listing as the backend sent it, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub upload_date: String,
}

/// A single piece of library content. Built by the category loader and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub id: i64,
    pub title: String,
    pub url: String,
    /// Empty when the backend did not say.
    pub uploaded_at: String,
    pub content_type: ContentType,
    pub category: String,
}

impl ContentItem {
    /// Parses `uploaded_at` as a plain date or an RFC 3339 timestamp.
    pub fn uploaded_on(&self) -> Option<NaiveDate> {
        let raw = self.uploaded_at.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
    }
}

//=========================================================================================
// Library administration
//=========================================================================================

/// A record from the general library listing (`GET /content`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub url: String,
    pub category: String,
    pub uploaded_by: String,
}

/// Optional search text and category filter for the library listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub category: Option<String>,
}

/// A new file for an administrator to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub title: String,
    pub category: String,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub message: String,
    pub file_id: String,
}

/// Fields to change on an existing item. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub category: Option<String>,
}

impl ContentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.category.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_maps_to_wire_tokens() {
        assert_eq!(ContentType::Audio.wire_token(), "audio");
        assert_eq!(ContentType::Image.wire_token(), "image");
        assert_eq!(ContentType::Document.wire_token(), "pdf");
    }

    #[test]
    fn content_type_parses_labels_and_tokens() {
        assert_eq!("AUDIO".parse::<ContentType>(), Ok(ContentType::Audio));
        assert_eq!("pdf".parse::<ContentType>(), Ok(ContentType::Document));
        assert_eq!("Document".parse::<ContentType>(), Ok(ContentType::Document));
        assert_eq!(" image ".parse::<ContentType>(), Ok(ContentType::Image));
        assert!("video".parse::<ContentType>().is_err());
    }

    #[test]
    fn query_without_category_is_invalid() {
        assert!(!CategoryQuery::new("", ContentType::Audio).is_valid());
        assert!(!CategoryQuery::new("   ", ContentType::Audio).is_valid());
        assert!(CategoryQuery::new("Sermons", ContentType::Audio).is_valid());
    }

    #[test]
    fn uploaded_on_accepts_dates_and_timestamps() {
        let mut item = ContentItem {
            id: 1,
            title: "A".into(),
            url: "u1".into(),
            uploaded_at: "2024-01-01".into(),
            content_type: ContentType::Audio,
            category: "Sermons".into(),
        };
        assert_eq!(item.uploaded_on(), NaiveDate::from_ymd_opt(2024, 1, 1));

        item.uploaded_at = "2024-03-05T10:00:00Z".into();
        assert_eq!(item.uploaded_on(), NaiveDate::from_ymd_opt(2024, 3, 5));

        item.uploaded_at = String::new();
        assert_eq!(item.uploaded_on(), None);

        item.uploaded_at = "last tuesday".into();
        assert_eq!(item.uploaded_on(), None);
    }

    #[test]
    fn session_accessors_follow_status() {
        let identity = Identity::new(
            "uid-1".into(),
            Some("admin@veritas.com".into()),
            Role::Admin,
            "token".into(),
        );
        let session = Session::Authenticated(identity);
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(session.user_id(), Some("uid-1"));
        assert!(session.is_admin());
        assert!(session.last_error().is_none());

        let failed = Session::Failed(AuthError::AlreadyInProgress);
        assert_eq!(failed.user_id(), None);
        assert_eq!(failed.role(), None);
        assert_eq!(failed.last_error(), Some(&AuthError::AlreadyInProgress));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let identity = Identity::new("uid".into(), None, Role::Standard, "secret-token".into());
        assert!(!format!("{identity:?}").contains("secret-token"));
    }
}

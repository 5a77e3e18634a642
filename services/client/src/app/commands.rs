//! services/client/src/app/commands.rs
//!
//! The operations the command-line front end exposes, and the plain-text
//! rendering of their results.

use std::fmt::Write as _;
use std::path::Path;

use bytes::Bytes;
use tracing::info;
use veritas_core::{
    CategoryQuery, ContentPatch, ContentType, LibraryEntry, LibraryError, SearchFilter, Session,
    UploadRequest, ViewState,
};

use crate::app::state::AppState;
use crate::error::ClientError;

//=========================================================================================
// Operations
//=========================================================================================

/// Loads one category and renders the resulting view-state.
pub async fn browse(
    state: &AppState,
    category: &str,
    content_type: ContentType,
) -> Result<String, ClientError> {
    state
        .loader
        .load(CategoryQuery::new(category, content_type))
        .await;
    match state.loader.state() {
        ViewState::Failed(error) => Err(error.into()),
        view => Ok(render_view(&view)),
    }
}

pub async fn search(state: &AppState, filter: SearchFilter) -> Result<String, ClientError> {
    let entries = state.library.search(filter).await?;
    Ok(render_entries(&entries))
}

/// Logs in and insists on an administrator session.
pub async fn admin_session(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<Session, ClientError> {
    let session = state.auth.login(email, password).await?;
    if !session.is_admin() {
        return Err(LibraryError::NotAuthorized.into());
    }
    Ok(session)
}

pub async fn upload(
    state: &AppState,
    session: &Session,
    title: String,
    category: String,
    path: &Path,
    mime_type: Option<String>,
) -> Result<String, ClientError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ClientError::Internal(format!("{} has no file name", path.display())))?
        .to_string();
    let data = Bytes::from(tokio::fs::read(path).await?);
    let mime_type = mime_type.or_else(|| guess_mime(&file_name).map(str::to_string));
    info!(file = %file_name, bytes = data.len(), "Uploading file");

    let receipt = state
        .library
        .upload(
            session,
            UploadRequest {
                title,
                category,
                file_name,
                mime_type,
                data,
            },
        )
        .await?;
    Ok(format!("{} (file id {})", receipt.message, receipt.file_id))
}

pub async fn edit(
    state: &AppState,
    session: &Session,
    item_id: i64,
    patch: ContentPatch,
) -> Result<String, ClientError> {
    state.library.update(session, item_id, patch).await?;
    Ok(format!("Updated item {item_id}"))
}

pub async fn delete(state: &AppState, session: &Session, item_id: i64) -> Result<String, ClientError> {
    state.library.delete(session, item_id).await?;
    Ok(format!("Deleted item {item_id}"))
}

/// MIME type for the file extensions the library accepts.
pub fn guess_mime(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "mp3" => Some("audio/mpeg"),
        "m4a" => Some("audio/mp4"),
        "wav" => Some("audio/wav"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

//=========================================================================================
// Rendering
//=========================================================================================

pub fn render_session(session: &Session) -> String {
    match session {
        Session::Unauthenticated => "Signed out".to_string(),
        Session::Authenticating => "Signing in...".to_string(),
        Session::Authenticated(identity) => format!(
            "Signed in as {} ({:?}){}",
            identity.email.as_deref().unwrap_or(&identity.user_id),
            identity.role,
            if session.is_admin() {
                ", admin dashboard available"
            } else {
                ""
            }
        ),
        Session::Failed(error) => format!("Sign-in failed: {error}"),
    }
}

pub fn render_view(view: &ViewState) -> String {
    match view {
        ViewState::Idle => String::new(),
        ViewState::Loading(query) => format!("Loading {}...", query.category_name),
        ViewState::Empty => "No content available".to_string(),
        ViewState::Failed(error) => error.to_string(),
        ViewState::Populated(items) => {
            let mut out = String::new();
            for item in items {
                let _ = write!(out, "{:>5}  {}  [{}]", item.id, item.title, item.content_type);
                if let Some(day) = item.uploaded_on() {
                    let _ = write!(out, "  {day}");
                }
                let _ = writeln!(out, "\n       {}", item.url);
            }
            out
        }
    }
}

pub fn render_entries(entries: &[LibraryEntry]) -> String {
    if entries.is_empty() {
        return "No content available".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{:>5}  {}  [{}] {} by {}",
            entry.id, entry.title, entry.kind, entry.category, entry.uploaded_by
        );
    }
    out
}

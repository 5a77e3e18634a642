//! services/client/src/adapters/veritas_api.rs
//!
//! This module contains the adapter for the Veritas backend HTTP API.
//! It implements the `ContentBackend` and `LibraryService` ports from the core crate.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use tracing::debug;
use veritas_core::ports::{ContentBackend, LibraryService, PortError, PortResult};
use veritas_core::{
    CategoryQuery, CategoryRecord, ContentPatch, LibraryEntry, SearchFilter, UploadReceipt,
    UploadRequest,
};

use super::describe_transport;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that talks to the Veritas REST API over `reqwest`.
#[derive(Clone)]
pub struct VeritasApiAdapter {
    client: Client,
    base_url: Url,
}

impl VeritasApiAdapter {
    /// Creates a new `VeritasApiAdapter`. The client should carry the timeouts.
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Appends percent-encoded path segments to the base URL.
    fn url_for(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                PortError::Unexpected(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> PortResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Transport(describe_transport(&e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct CategoryItemRecord {
    id: i64,
    title: String,
    url: String,
    #[serde(default)]
    upload_date: Option<String>,
}
impl CategoryItemRecord {
    fn to_domain(self) -> CategoryRecord {
        CategoryRecord {
            id: self.id,
            title: self.title,
            url: self.url,
            upload_date: self.upload_date.unwrap_or_default(),
        }
    }
}

/// Identifiers arrive as strings from some endpoints and integers from others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(i64),
}
impl RecordId {
    fn into_string(self) -> String {
        match self {
            RecordId::Text(text) => text,
            RecordId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct LibraryRecord {
    id: RecordId,
    title: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    uploaded_by: String,
}
impl LibraryRecord {
    fn to_domain(self) -> LibraryEntry {
        LibraryEntry {
            id: self.id.into_string(),
            title: self.title,
            kind: self.kind,
            url: self.url,
            category: self.category,
            uploaded_by: self.uploaded_by,
        }
    }
}

#[derive(Deserialize)]
struct UploadResponseRecord {
    message: String,
    file_id: RecordId,
}
impl UploadResponseRecord {
    fn to_domain(self) -> UploadReceipt {
        UploadReceipt {
            message: self.message,
            file_id: self.file_id.into_string(),
        }
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> PortResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Transport(describe_transport(&e)))
}

//=========================================================================================
// `ContentBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentBackend for VeritasApiAdapter {
    async fn fetch_category(&self, query: &CategoryQuery) -> PortResult<Vec<CategoryRecord>> {
        let url = self.url_for(&[
            "api",
            "categories",
            &query.category_name,
            query.content_type.wire_token(),
        ])?;
        debug!(%url, "GET category listing");

        let response = self
            .send(self.client.get(url).header(ACCEPT, "application/json"))
            .await?;
        let records: Vec<CategoryItemRecord> = decode(response).await?;
        Ok(records.into_iter().map(CategoryItemRecord::to_domain).collect())
    }
}

//=========================================================================================
// `LibraryService` Trait Implementation
//=========================================================================================

#[async_trait]
impl LibraryService for VeritasApiAdapter {
    async fn search(&self, filter: &SearchFilter) -> PortResult<Vec<LibraryEntry>> {
        let url = self.url_for(&["content"])?;
        let mut params = Vec::new();
        if let Some(q) = &filter.query {
            params.push(("q", q.as_str()));
        }
        if let Some(category) = &filter.category {
            params.push(("category", category.as_str()));
        }
        debug!(%url, "GET library listing");

        let response = self
            .send(
                self.client
                    .get(url)
                    .query(&params)
                    .header(ACCEPT, "application/json"),
            )
            .await?;
        let records: Vec<LibraryRecord> = decode(response).await?;
        Ok(records.into_iter().map(LibraryRecord::to_domain).collect())
    }

    async fn upload(&self, token: &str, request: &UploadRequest) -> PortResult<UploadReceipt> {
        let url = self.url_for(&["admin", "upload"])?;
        let mut file = Part::bytes(request.data.to_vec()).file_name(request.file_name.clone());
        if let Some(mime) = &request.mime_type {
            file = file
                .mime_str(mime)
                .map_err(|e| PortError::Unexpected(format!("Invalid MIME type '{mime}': {e}")))?;
        }
        let form = Form::new()
            .text("title", request.title.clone())
            .text("category", request.category.clone())
            .part("file", file);
        debug!(%url, bytes = request.data.len(), "POST upload");

        let response = self
            .send(self.client.post(url).bearer_auth(token).multipart(form))
            .await?;
        let record: UploadResponseRecord = decode(response).await?;
        Ok(record.to_domain())
    }

    async fn update(&self, token: &str, item_id: i64, patch: &ContentPatch) -> PortResult<()> {
        let id = item_id.to_string();
        let url = self.url_for(&["content", &id])?;
        let mut fields = Vec::new();
        if let Some(title) = &patch.title {
            fields.push(("title", title.as_str()));
        }
        if let Some(category) = &patch.category {
            fields.push(("category", category.as_str()));
        }
        debug!(%url, "PATCH content");

        self.send(self.client.patch(url).bearer_auth(token).form(&fields))
            .await?;
        Ok(())
    }

    async fn delete(&self, token: &str, item_id: i64) -> PortResult<()> {
        let id = item_id.to_string();
        let url = self.url_for(&["content", &id])?;
        debug!(%url, "DELETE content");

        self.send(self.client.delete(url).bearer_auth(token)).await?;
        Ok(())
    }
}

//! crates/veritas_core/src/catalog.rs
//!
//! The category content loader: fetches one category listing and publishes the
//! resulting view-state for the presentation layer to render.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{CategoryQuery, CategoryRecord, ContentItem};
use crate::ports::{ContentBackend, PortError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Category name must not be empty")]
    InvalidQuery,
    #[error("Failed to load content: Error {code}")]
    Status { code: u16 },
    #[error("Error: {0}")]
    Transport(String),
}

impl From<PortError> for LoadError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Status(code) => LoadError::Status { code },
            PortError::Transport(reason) => LoadError::Transport(reason),
            other => LoadError::Transport(other.to_string()),
        }
    }
}

/// What the category screen should currently show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading(CategoryQuery),
    Populated(Vec<ContentItem>),
    Empty,
    Failed(LoadError),
}

pub struct CategoryLoader {
    backend: Arc<dyn ContentBackend>,
    state: watch::Sender<ViewState>,
    /// Ticket of the most recently issued query.
    latest: AtomicU64,
}

impl CategoryLoader {
    pub fn new(backend: Arc<dyn ContentBackend>) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        Self {
            backend,
            state,
            latest: AtomicU64::new(0),
        }
    }

    /// A receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Fetches the listing for `query`. The outcome is published through the
    /// view-state; a result for a query that has since been superseded is dropped.
    pub async fn load(&self, query: CategoryQuery) {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        if !query.is_valid() {
            warn!("Refusing to load a category without a name");
            self.apply(ticket, ViewState::Failed(LoadError::InvalidQuery));
            return;
        }

        self.apply(ticket, ViewState::Loading(query.clone()));
        debug!(
            category = %query.category_name,
            content_type = %query.content_type,
            ticket,
            "Loading category"
        );

        let next = match self.backend.fetch_category(&query).await {
            Ok(records) => match build_items(records, &query) {
                Ok(items) if items.is_empty() => ViewState::Empty,
                Ok(items) => {
                    info!(category = %query.category_name, count = items.len(), "Category loaded");
                    ViewState::Populated(items)
                }
                Err(error) => ViewState::Failed(error),
            },
            Err(error) => {
                warn!(category = %query.category_name, %error, "Category fetch failed");
                ViewState::Failed(error.into())
            }
        };

        if !self.apply(ticket, next) {
            debug!(ticket, "Discarding result for a superseded query");
        }
    }

    /// Runs [`load`](Self::load) on the tokio runtime so the caller never waits on it.
    pub fn spawn_load(self: &Arc<Self>, query: CategoryQuery) -> JoinHandle<()> {
        let loader = Arc::clone(self);
        tokio::spawn(async move { loader.load(query).await })
    }

    /// Publishes `next` only if `ticket` still belongs to the latest query.
    fn apply(&self, ticket: u64, next: ViewState) -> bool {
        self.state.send_if_modified(|current| {
            if self.latest.load(Ordering::SeqCst) != ticket {
                return false;
            }
            *current = next;
            true
        })
    }
}

fn build_items(
    records: Vec<CategoryRecord>,
    query: &CategoryQuery,
) -> Result<Vec<ContentItem>, LoadError> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .map(|record| {
            if record.title.trim().is_empty() {
                return Err(LoadError::Transport(format!(
                    "malformed response: item {} has an empty title",
                    record.id
                )));
            }
            if !seen.insert(record.id) {
                return Err(LoadError::Transport(format!(
                    "malformed response: duplicate item id {}",
                    record.id
                )));
            }
            Ok(ContentItem {
                id: record.id,
                title: record.title,
                url: record.url,
                uploaded_at: record.upload_date,
                content_type: query.content_type,
                category: query.category_name.clone(),
            })
        })
        .collect()
}

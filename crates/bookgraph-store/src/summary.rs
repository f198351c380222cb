//! SummaryStore: free-text summary notes keyed by a unique title.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{load_document, save_document, DocumentBackend, GraphStoreError, StoreResult};

/// Name of the summary document on the backend
pub const SUMMARY_DOCUMENT: &str = "summary-data.json";

/// Title used when a summary is added without one
pub const DEFAULT_SUMMARY_TITLE: &str = "Temporary Summary";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub summary: String,
    pub summary_title: String,
}

#[derive(Debug, Clone)]
pub struct SummaryStore {
    backend: Arc<dyn DocumentBackend>,
    write_lock: Arc<Mutex<()>>,
}

/// First of `base`, `base (2)`, `base (3)`, ... not already taken.
fn unique_title(entries: &[SummaryEntry], base: &str) -> String {
    let taken = |title: &str| entries.iter().any(|entry| entry.summary_title == title);
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|counter| format!("{} ({})", base, counter))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

impl SummaryStore {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All summaries in insertion order
    pub async fn list(&self) -> StoreResult<Vec<SummaryEntry>> {
        let entries: Vec<SummaryEntry> = load_document(self.backend.as_ref(), SUMMARY_DOCUMENT).await?;
        debug!(count = entries.len(), "Loaded summaries");
        Ok(entries)
    }

    /// Append a summary and return the title it was stored under.
    pub async fn add(&self, summary: &str, title: Option<&str>) -> StoreResult<String> {
        if summary.is_empty() {
            return Err(GraphStoreError::InvalidInput("summary".to_string()));
        }
        let base = title
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_SUMMARY_TITLE);

        let _guard = self.write_lock.lock().await;
        let mut entries = self.list().await?;
        let summary_title = unique_title(&entries, base);
        entries.push(SummaryEntry {
            summary: summary.to_string(),
            summary_title: summary_title.clone(),
        });
        save_document(self.backend.as_ref(), SUMMARY_DOCUMENT, &entries).await?;

        info!(title = %summary_title, "Added summary");
        Ok(summary_title)
    }

    pub async fn get(&self, title: &str) -> StoreResult<SummaryEntry> {
        self.list()
            .await?
            .into_iter()
            .find(|entry| entry.summary_title == title)
            .ok_or_else(|| GraphStoreError::SummaryNotFound(title.to_string()))
    }

    /// Remove every summary with `title`
    pub async fn delete(&self, title: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.list().await?;
        let before = entries.len();
        entries.retain(|entry| entry.summary_title != title);

        if entries.len() == before {
            return Err(GraphStoreError::SummaryNotFound(title.to_string()));
        }

        save_document(self.backend.as_ref(), SUMMARY_DOCUMENT, &entries).await?;
        info!(title, removed = before - entries.len(), "Deleted summary");
        Ok(())
    }
}

//! In-memory implementation of DocumentBackend
//!
//! This implementation is primarily intended for testing and development purposes.

use crate::{DocumentBackend, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of DocumentBackend
///
/// Documents are kept as raw bytes so that encoding behaves exactly as it
/// does on disk. All data is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentBackend {
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryDocumentBackend {
    /// Create a new in-memory document backend
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn document_names(&self) -> Vec<String> {
        let store = self.documents.read().await;
        let mut names: Vec<String> = store.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl DocumentBackend for InMemoryDocumentBackend {
    async fn read_document(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        let store = self.documents.read().await;
        Ok(store.get(name).cloned())
    }

    async fn write_document(&self, name: &str, bytes: &[u8]) -> StoreResult<()> {
        let mut store = self.documents.write().await;
        store.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

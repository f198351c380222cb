//! File-backed implementation of DocumentBackend
//!
//! Each document is one JSON file under a root directory. Writes go to a
//! sibling temp file which is then renamed over the target.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::{DocumentBackend, GraphStoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct FileDocumentBackend {
    root: PathBuf,
}

impl FileDocumentBackend {
    /// Create a backend storing documents under `root`. The directory is
    /// created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, name: &str) -> StoreResult<PathBuf> {
        if name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') || name.starts_with('.') {
            return Err(GraphStoreError::Persistence(format!(
                "Invalid document name: {}",
                name
            )));
        }
        Ok(self.root.join(name))
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> GraphStoreError {
    error!(path = %path.display(), error = %err, "Failed to {}", action);
    GraphStoreError::Persistence(format!("Failed to {} {}: {}", action, path.display(), err))
}

#[async_trait]
impl DocumentBackend for FileDocumentBackend {
    async fn read_document(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.document_path(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Document not found");
                Ok(None)
            }
            Err(err) => Err(io_error("read", &path, err)),
        }
    }

    async fn write_document(&self, name: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.document_path(name)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| io_error("create directory", &self.root, err))?;

        let tmp = self.root.join(format!("{}.tmp", name));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|err| io_error("write", &tmp, err))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|err| io_error("replace", &path, err))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Wrote document");
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<bool> {
        match tokio::fs::create_dir_all(&self.root).await {
            Ok(()) => Ok(true),
            Err(err) => Err(io_error("create directory", &self.root, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{Fragment, FragmentEdge, FragmentNode};
    use crate::{GraphStore, SummaryStore, GRAPH_DOCUMENT};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let backend = FileDocumentBackend::new(dir.path());
        assert_eq!(backend.read_document("books-data.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_creates_root_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("data");
        let backend = FileDocumentBackend::new(&root);

        backend.write_document("doc.json", b"{}").await.unwrap();

        assert!(root.join("doc.json").exists());
        assert!(!root.join("doc.json.tmp").exists());
        assert_eq!(
            backend.read_document("doc.json").await.unwrap().as_deref(),
            Some(&b"{}"[..])
        );
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let backend = FileDocumentBackend::new(dir.path());
        assert!(backend.write_document("../escape.json", b"{}").await.is_err());
        assert!(backend.read_document("sub/doc.json").await.is_err());
    }

    #[tokio::test]
    async fn test_graph_survives_new_store_instance() {
        let dir = TempDir::new().unwrap();
        let fragment = Fragment::new(
            vec![FragmentNode::new("x1"), FragmentNode::new("x2")],
            vec![FragmentEdge::new("x1", "x2", "cites")],
            "x1",
        );

        {
            let store = GraphStore::new(Arc::new(FileDocumentBackend::new(dir.path())));
            store.append_merge(fragment).await.unwrap();
        }

        let store = GraphStore::new(Arc::new(FileDocumentBackend::new(dir.path())));
        let graph = store.load().await.unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(store.reasons_between("b", "a").await.unwrap(), vec!["cites".to_string()]);

        let raw = std::fs::read_to_string(dir.path().join(GRAPH_DOCUMENT)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["rootId"], "a");
        assert_eq!(value["lines"][0]["from"], "a");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(GRAPH_DOCUMENT), "[[[").unwrap();

        let store = GraphStore::new(Arc::new(FileDocumentBackend::new(dir.path())));
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn test_summaries_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = SummaryStore::new(Arc::new(FileDocumentBackend::new(dir.path())));
        store.add("text", Some("Title")).await.unwrap();

        let reopened = SummaryStore::new(Arc::new(FileDocumentBackend::new(dir.path())));
        assert_eq!(reopened.get("Title").await.unwrap().summary, "text");
    }
}

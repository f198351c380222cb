//! GraphStore: the persisted book exploration graph.
//!
//! All mutations go through a single write lock, so the offset a merge reads
//! and the document it writes belong to the same critical section. Reads take
//! no lock and rely on the backend replacing documents atomically.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::merge::{merge_fragment, Fragment, MergeReport};
use crate::{load_document, save_document, DocumentBackend, Graph, GraphStoreError, StoreResult};

/// Name of the graph document on the backend
pub const GRAPH_DOCUMENT: &str = "books-data.json";

#[derive(Debug, Clone)]
pub struct GraphStore {
    backend: Arc<dyn DocumentBackend>,
    write_lock: Arc<Mutex<()>>,
}

impl GraphStore {
    /// Create a graph store over `backend`
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Current graph, or an empty graph when nothing has been stored yet.
    pub async fn load(&self) -> StoreResult<Graph> {
        let graph: Graph = load_document(self.backend.as_ref(), GRAPH_DOCUMENT).await?;
        debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "Loaded graph");
        Ok(graph)
    }

    /// Merge a fragment into the stored graph.
    ///
    /// The fragment's nodes receive fresh identifiers starting at the current
    /// node count. On any error the stored graph is left as it was.
    pub async fn append_merge(&self, fragment: Fragment) -> StoreResult<MergeReport> {
        fragment.validate()?;

        let _guard = self.write_lock.lock().await;
        let existing = self.load().await?;

        let (merged, report) = match merge_fragment(&existing, fragment) {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Rejected graph fragment");
                return Err(e);
            }
        };

        save_document(self.backend.as_ref(), GRAPH_DOCUMENT, &merged).await?;

        info!(
            offset = report.offset,
            nodes_added = report.assigned.len(),
            edges_added = report.edges_added,
            root = %report.root,
            "Merged graph fragment"
        );
        Ok(report)
    }

    /// Reset to the empty graph. Idempotent.
    pub async fn clear(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        save_document(self.backend.as_ref(), GRAPH_DOCUMENT, &Graph::empty()).await?;
        info!("Cleared graph");
        Ok(())
    }

    /// Look up one `data` attribute of one node.
    ///
    /// Only a missing key is `AttributeNotFound`; stored `false`, `0`, `""`
    /// and `null` values are returned as they are.
    pub async fn get_attribute(&self, node_id: &str, attribute: &str) -> StoreResult<Value> {
        if node_id.is_empty() {
            return Err(GraphStoreError::InvalidInput("id".to_string()));
        }
        if attribute.is_empty() {
            return Err(GraphStoreError::InvalidInput("attribute".to_string()));
        }

        let graph = self.load().await?;
        let node = graph
            .find_node(node_id)
            .ok_or_else(|| GraphStoreError::NodeNotFound(node_id.to_string()))?;

        node.data
            .get(attribute)
            .cloned()
            .ok_or_else(|| GraphStoreError::AttributeNotFound {
                node: node_id.to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Reasons of all edges between `a` and `b`, either direction, in stored order.
    pub async fn reasons_between(&self, a: &str, b: &str) -> StoreResult<Vec<String>> {
        if a.is_empty() {
            return Err(GraphStoreError::InvalidInput("from".to_string()));
        }
        if b.is_empty() {
            return Err(GraphStoreError::InvalidInput("to".to_string()));
        }

        let reasons = self.load().await?.reasons_between(a, b);
        debug!(from = a, to = b, count = reasons.len(), "Found reasons between nodes");
        Ok(reasons)
    }

    /// Check the backing storage
    pub async fn health_check(&self) -> StoreResult<bool> {
        self.backend.health_check().await
    }
}

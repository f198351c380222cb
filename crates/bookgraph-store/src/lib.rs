//! Bookgraph Store
//!
//! Provides the append-merge graph engine behind the book exploration graph,
//! the summary notes list, and the document backends they persist through.
//! The DocumentBackend trait defines a contract for reading/writing whole
//! JSON documents; GraphStore and SummaryStore each own one document.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use std::fmt::Debug;

/// A stored graph node.
///
/// `label` is written as `text` on the wire and always equals `id` once the
/// node has been merged. `data` is opaque and usually an object; an absent
/// `data` reads as `{}`. Fields other than `id`, `text` and `data` are kept
/// in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "text", default)]
    pub label: String,
    #[serde(default = "empty_data")]
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub(crate) fn empty_data() -> Value {
    Value::Object(Map::new())
}

/// A stored edge ("line" on the wire). Directional in storage only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    // Older documents may carry edges whose endpoints were dropped on write.
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub reason: String,
}

impl Edge {
    /// True when the edge joins `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// The persisted graph document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(rename = "lines", default)]
    pub edges: Vec<Edge>,
    #[serde(rename = "rootId", default, with = "root_id")]
    pub root: Option<String>,
}

impl Graph {
    /// An empty graph: no nodes, no edges, no root.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.root.is_none()
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.find_node(id).is_some()
    }

    /// Reasons of every edge between `a` and `b` in stored order, ignoring direction.
    pub fn reasons_between(&self, a: &str, b: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|edge| edge.connects(a, b))
            .map(|edge| edge.reason.clone())
            .collect()
    }
}

/// `rootId` is written as `""` when unset and an empty string reads back as unset.
mod root_id {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(root: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(root.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|root| !root.is_empty()))
    }
}

/// Errors that can occur during graph and summary store operations
#[derive(Error, Debug)]
pub enum GraphStoreError {
    #[error("Missing or empty field: {0}")]
    InvalidInput(String),

    #[error("Node with id '{0}' not found")]
    NodeNotFound(String),

    #[error("Attribute '{attribute}' not found in node '{node}'")]
    AttributeNotFound { node: String, attribute: String },

    #[error("Summary titled '{0}' not found")]
    SummaryNotFound(String),

    #[error("Edge {edge} references unknown node '{id}' in '{field}'")]
    DanglingEdgeReference {
        edge: usize,
        field: &'static str,
        id: String,
    },

    #[error("Storage backend error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GraphStoreError::NodeNotFound(_)
                | GraphStoreError::AttributeNotFound { .. }
                | GraphStoreError::SummaryNotFound(_)
        )
    }

    /// Errors the caller can fix by correcting the request.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            GraphStoreError::InvalidInput(_)
                | GraphStoreError::DanglingEdgeReference { .. }
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, GraphStoreError>;

/// Trait defining the contract for document persistence implementations
///
/// A document is read and written as a whole. `write_document` must replace
/// the previous document atomically: a concurrent reader sees either the old
/// bytes or the new bytes, never a mix.
#[async_trait]
pub trait DocumentBackend: Send + Sync + Debug {
    /// Read a document; `None` when it has never been written.
    async fn read_document(&self, name: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Replace a document with `bytes`.
    async fn write_document(&self, name: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Check that the backend can serve requests.
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

/// Read and decode a document, falling back to `T::default()` when it is
/// absent or zero-length. Undecodable bytes are an error.
pub(crate) async fn load_document<T>(backend: &dyn DocumentBackend, name: &str) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
{
    match backend.read_document(name).await? {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
            Ok(serde_json::from_slice(&bytes)?)
        }
        _ => Ok(T::default()),
    }
}

pub(crate) async fn save_document<T>(backend: &dyn DocumentBackend, name: &str, value: &T) -> StoreResult<()>
where
    T: Serialize,
{
    let bytes = serde_json::to_vec_pretty(value)?;
    backend.write_document(name, &bytes).await
}

pub mod ids;
pub mod merge;
pub mod graph;
pub mod summary;
pub mod memory;
pub mod file;

pub use ids::generate_id;
pub use merge::{merge_fragment, Fragment, FragmentEdge, FragmentNode, IdAssignment, MergeReport};
pub use graph::{GraphStore, GRAPH_DOCUMENT};
pub use summary::{SummaryEntry, SummaryStore, DEFAULT_SUMMARY_TITLE, SUMMARY_DOCUMENT};
pub use memory::InMemoryDocumentBackend;
pub use file::FileDocumentBackend;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graph_document_wire_names() {
        let graph = Graph {
            nodes: vec![Node {
                id: "a".to_string(),
                label: "a".to_string(),
                data: empty_data(),
                extra: Map::new(),
            }],
            edges: vec![Edge {
                from: "a".to_string(),
                to: "a".to_string(),
                reason: "self".to_string(),
            }],
            root: Some("a".to_string()),
        };

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["nodes"][0]["text"], "a");
        assert_eq!(value["lines"][0]["reason"], "self");
        assert_eq!(value["rootId"], "a");
    }

    #[test]
    fn test_unset_root_written_as_empty_string() {
        let value = serde_json::to_value(Graph::empty()).unwrap();
        assert_eq!(value, json!({"nodes": [], "lines": [], "rootId": ""}));
    }

    #[test]
    fn test_empty_root_reads_back_as_unset() {
        let graph: Graph = serde_json::from_value(json!({"nodes": [], "lines": [], "rootId": ""})).unwrap();
        assert!(graph.root.is_none());
        assert!(graph.is_empty());

        // The original's empty-object document
        let graph: Graph = serde_json::from_value(json!({})).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_node_extra_fields_survive_round_trip() {
        let raw = json!({
            "id": "a",
            "text": "a",
            "data": {"title": "Moby Dick"},
            "color": "red"
        });
        let node: Node = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(node.extra.get("color"), Some(&json!("red")));
        assert_eq!(serde_json::to_value(&node).unwrap(), raw);
    }

    #[test]
    fn test_legacy_edge_without_endpoints_loads() {
        let graph: Graph = serde_json::from_value(json!({
            "nodes": [],
            "lines": [{"reason": "orphan"}],
            "rootId": "a"
        }))
        .unwrap();
        assert_eq!(graph.edges[0].from, "");
        assert!(graph.reasons_between("a", "b").is_empty());
    }

    #[test]
    fn test_error_predicates() {
        assert!(GraphStoreError::NodeNotFound("a".into()).is_not_found());
        assert!(GraphStoreError::SummaryNotFound("t".into()).is_not_found());
        assert!(GraphStoreError::InvalidInput("nodes".into()).is_invalid_input());
        assert!(GraphStoreError::DanglingEdgeReference { edge: 0, field: "to", id: "x".into() }.is_invalid_input());
        assert!(!GraphStoreError::Persistence("disk".into()).is_invalid_input());
        assert!(!GraphStoreError::Persistence("disk".into()).is_not_found());
    }
}

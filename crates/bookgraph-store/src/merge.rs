//! Fragment validation and the append-merge algorithm.
//!
//! A fragment carries nodes, edges and a root in the caller's own identifier
//! space. Merging assigns each fragment node the next free store identifier,
//! rewrites the fragment's edges through that mapping, and appends both to
//! the existing graph. The existing root always wins over a proposed one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::{empty_data, generate_id, Edge, Graph, GraphStoreError, Node, StoreResult};

/// A caller-submitted graph fragment, as received on the wire.
///
/// Every field is optional here so that a missing one is reported as
/// `InvalidInput` naming the field rather than as a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub nodes: Option<Vec<FragmentNode>>,
    #[serde(rename = "lines", default)]
    pub edges: Option<Vec<FragmentEdge>>,
    #[serde(rename = "rootId", default)]
    pub root: Option<String>,
}

/// A fragment node in caller identifiers. Any `text` is discarded on merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "text", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "empty_data")]
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentEdge {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// One caller identifier and the store identifier it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAssignment {
    pub original: String,
    pub assigned: String,
}

/// Outcome of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Node count of the store before the merge.
    pub offset: usize,
    /// Assignments in submission order.
    pub assigned: Vec<IdAssignment>,
    pub edges_added: usize,
    #[serde(rename = "rootId")]
    pub root: String,
}

/// A fragment that passed shape checks.
struct CheckedFragment {
    nodes: Vec<(String, FragmentNode)>,
    edges: Vec<(String, String, String)>,
    root: String,
}

fn required(value: Option<String>, field: impl FnOnce() -> String) -> StoreResult<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(GraphStoreError::InvalidInput(field())),
    }
}

impl Fragment {
    pub fn new(nodes: Vec<FragmentNode>, edges: Vec<FragmentEdge>, root: impl Into<String>) -> Self {
        Self {
            nodes: Some(nodes),
            edges: Some(edges),
            root: Some(root.into()),
        }
    }

    /// Check that the fragment carries everything a merge needs.
    ///
    /// An empty `nodes` list counts as missing; an empty `lines` list does not.
    pub fn validate(&self) -> StoreResult<()> {
        self.clone().check().map(|_| ())
    }

    fn check(self) -> StoreResult<CheckedFragment> {
        let nodes = match self.nodes {
            Some(nodes) if !nodes.is_empty() => nodes,
            _ => return Err(GraphStoreError::InvalidInput("nodes".to_string())),
        };
        let edges = self
            .edges
            .ok_or_else(|| GraphStoreError::InvalidInput("lines".to_string()))?;
        let root = required(self.root, || "rootId".to_string())?;

        let nodes = nodes
            .into_iter()
            .enumerate()
            .map(|(index, mut node)| -> StoreResult<(String, FragmentNode)> {
                let id = required(node.id.take(), || format!("nodes[{}].id", index))?;
                Ok((id, node))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let edges = edges
            .into_iter()
            .enumerate()
            .map(|(index, edge)| -> StoreResult<(String, String, String)> {
                let from = required(edge.from, || format!("lines[{}].from", index))?;
                let to = required(edge.to, || format!("lines[{}].to", index))?;
                Ok((from, to, edge.reason.unwrap_or_default()))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(CheckedFragment { nodes, edges, root })
    }
}

impl FragmentNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: None,
            data: empty_data(),
            extra: Map::new(),
        }
    }

    /// Set one `data` attribute, turning a non-object `data` into an object.
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        if !self.data.is_object() {
            self.data = empty_data();
        }
        if let Value::Object(map) = &mut self.data {
            map.insert(key.into(), value);
        }
        self
    }
}

impl FragmentEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            reason: Some(reason.into()),
        }
    }
}

fn resolve(
    remap: &HashMap<String, String>,
    edge: usize,
    field: &'static str,
    id: String,
) -> StoreResult<String> {
    match remap.get(&id) {
        Some(assigned) => Ok(assigned.clone()),
        None => Err(GraphStoreError::DanglingEdgeReference { edge, field, id }),
    }
}

/// Merge `fragment` into `existing`, returning the new graph.
///
/// `existing` is not modified; on error nothing of the fragment is applied.
/// Edge endpoints resolve against the fragment's own nodes only. A proposed
/// root naming a fragment node is remapped; any other root is stored as
/// given. When a caller identifier appears twice in one fragment, the later
/// node receives its edges.
pub fn merge_fragment(existing: &Graph, fragment: Fragment) -> StoreResult<(Graph, MergeReport)> {
    let fragment = fragment.check()?;
    let offset = existing.nodes.len();

    let mut remap = HashMap::with_capacity(fragment.nodes.len());
    let mut assigned = Vec::with_capacity(fragment.nodes.len());
    let mut new_nodes = Vec::with_capacity(fragment.nodes.len());

    for (position, (original, node)) in fragment.nodes.into_iter().enumerate() {
        let id = generate_id(offset + position);
        remap.insert(original.clone(), id.clone());
        assigned.push(IdAssignment {
            original,
            assigned: id.clone(),
        });
        new_nodes.push(Node {
            label: id.clone(),
            id,
            data: node.data,
            extra: node.extra,
        });
    }

    let new_edges = fragment
        .edges
        .into_iter()
        .enumerate()
        .map(|(index, (from, to, reason))| -> StoreResult<Edge> {
            Ok(Edge {
                from: resolve(&remap, index, "from", from)?,
                to: resolve(&remap, index, "to", to)?,
                reason,
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;

    let root = match &existing.root {
        Some(root) => root.clone(),
        None => remap.get(&fragment.root).cloned().unwrap_or(fragment.root),
    };

    let report = MergeReport {
        offset,
        assigned,
        edges_added: new_edges.len(),
        root: root.clone(),
    };

    let mut merged = existing.clone();
    merged.nodes.extend(new_nodes);
    merged.edges.extend(new_edges);
    merged.root = Some(root);

    Ok((merged, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashSet;

    fn chain_fragment(prefix: &str, len: usize) -> Fragment {
        let nodes = (0..len)
            .map(|i| FragmentNode::new(format!("{}{}", prefix, i)))
            .collect();
        let edges = (1..len)
            .map(|i| FragmentEdge::new(format!("{}{}", prefix, i - 1), format!("{}{}", prefix, i), "next"))
            .collect();
        Fragment::new(nodes, edges, format!("{}0", prefix))
    }

    #[test]
    fn test_merge_into_empty_graph() {
        let fragment = Fragment::new(
            vec![FragmentNode::new("x1"), FragmentNode::new("x2")],
            vec![FragmentEdge::new("x1", "x2", "cites")],
            "x1",
        );

        let (graph, report) = merge_fragment(&Graph::empty(), fragment).unwrap();

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(
            graph.edges,
            vec![Edge {
                from: "a".to_string(),
                to: "b".to_string(),
                reason: "cites".to_string()
            }]
        );
        assert_eq!(graph.root.as_deref(), Some("a"));
        assert_eq!(report.offset, 0);
        assert_eq!(report.edges_added, 1);
        assert_eq!(
            report.assigned,
            vec![
                IdAssignment { original: "x1".into(), assigned: "a".into() },
                IdAssignment { original: "x2".into(), assigned: "b".into() },
            ]
        );
    }

    #[test]
    fn test_offset_crosses_two_letter_boundary() {
        let (graph, _) = merge_fragment(&Graph::empty(), chain_fragment("p", 26)).unwrap();
        let (graph, report) = merge_fragment(&graph, chain_fragment("q", 27)).unwrap();

        assert_eq!(report.offset, 26);
        let new_ids: Vec<&str> = graph.nodes[26..].iter().map(|n| n.id.as_str()).collect();
        assert_eq!(new_ids.first(), Some(&"aa"));
        assert_eq!(new_ids.get(25), Some(&"az"));
        assert_eq!(new_ids.last(), Some(&"ba"));
        for (position, node) in graph.nodes.iter().enumerate() {
            assert_eq!(node.id, generate_id(position));
        }
    }

    #[test]
    fn test_existing_root_wins() {
        let (graph, _) = merge_fragment(&Graph::empty(), chain_fragment("p", 2)).unwrap();
        let proposed = Fragment::new(vec![FragmentNode::new("z9")], vec![], "z9");

        let (graph, report) = merge_fragment(&graph, proposed).unwrap();

        assert_eq!(graph.root.as_deref(), Some("a"));
        assert_eq!(report.root, "a");
    }

    #[test]
    fn test_root_outside_fragment_is_kept_verbatim() {
        let fragment = Fragment::new(vec![FragmentNode::new("x1")], vec![], "r");

        let (graph, report) = merge_fragment(&Graph::empty(), fragment).unwrap();

        assert_eq!(graph.nodes[0].id, "a");
        assert_eq!(graph.root.as_deref(), Some("r"));
        assert_eq!(report.root, "r");
    }

    #[test]
    fn test_existing_graph_is_a_prefix() {
        let (before, _) = merge_fragment(&Graph::empty(), chain_fragment("p", 5)).unwrap();
        let (after, _) = merge_fragment(&before, chain_fragment("q", 3)).unwrap();

        assert_eq!(&after.nodes[..before.nodes.len()], &before.nodes[..]);
        assert_eq!(&after.edges[..before.edges.len()], &before.edges[..]);
    }

    #[test]
    fn test_labels_are_normalized_and_data_passes_through() {
        let mut node = FragmentNode::new("x1").with_data("title", json!("Walden"));
        node.label = Some("Walden by Thoreau".to_string());
        node.extra.insert("color".to_string(), json!("green"));

        let (graph, _) = merge_fragment(&Graph::empty(), Fragment::new(vec![node], vec![], "x1")).unwrap();

        let stored = &graph.nodes[0];
        assert_eq!(stored.label, stored.id);
        assert_eq!(stored.data.get("title"), Some(&json!("Walden")));
        assert_eq!(stored.extra.get("color"), Some(&json!("green")));
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let fragment = Fragment::new(
            vec![FragmentNode::new("x1")],
            vec![FragmentEdge::new("x1", "ghost", "cites")],
            "x1",
        );

        let err = merge_fragment(&Graph::empty(), fragment).unwrap_err();
        match err {
            GraphStoreError::DanglingEdgeReference { edge, field, id } => {
                assert_eq!(edge, 0);
                assert_eq!(field, "to");
                assert_eq!(id, "ghost");
            }
            other => panic!("Expected DanglingEdgeReference, got {:?}", other),
        }
    }

    #[test]
    fn test_edges_do_not_resolve_against_stored_ids() {
        let (graph, _) = merge_fragment(&Graph::empty(), chain_fragment("p", 2)).unwrap();
        // "a" exists in the store but not in this fragment
        let fragment = Fragment::new(
            vec![FragmentNode::new("x1")],
            vec![FragmentEdge::new("x1", "a", "cites")],
            "x1",
        );
        assert!(merge_fragment(&graph, fragment).is_err());
    }

    #[test]
    fn test_duplicate_caller_ids_get_distinct_store_ids() {
        let fragment = Fragment::new(
            vec![FragmentNode::new("dup"), FragmentNode::new("dup")],
            vec![FragmentEdge::new("dup", "dup", "self")],
            "dup",
        );

        let (graph, _) = merge_fragment(&Graph::empty(), fragment).unwrap();

        let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(graph.edges[0].from, "b");
        assert_eq!(graph.root.as_deref(), Some("b"));
    }

    #[test]
    fn test_validation_names_missing_field() {
        let cases = vec![
            (Fragment { nodes: None, ..Fragment::new(vec![], vec![], "r") }, "nodes"),
            (Fragment::new(vec![], vec![], "r"), "nodes"),
            (Fragment { edges: None, ..Fragment::new(vec![FragmentNode::new("x")], vec![], "x") }, "lines"),
            (Fragment { root: None, ..Fragment::new(vec![FragmentNode::new("x")], vec![], "x") }, "rootId"),
            (Fragment::new(vec![FragmentNode::new("x")], vec![], ""), "rootId"),
            (Fragment::new(vec![FragmentNode::default()], vec![], "x"), "nodes[0].id"),
            (
                Fragment::new(
                    vec![FragmentNode::new("x")],
                    vec![FragmentEdge { from: Some("x".into()), to: None, reason: None }],
                    "x",
                ),
                "lines[0].to",
            ),
        ];

        for (fragment, field) in cases {
            match fragment.validate() {
                Err(GraphStoreError::InvalidInput(name)) => assert_eq!(name, field),
                other => panic!("Expected InvalidInput({}), got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_empty_lines_accepted() {
        let fragment = Fragment::new(vec![FragmentNode::new("x")], vec![], "x");
        assert!(fragment.validate().is_ok());
    }

    #[test]
    fn test_fragment_from_wire_json() {
        let fragment: Fragment = serde_json::from_value(json!({
            "nodes": [{"id": "n1", "text": "Dracula", "data": {"year": 1897}}],
            "lines": [],
            "rootId": "n1"
        }))
        .unwrap();

        let (graph, _) = merge_fragment(&Graph::empty(), fragment).unwrap();
        assert_eq!(graph.nodes[0].label, "a");
        assert_eq!(graph.nodes[0].data.get("year"), Some(&json!(1897)));
    }

    #[test]
    fn test_non_object_data_passes_through() {
        let fragment: Fragment = serde_json::from_value(json!({
            "nodes": [
                {"id": "n1", "data": null},
                {"id": "n2", "data": "plain note"},
                {"id": "n3"}
            ],
            "lines": [],
            "rootId": "n1"
        }))
        .unwrap();

        let (graph, _) = merge_fragment(&Graph::empty(), fragment).unwrap();
        assert_eq!(graph.nodes[0].data, Value::Null);
        assert_eq!(graph.nodes[1].data, json!("plain note"));
        assert_eq!(graph.nodes[2].data, json!({}));
    }
}

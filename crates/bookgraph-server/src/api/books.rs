//! Graph endpoints
//!
//! Thin handlers over GraphStore: fetch, append-merge, clear, attribute
//! lookup and reasons between two nodes.

use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use bookgraph_store::{Fragment, Graph, MergeReport};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

use super::errors::ApiError;
use crate::server::BookgraphServer;

/// Response for a successful append-merge
#[derive(Debug, Serialize, Deserialize)]
pub struct AppendResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: MergeReport,
}

/// Request for one node attribute
#[derive(Debug, Default, Deserialize)]
pub struct NodeAttributeRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
}

/// Request for the reasons between two nodes
#[derive(Debug, Default, Deserialize)]
pub struct ReasonsBetweenRequest {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReasonsResponse {
    pub reasons: Vec<String>,
}

/// Handler for fetching the whole graph
#[instrument(skip_all)]
pub async fn get_graph_handler(
    State(server): State<Arc<BookgraphServer>>,
) -> Result<Json<Graph>, ApiError> {
    Ok(Json(server.graph().load().await?))
}

/// Handler for merging a submitted fragment into the graph
#[instrument(skip_all)]
pub async fn append_graph_handler(
    State(server): State<Arc<BookgraphServer>>,
    Json(fragment): Json<Fragment>,
) -> Result<Json<AppendResponse>, ApiError> {
    let report = server.graph().append_merge(fragment).await?;

    Ok(Json(AppendResponse {
        message: "Book data appended with remapped IDs successfully".to_string(),
        report,
    }))
}

/// Handler for clearing the graph
#[instrument(skip_all)]
pub async fn clear_graph_handler(
    State(server): State<Arc<BookgraphServer>>,
) -> Result<impl IntoResponse, ApiError> {
    server.graph().clear().await?;
    Ok(Json(json!({ "message": "All book data cleared" })))
}

/// Handler returning one `data` attribute of one node as the raw value
#[instrument(skip_all)]
pub async fn node_attribute_handler(
    State(server): State<Arc<BookgraphServer>>,
    Json(request): Json<NodeAttributeRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = request.id.unwrap_or_default();
    let attribute = request.attribute.unwrap_or_default();
    let value = server.graph().get_attribute(&id, &attribute).await?;
    Ok(Json(value))
}

/// Handler returning the reasons of every edge between two nodes
#[instrument(skip_all)]
pub async fn reasons_between_handler(
    State(server): State<Arc<BookgraphServer>>,
    Json(request): Json<ReasonsBetweenRequest>,
) -> Result<Json<ReasonsResponse>, ApiError> {
    let from = request.from.unwrap_or_default();
    let to = request.to.unwrap_or_default();
    let reasons = server.graph().reasons_between(&from, &to).await?;
    Ok(Json(ReasonsResponse { reasons }))
}

//! Summary note endpoints

use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
};
use bookgraph_store::SummaryEntry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

use super::errors::ApiError;
use crate::server::BookgraphServer;

/// Request for adding a summary
#[derive(Debug, Default, Deserialize)]
pub struct AddSummaryRequest {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub summary_title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddSummaryResponse {
    pub message: String,
    pub summary_title: String,
}

#[instrument(skip_all)]
pub async fn list_summaries_handler(
    State(server): State<Arc<BookgraphServer>>,
) -> Result<Json<Vec<SummaryEntry>>, ApiError> {
    Ok(Json(server.summaries().list().await?))
}

#[instrument(skip_all)]
pub async fn add_summary_handler(
    State(server): State<Arc<BookgraphServer>>,
    Json(request): Json<AddSummaryRequest>,
) -> Result<Json<AddSummaryResponse>, ApiError> {
    let summary = request.summary.unwrap_or_default();
    let summary_title = server
        .summaries()
        .add(&summary, request.summary_title.as_deref())
        .await?;

    Ok(Json(AddSummaryResponse {
        message: "Summary added successfully".to_string(),
        summary_title,
    }))
}

#[instrument(skip(server))]
pub async fn get_summary_handler(
    State(server): State<Arc<BookgraphServer>>,
    Path(title): Path<String>,
) -> Result<Json<SummaryEntry>, ApiError> {
    Ok(Json(server.summaries().get(&title).await?))
}

#[instrument(skip(server))]
pub async fn delete_summary_handler(
    State(server): State<Arc<BookgraphServer>>,
    Path(title): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    server.summaries().delete(&title).await?;
    Ok(Json(json!({
        "message": format!("Summary titled '{}' deleted successfully", title)
    })))
}

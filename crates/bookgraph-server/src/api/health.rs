//! Health check endpoint for the Bookgraph Server
//!
//! This module contains the health check handler.

use axum::{
    extract::State,
    response::IntoResponse,
    Json,
    http::StatusCode,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::server::BookgraphServer;

/// Health check handler
///
/// Reports the server version and whether the document storage is usable.
#[instrument(skip_all)]
pub async fn health_check(
    State(server): State<Arc<BookgraphServer>>,
) -> impl IntoResponse {
    debug!("Health check requested");

    let storage_status = match server.check_storage_health().await {
        Ok(true) => "UP",
        Ok(false) => "DEGRADED",
        Err(_) => "DOWN",
    };

    let status = if storage_status == "DOWN" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status, Json(json!({
        "status": if status == StatusCode::OK { "UP" } else { "DOWN" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "storage": { "status": storage_status },
        },
    })))
}

//! API module for the Bookgraph Server
//!
//! This module contains the API routes and handlers for the Bookgraph Server.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod books;
pub mod summary;
pub mod health;
pub mod errors;

use crate::server::BookgraphServer;

/// Build the router for API endpoints
pub fn build_router(server: Arc<BookgraphServer>) -> Router {
    Router::new()
        // Graph
        .route(
            "/books",
            get(books::get_graph_handler)
                .post(books::append_graph_handler)
                .delete(books::clear_graph_handler),
        )
        .route("/books/node-attribute", post(books::node_attribute_handler))
        .route("/books/reasons-between", post(books::reasons_between_handler))

        // Summary notes
        .route(
            "/summary",
            get(summary::list_summaries_handler).post(summary::add_summary_handler),
        )
        .route(
            "/summary/:title",
            get(summary::get_summary_handler).delete(summary::delete_summary_handler),
        )

        // Health check
        .route("/health", get(health::health_check))

        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

pub use errors::ApiError;

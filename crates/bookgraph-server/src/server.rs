//! Main Bookgraph Server implementation
//!
//! This module contains the BookgraphServer implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use bookgraph_store::{DocumentBackend, GraphStore, SummaryStore};

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Main server implementation
#[derive(Debug, Clone)]
pub struct BookgraphServer {
    /// Configuration
    pub config: ServerConfig,

    /// The book exploration graph
    graph: GraphStore,

    /// Summary notes
    summaries: SummaryStore,

    /// Server address (might be different from configured if port is 0)
    address: Option<SocketAddr>,
}

impl BookgraphServer {
    /// Create a new server whose stores share one backend
    pub fn new(config: ServerConfig, backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            config,
            graph: GraphStore::new(backend.clone()),
            summaries: SummaryStore::new(backend),
            address: None,
        }
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn summaries(&self) -> &SummaryStore {
        &self.summaries
    }

    /// Run the server until ctrl-c
    pub async fn run(mut self) -> ServerResult<()> {
        info!("Starting Bookgraph Server");

        // Build the API router
        let app = crate::api::build_router(Arc::new(self.clone()));

        // Create and bind the TCP listener
        let addr = format!("{}:{}", self.config.bind_address, self.config.port);
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        // Store the actual bound address
        self.address = Some(addr);
        info!("Listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }

    /// Get the server's bound address
    pub fn address(&self) -> SocketAddr {
        self.address.unwrap_or_else(|| {
            SocketAddr::from(([127, 0, 0, 1], self.config.port))
        })
    }

    /// Check the storage both stores write through
    pub async fn check_storage_health(&self) -> ServerResult<bool> {
        Ok(self.graph.health_check().await?)
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, shutting down gracefully"),
        Err(err) => {
            warn!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

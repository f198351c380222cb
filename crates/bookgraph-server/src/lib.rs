//!
//! Bookgraph Server - HTTP front end for the book exploration graph
//!
//! This module exports all the components of the Bookgraph Server.

// External dependencies
use std::sync::Arc;

use bookgraph_store::{DocumentBackend, FileDocumentBackend, InMemoryDocumentBackend};

/// API module
pub mod api;

/// Server module
pub mod server;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

// Re-export key types
pub use config::{ServerConfig, StorageLocation};
pub use server::BookgraphServer;
pub use error::{ServerError, ServerResult};

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    let backend = create_backend(&config)?;
    let server = BookgraphServer::new(config, backend);
    server.run().await
}

/// Initialize logging
pub fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    // Create filter based on config
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Create the document backend both stores persist through
pub fn create_backend(config: &ServerConfig) -> ServerResult<Arc<dyn DocumentBackend>> {
    match config.storage_location()? {
        StorageLocation::Memory => {
            tracing::info!("Using in-memory document storage");
            Ok(Arc::new(InMemoryDocumentBackend::new()))
        }
        StorageLocation::Directory(dir) => {
            tracing::info!("Using file document storage in {}", dir.display());
            Ok(Arc::new(FileDocumentBackend::new(dir)))
        }
    }
}

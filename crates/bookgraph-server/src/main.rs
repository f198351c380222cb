use bookgraph_server::config::ServerConfig;
use anyhow::{Result, Context};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging first so configuration warnings are visible
    let defaults = ServerConfig {
        log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        ..ServerConfig::default()
    };
    bookgraph_server::init_logging(&defaults);

    // Load configuration from environment variables
    let config = ServerConfig::load()
        .context("Failed to load configuration")?;

    // Run the server using the library's run function
    bookgraph_server::run(config).await
        .context("Server error")?;

    Ok(())
}

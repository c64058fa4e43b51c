use std::path::Path;

use crate::config::WorkbenchConfig;
use crate::error::Result;
use crate::server;

/// Load the configuration from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<WorkbenchConfig> {
    match path {
        Some(path) => WorkbenchConfig::load_from(path),
        None => WorkbenchConfig::load(),
    }
}

/// Execute the `serve` command: start the HTTP server.
pub async fn execute(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = load_config(config_path)?;

    // Override config with CLI arguments
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    println!("A3S Workbench server starting...");
    println!("Listening on http://{}", config.bind_address());
    println!("Data directory: {}", config.data_dir.display());
    println!("Press Ctrl+C to stop");

    server::start(config).await
}

use clap::Parser;
use tracing_subscriber::EnvFilter;

use a3s_workbench::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "a3s_workbench=debug,tower_http=debug"
    } else {
        "a3s_workbench=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { host, port } => {
            a3s_workbench::cli::serve::execute(config_path, host, port).await?;
        }
        Commands::Config { default } => {
            a3s_workbench::cli::config::execute(config_path, default)?;
        }
    }

    Ok(())
}

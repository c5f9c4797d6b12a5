//! Topicmem CLI - MCP server exposing an in-memory topic store over stdio

use clap::Parser;
use std::path::PathBuf;
use topicmem::config::expand_path;
use topicmem::{Config, Core};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "topicmem")]
#[command(author = "Topicmem Team")]
#[command(version)]
#[command(about = "Topicmem - in-memory topic store for AI assistants (MCP over stdio)", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "TOPICMEM_CONFIG", default_value = "~/.topicmem/config.toml")]
    config: PathBuf,

    /// Override the default query limit
    #[arg(long)]
    default_limit: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initialize a new config file with defaults
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the protocol
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("topicmem={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = expand_path(&args.config);

    // Handle --init flag
    if args.init {
        if config_path.exists() {
            tracing::warn!("Config file already exists: {}", config_path.display());
            return Ok(());
        }
        Config::create_default(&config_path)?;
        tracing::info!("Created default config at: {}", config_path.display());
        return Ok(());
    }

    // Load configuration
    let mut config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        tracing::warn!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        Config::default()
    };

    // Apply CLI overrides
    if let Some(limit) = args.default_limit {
        config.query.default_limit = limit;
    }

    let core = Core::new(config)?;
    core.run_mcp().await?;

    Ok(())
}

//! pawlink-il - Identity Linking Pipeline
//!
//! Links records describing the same real-world person (donor, volunteer,
//! adopter) across independently-maintained datasets with no shared
//! identifier. Runs the normalization and linking pass for each configured
//! source in sequence and persists the resulting master identity table.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pawlink_common::{config::resolve_config_path, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "pawlink-il", about = "Cross-source identity linking pipeline")]
struct Args {
    /// Path to the TOML pipeline configuration
    #[arg(long, env = "PAWLINK_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting pawlink-il (Identity Linking)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config_path = resolve_config_path(args.config.as_deref());
    info!("Configuration: {}", config_path.display());
    let config = PipelineConfig::load(&config_path)?;

    let pool = pawlink_il::db::init_database_pool(&config.database_path).await?;
    info!("Database: {}", config.database_path.display());

    let master = pawlink_il::pipeline::run(&pool, &config).await?;
    info!(
        sources = config.sources.len(),
        identities = master.len(),
        "Pipeline complete"
    );

    Ok(())
}

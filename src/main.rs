use anime_finder::cli::FetchArgs;
use anime_finder::logging::init_tracing;
use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = dotenv();
    init_tracing();
    match loaded {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let args = FetchArgs::parse();
    let summary = anime_finder::app::run_fetch(args.into_config()).await?;
    if summary.failed > 0 {
        warn!(
            "{} of {} chunks failed; the snapshot is missing their anime",
            summary.failed,
            summary.succeeded + summary.failed
        );
    }
    Ok(())
}

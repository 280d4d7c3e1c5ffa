use crate::anilist::{AniListApi, AniListClient};
use crate::config::FetchConfig;
use crate::fetcher::BatchFetcher;
use crate::roster::Roster;
use crate::snapshot::Snapshot;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Counts reported at the end of a fetch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub fetched: usize,
    pub unique: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub bytes_written: u64,
}

pub async fn run_fetch(config: FetchConfig) -> Result<FetchSummary> {
    config.validate()?;
    let client = AniListClient::with_endpoint(&config.endpoint)?;
    info!("Using AniList endpoint: {}", client.endpoint());
    let source: Arc<dyn AniListApi> = Arc::new(client);
    run_fetch_with(source, config).await
}

/// Roster in, snapshot out. Chunk failures are counted, never returned; only a
/// bad config, an unreadable roster or an unwritable snapshot is an error.
pub async fn run_fetch_with(source: Arc<dyn AniListApi>, config: FetchConfig) -> Result<FetchSummary> {
    config.validate()?;

    let roster = Roster::load(&config.roster_path)?;
    let ids = roster.unique_ids();
    info!(
        "Loaded {} dubbed ids ({} unique) from {}",
        roster.dubbed.len(),
        ids.len(),
        config.roster_path.display()
    );

    let snapshot_path = config.snapshot_path.clone();
    let fetcher = BatchFetcher::new(source, config);
    let outcome = fetcher.fetch_all(&ids).await;

    let snapshot = Snapshot::new(outcome.records);
    let bytes_written = snapshot.write(&snapshot_path)?;

    info!("Fetched: {}", outcome.fetched);
    info!("Unique: {}", snapshot.count);
    info!(
        "Wrote {} ({:.2} MB)",
        snapshot_path.display(),
        bytes_written as f64 / 1024.0 / 1024.0
    );
    info!(
        "{} success, {} errors",
        outcome.stats.succeeded, outcome.stats.failed
    );

    Ok(FetchSummary {
        fetched: outcome.fetched,
        unique: snapshot.count,
        succeeded: outcome.stats.succeeded,
        failed: outcome.stats.failed,
        bytes_written,
    })
}

//! Chunked, wave-limited, retrying harvest of roster ids from AniList.
//!
//! Ids are split into chunks of `chunk_size`; up to `parallel` chunks are requested
//! at once (a wave), and waves run one after another with `wave_delay` between
//! them. Every chunk has its own retry budget. A chunk that fails is logged, counted
//! and contributes nothing; it never stops the rest of the run.

use futures::future::join_all;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::anilist::{AniListApi, AniListError};
use crate::config::FetchConfig;
use crate::models::AnimeRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub enum ChunkResult {
    Fetched(Vec<AnimeRecord>),
    Failed,
}

#[derive(Debug)]
pub struct FetchOutcome {
    /// Records received before deduplication.
    pub fetched: usize,
    /// Unique records, most popular first.
    pub records: Vec<AnimeRecord>,
    pub stats: ChunkStats,
}

pub struct BatchFetcher {
    source: Arc<dyn AniListApi>,
    config: FetchConfig,
}

impl BatchFetcher {
    pub fn new(source: Arc<dyn AniListApi>, config: FetchConfig) -> Self {
        Self { source, config }
    }

    pub async fn fetch_all(&self, mal_ids: &[i32]) -> FetchOutcome {
        let chunks: Vec<&[i32]> = mal_ids.chunks(self.config.chunk_size.max(1)).collect();
        let parallel = self.config.parallel.max(1);
        info!("{} chunks to fetch ({} per wave)", chunks.len(), parallel);

        let mut collected: Vec<AnimeRecord> = Vec::new();
        let mut stats = ChunkStats::default();

        for (wave_idx, wave) in chunks.chunks(parallel).enumerate() {
            let first = wave_idx * parallel;
            let results = join_all(
                wave.iter()
                    .enumerate()
                    .map(|(offset, chunk)| self.fetch_chunk(chunk, first + offset)),
            )
            .await;

            for result in results {
                match result {
                    ChunkResult::Fetched(records) => {
                        stats.succeeded += 1;
                        collected.extend(records);
                    }
                    ChunkResult::Failed => stats.failed += 1,
                }
            }

            let done = first + wave.len();
            info!(
                "{}% | {} anime",
                done * 100 / chunks.len(),
                collected.len()
            );

            if done < chunks.len() {
                sleep(self.config.wave_delay).await;
            }
        }

        let fetched = collected.len();
        FetchOutcome {
            fetched,
            records: dedupe_and_sort(collected),
            stats,
        }
    }

    async fn fetch_chunk(&self, chunk: &[i32], idx: usize) -> ChunkResult {
        let policy = &self.config.retry;
        let mut last_error: Option<AniListError> = None;

        for attempt in 0..policy.max_attempts {
            let is_last = attempt + 1 == policy.max_attempts;
            match self.source.fetch_dubbed_page(chunk).await {
                Ok(records) => {
                    debug!("chunk {} returned {} records", idx, records.len());
                    return ChunkResult::Fetched(records);
                }
                Err(e) if !e.is_retryable() => {
                    error!("GraphQL error on chunk {}: {}", idx, e);
                    return ChunkResult::Failed;
                }
                Err(AniListError::RateLimited) => {
                    last_error = Some(AniListError::RateLimited);
                    if is_last {
                        break;
                    }
                    let wait = policy.rate_limit_wait(attempt);
                    warn!(
                        "Rate limit on chunk {} - waiting {:.1}s",
                        idx,
                        wait.as_secs_f32()
                    );
                    sleep(wait).await;
                }
                Err(e) => {
                    warn!(
                        "chunk {} attempt {}/{} failed: {}",
                        idx,
                        attempt + 1,
                        policy.max_attempts,
                        e
                    );
                    last_error = Some(e);
                    if is_last {
                        break;
                    }
                    sleep(policy.retry_delay).await;
                }
            }
        }

        match last_error {
            Some(e) => error!("Failed chunk {} after {} attempts: {}", idx, policy.max_attempts, e),
            None => error!("Failed chunk {} after {} attempts", idx, policy.max_attempts),
        }
        ChunkResult::Failed
    }
}

/// Collapses records sharing an `id` (the later copy replaces the earlier one in
/// place) and orders by popularity, highest first, missing as zero. The sort is
/// stable, so ties keep first-seen order.
pub fn dedupe_and_sort(records: Vec<AnimeRecord>) -> Vec<AnimeRecord> {
    let mut position: HashMap<i32, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<AnimeRecord> = Vec::with_capacity(records.len());
    for record in records {
        match position.get(&record.id) {
            Some(&pos) => unique[pos] = record,
            None => {
                position.insert(record.id, unique.len());
                unique.push(record);
            }
        }
    }
    unique.sort_by_key(|r| Reverse(r.popularity_or_zero()));
    unique
}

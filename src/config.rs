use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::anilist::{ANILIST_ENDPOINT, MAX_PER_PAGE};

pub const DEFAULT_ROSTER_PATH: &str = "data/dubinfo.json";
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/animeData.json";
pub const DEFAULT_CHUNK_SIZE: usize = 50;
pub const DEFAULT_PARALLEL: usize = 3;
pub const DEFAULT_WAVE_DELAY_MS: u64 = 350;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Per-chunk retry schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub rate_limit_base: Duration,
    pub rate_limit_step: Duration,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_base: Duration::from_millis(5000),
            rate_limit_step: Duration::from_millis(2000),
            retry_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// Wait after a 429 on the given zero-based attempt.
    pub fn rate_limit_wait(&self, attempt: u32) -> Duration {
        self.rate_limit_base + self.rate_limit_step * attempt
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub endpoint: String,
    pub roster_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub chunk_size: usize,
    pub parallel: usize,
    pub wave_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: ANILIST_ENDPOINT.to_string(),
            roster_path: PathBuf::from(DEFAULT_ROSTER_PATH),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: DEFAULT_PARALLEL,
            wave_delay: Duration::from_millis(DEFAULT_WAVE_DELAY_MS),
            retry: RetryPolicy::default(),
        }
    }
}

impl FetchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_PER_PAGE {
            bail!(
                "chunk size must be between 1 and {} (got {})",
                MAX_PER_PAGE,
                self.chunk_size
            );
        }
        if self.parallel == 0 {
            bail!("parallel requests per wave must be at least 1");
        }
        if self.retry.max_attempts == 0 {
            bail!("max attempts must be at least 1");
        }
        if self.endpoint.trim().is_empty() {
            bail!("AniList endpoint must not be empty");
        }
        Ok(())
    }
}

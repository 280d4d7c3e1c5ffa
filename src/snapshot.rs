//! The JSON document shared by the fetcher and the catalog.

use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::AnimeRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Absent in hand-edited or truncated files; readers show it as unknown.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub anime: Vec<AnimeRecord>,
}

impl Snapshot {
    pub fn new(anime: Vec<AnimeRecord>) -> Self {
        Self::at(Utc::now(), anime)
    }

    /// Timestamps are kept at millisecond precision, matching what browsers emit.
    pub fn at(last_updated: DateTime<Utc>, anime: Vec<AnimeRecord>) -> Self {
        Self {
            last_updated: Some(last_updated.trunc_subsecs(3)),
            count: anime.len(),
            anime,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }

    /// Writes compact JSON and returns the number of bytes written. The file is
    /// replaced atomically so a reader never sees a half-written snapshot.
    pub fn write(&self, path: &Path) -> Result<u64> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let bytes = serde_json::to_vec(self).context("Failed to serialize snapshot")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;
        Ok(bytes.len() as u64)
    }
}

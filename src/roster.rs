use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// The list of MyAnimeList ids known to have an English dub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub dubbed: Vec<i32>,
}

impl Roster {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse roster {}", path.display()))
    }

    /// Roster ids in file order with repeats dropped.
    pub fn unique_ids(&self) -> Vec<i32> {
        dedupe_preserve_order(&self.dubbed)
    }
}

fn dedupe_preserve_order(items: &[i32]) -> Vec<i32> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for &item in items {
        if seen.insert(item) {
            out.push(item);
        }
    }
    out
}

//! Command-line arguments for the `fetch_anime` and `catalog` binaries.
//!
//! Paths and the endpoint can also come from the environment (or a `.env` file)
//! so a scheduled fetch needs no flags at all.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::anilist::ANILIST_ENDPOINT;
use crate::catalog::filter::canonical_genre;
use crate::catalog::{FilterState, GroupingStrategy, ScoreBucket};
use crate::config::{
    FetchConfig, RetryPolicy, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_ATTEMPTS, DEFAULT_PARALLEL,
    DEFAULT_ROSTER_PATH, DEFAULT_SNAPSHOT_PATH, DEFAULT_WAVE_DELAY_MS,
};

/// Fetch every dubbed anime on the roster from AniList into a snapshot file.
#[derive(Debug, Parser)]
#[command(name = "fetch_anime")]
#[command(version, long_about = None)]
pub struct FetchArgs {
    /// Roster JSON with a `dubbed` array of MyAnimeList ids
    #[arg(long, env = "ANIME_FINDER_ROSTER", default_value = DEFAULT_ROSTER_PATH)]
    pub roster: PathBuf,

    /// Where the snapshot is written
    #[arg(long, env = "ANIME_FINDER_SNAPSHOT", default_value = DEFAULT_SNAPSHOT_PATH)]
    pub output: PathBuf,

    #[arg(long, env = "ANILIST_ENDPOINT", default_value = ANILIST_ENDPOINT)]
    pub endpoint: String,

    /// Ids per request (at most 50)
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Requests in flight per wave
    #[arg(long, default_value_t = DEFAULT_PARALLEL)]
    pub parallel: usize,

    /// Pause between waves, in milliseconds
    #[arg(long, default_value_t = DEFAULT_WAVE_DELAY_MS)]
    pub wave_delay_ms: u64,

    /// Attempts per chunk before giving up on it
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl FetchArgs {
    pub fn into_config(self) -> FetchConfig {
        FetchConfig {
            endpoint: self.endpoint,
            roster_path: self.roster,
            snapshot_path: self.output,
            chunk_size: self.chunk_size,
            parallel: self.parallel,
            wave_delay: Duration::from_millis(self.wave_delay_ms),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                ..RetryPolicy::default()
            },
        }
    }
}

/// Browse the dubbed anime snapshot.
#[derive(Debug, Parser)]
#[command(name = "catalog")]
#[command(version, long_about = None)]
pub struct CatalogArgs {
    /// Snapshot produced by fetch_anime
    #[arg(long, env = "ANIME_FINDER_SNAPSHOT", default_value = DEFAULT_SNAPSHOT_PATH)]
    pub snapshot: PathBuf,

    /// Hidden list file (defaults to the user data directory)
    #[arg(long, env = "ANIME_FINDER_HIDDEN")]
    pub hidden_store: Option<PathBuf>,

    #[command(flatten)]
    pub list: ListArgs,

    #[command(subcommand)]
    pub command: Option<CatalogCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Hide anime by AniList id
    Hide {
        #[arg(required = true)]
        ids: Vec<i32>,
    },

    /// Bring hidden anime back
    #[command(alias = "unhide")]
    Restore {
        #[arg(required = true)]
        ids: Vec<i32>,
    },

    /// Show everything that is hidden
    Hidden,

    /// Forget every hidden id
    ClearHidden,

    /// Show the values the filter flags accept
    Choices,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Start years to show; without any, only 2010 onward is listed
    #[arg(long = "year", value_delimiter = ',')]
    pub years: Vec<i32>,

    /// Score range floor (60, 70, 80 or 90 keeps [floor, floor + 10))
    #[arg(long)]
    pub score: Option<ScoreBucket>,

    /// Genres every entry must have
    #[arg(long = "genre", value_delimiter = ',')]
    pub genres: Vec<String>,

    /// Genres no entry may have
    #[arg(long = "exclude-genre", value_delimiter = ',')]
    pub exclude_genres: Vec<String>,

    /// Fold franchise entries into one card
    #[arg(long)]
    pub group: bool,

    #[arg(long, value_enum, default_value_t = GroupingStrategy::default())]
    pub strategy: GroupingStrategy,

    /// One line per card
    #[arg(long)]
    pub compact: bool,

    /// List related entries under each grouped card
    #[arg(long)]
    pub expand: bool,
}

impl ListArgs {
    pub fn to_filter_state(&self) -> Result<FilterState> {
        let include: BTreeSet<String> = self.genres.iter().map(|g| canonical_genre(g)).collect();
        let exclude: BTreeSet<String> =
            self.exclude_genres.iter().map(|g| canonical_genre(g)).collect();
        if let Some(both) = include.intersection(&exclude).next() {
            bail!("genre {} cannot be both required and excluded", both);
        }

        let mut state = FilterState::new();
        for year in self.years.iter().collect::<BTreeSet<_>>() {
            state.toggle_year(*year);
        }
        if let Some(bucket) = self.score {
            state.select_score(bucket);
        }
        for genre in &include {
            state.toggle_include_genre(genre);
        }
        for genre in &exclude {
            state.toggle_exclude_genre(genre);
        }
        if self.group {
            state.set_grouping(Some(self.strategy));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_defaults_match_config_defaults() {
        let args = FetchArgs::try_parse_from(["fetch_anime"]).unwrap();
        let config = args.into_config();
        let defaults = FetchConfig::default();
        assert_eq!(config.chunk_size, defaults.chunk_size);
        assert_eq!(config.parallel, defaults.parallel);
        assert_eq!(config.wave_delay, defaults.wave_delay);
        assert_eq!(config.retry, defaults.retry);
    }

    #[test]
    fn fetch_flags_override_tunables() {
        let args = FetchArgs::try_parse_from([
            "fetch_anime",
            "--roster",
            "ids.json",
            "--output",
            "out.json",
            "--chunk-size",
            "10",
            "--max-attempts",
            "2",
        ])
        .unwrap();
        let config = args.into_config();
        assert_eq!(config.roster_path, PathBuf::from("ids.json"));
        assert_eq!(config.snapshot_path, PathBuf::from("out.json"));
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.retry.max_attempts, 2);
    }

    #[test]
    fn list_flags_build_filter_state() {
        let args = CatalogArgs::try_parse_from([
            "catalog",
            "--year",
            "2019,2020",
            "--score",
            "80",
            "--genre",
            "action",
            "--exclude-genre",
            "Horror",
            "--group",
            "--strategy",
            "title-heuristic",
        ])
        .unwrap();
        let state = args.list.to_filter_state().unwrap();
        assert_eq!(state.years().iter().copied().collect::<Vec<_>>(), vec![2019, 2020]);
        assert_eq!(state.score(), Some(ScoreBucket::new(80).unwrap()));
        assert!(state.include_genres().contains("Action"));
        assert!(state.exclude_genres().contains("Horror"));
        assert_eq!(state.grouping(), Some(GroupingStrategy::TitleHeuristic));
    }

    #[test]
    fn repeated_year_is_kept_once() {
        let args = CatalogArgs::try_parse_from(["catalog", "--year", "2020", "--year", "2020"]).unwrap();
        let state = args.list.to_filter_state().unwrap();
        assert_eq!(state.years().len(), 1);
    }

    #[test]
    fn genre_in_both_lists_is_rejected() {
        let args =
            CatalogArgs::try_parse_from(["catalog", "--genre", "Drama", "--exclude-genre", "drama"])
                .unwrap();
        assert!(args.list.to_filter_state().is_err());
    }

    #[test]
    fn bad_score_bucket_is_a_parse_error() {
        assert!(CatalogArgs::try_parse_from(["catalog", "--score", "75"]).is_err());
        assert!(CatalogArgs::try_parse_from(["catalog", "--score", "100"]).is_err());
        assert!(CatalogArgs::try_parse_from(["catalog", "--score", "50"]).is_err());
    }

    #[test]
    fn choices_subcommand_parses() {
        let args = CatalogArgs::try_parse_from(["catalog", "choices"]).unwrap();
        assert!(matches!(args.command, Some(CatalogCommand::Choices)));
    }

    #[test]
    fn hide_subcommand_takes_ids() {
        let args = CatalogArgs::try_parse_from(["catalog", "hide", "1", "2"]).unwrap();
        match args.command {
            Some(CatalogCommand::Hide { ids }) => assert_eq!(ids, vec![1, 2]),
            other => panic!("unexpected command {other:?}"),
        }
    }
}

//! Plain-text cards for the terminal listing.

use chrono::{DateTime, Utc};
use std::fmt::Write as _;

use super::filter::{year_choices, GENRES, SCORE_BUCKETS};
use super::group::FranchiseGroup;
use super::text::clean_description;
use crate::models::{AnimeRecord, RelationNode};

pub const DEFAULT_ACCENT: &str = "#8b5cf6";
pub const WATCH_SEARCH_URL: &str = "https://www.crunchyroll.com/search?q=";
pub const EMPTY_VIEW_MESSAGE: &str = "No anime found matching your criteria.";

const FULL_GENRES: usize = 3;
const COMPACT_GENRES: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardStyle {
    /// One line per entry, two genres, blank year when unknown.
    pub compact: bool,
    /// List the related entries under the representative.
    pub expand: bool,
}

pub fn format_score(score: Option<i32>) -> String {
    match score {
        Some(s) => format!("{:.1}", f64::from(s) / 10.0),
        None => "N/A".to_string(),
    }
}

pub fn format_year(year: Option<i32>, compact: bool) -> String {
    match year {
        Some(y) => y.to_string(),
        None if compact => String::new(),
        None => "TBA".to_string(),
    }
}

pub fn format_episodes(episodes: Option<i32>) -> String {
    episodes.map_or_else(|| "?".to_string(), |e| e.to_string())
}

pub fn format_popularity(popularity: Option<i64>) -> String {
    match popularity {
        Some(p) => format!("{}k", (p as f64 / 1000.0).round() as i64),
        None => "?".to_string(),
    }
}

pub fn accent_color(record: &AnimeRecord) -> &str {
    record
        .accent_color()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(DEFAULT_ACCENT)
}

pub fn watch_url(record: &AnimeRecord) -> String {
    format!(
        "{}{}",
        WATCH_SEARCH_URL,
        urlencoding::encode(record.display_title())
    )
}

pub fn related_label(count: usize) -> String {
    if count == 1 {
        "1 related season".to_string()
    } else {
        format!("{count} related seasons")
    }
}

fn genre_list(record: &AnimeRecord, limit: usize) -> String {
    record
        .genres()
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_card(group: &FranchiseGroup<'_>, style: CardStyle) -> String {
    let mut out = if style.compact {
        compact_line(group.representative)
    } else {
        full_card(group.representative)
    };

    let related = group.related_count();
    if related > 0 {
        let _ = write!(out, "\n  + {}", related_label(related));
        if style.expand {
            for record in &group.related {
                let _ = write!(out, "\n    - {}", related_line(record));
            }
            for node in &group.related_nodes {
                let _ = write!(out, "\n    - {}", node_line(node));
            }
        }
    }
    out
}

fn full_card(record: &AnimeRecord) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "[{}] {} ({})  {}",
        record.id,
        record.display_title(),
        format_year(record.year(), false),
        accent_color(record)
    );
    if let Some(romaji) = record.title.as_ref().and_then(|t| t.distinct_romaji()) {
        let _ = write!(out, "\n  {romaji}");
    }
    let _ = write!(
        out,
        "\n  Score {} | {} eps | {} fans",
        format_score(record.average_score),
        format_episodes(record.episodes),
        format_popularity(record.popularity)
    );
    if let Some(format) = record.format.as_deref() {
        let _ = write!(out, " | {format}");
    }
    let genres = genre_list(record, FULL_GENRES);
    if !genres.is_empty() {
        let _ = write!(out, "\n  {genres}");
    }
    let _ = write!(out, "\n  {}", clean_description(record.description.as_deref()));
    let _ = write!(out, "\n  Watch: {}", watch_url(record));
    out
}

fn compact_line(record: &AnimeRecord) -> String {
    let mut out = format!("[{}] {}", record.id, record.display_title());
    let year = format_year(record.year(), true);
    if !year.is_empty() {
        let _ = write!(out, " ({year})");
    }
    let _ = write!(out, " | {}", format_score(record.average_score));
    let genres = genre_list(record, COMPACT_GENRES);
    if !genres.is_empty() {
        let _ = write!(out, " | {genres}");
    }
    out
}

fn related_line(record: &AnimeRecord) -> String {
    summary_entry(
        record.id,
        record.display_title(),
        record.year(),
        record.episodes,
        record.average_score,
        record.popularity,
    )
}

fn node_line(node: &RelationNode) -> String {
    summary_entry(
        node.id,
        node.display_title(),
        node.year(),
        node.episodes,
        node.average_score,
        node.popularity,
    )
}

fn summary_entry(
    id: i32,
    title: &str,
    year: Option<i32>,
    episodes: Option<i32>,
    score: Option<i32>,
    popularity: Option<i64>,
) -> String {
    format!(
        "[{}] {} ({}) | {} eps | {} | {} fans",
        id,
        title,
        format_year(year, false),
        format_episodes(episodes),
        format_score(score),
        format_popularity(popularity)
    )
}

pub fn summary_line(shown: usize, total: usize) -> String {
    if shown == total {
        format!("Showing {shown} anime")
    } else {
        format!("Showing {shown} anime (filtered from {total} total)")
    }
}

pub fn updated_line(last_updated: Option<DateTime<Utc>>) -> String {
    match last_updated {
        Some(ts) => format!("Data updated {}", ts.format("%Y-%m-%d")),
        None => "Data updated unknown".to_string(),
    }
}

/// The values each filter flag accepts.
pub fn render_choices(current_year: i32) -> String {
    let years: Vec<String> = year_choices(current_year)
        .iter()
        .map(|y| y.to_string())
        .collect();
    let scores: Vec<String> = SCORE_BUCKETS
        .iter()
        .map(|b| format!("{b} ({}.0-{}.9)", b / 10, b / 10))
        .collect();
    format!(
        "Years: {}\nScores: {}\nGenres: {}",
        years.join(", "),
        scores.join(", "),
        GENRES.join(", ")
    )
}

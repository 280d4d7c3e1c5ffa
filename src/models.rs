//! Snapshot record types.
//!
//! Field names follow the AniList GraphQL payload so that a snapshot written by the
//! fetcher is the same document shape the API returned. Everything except `id` is
//! optional; consumers render placeholders for missing values.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_TITLE: &str = "Unknown Title";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeRecord {
    pub id: i32,
    pub id_mal: Option<i32>,
    pub title: Option<MediaTitle>,
    pub cover_image: Option<CoverImage>,
    pub start_date: Option<FuzzyDate>,
    pub episodes: Option<i32>,
    pub average_score: Option<i32>,
    pub popularity: Option<i64>,
    pub genres: Option<Vec<String>>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub relations: Option<RelationConnection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationConnection {
    pub edges: Option<Vec<RelationEdge>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationEdge {
    pub relation_type: Option<RelationKind>,
    pub node: Option<RelationNode>,
}

/// Summary of the media on the far side of a relation edge. Relations of relations
/// are never requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationNode {
    pub id: i32,
    pub id_mal: Option<i32>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub title: Option<MediaTitle>,
    pub cover_image: Option<CoverImage>,
    pub start_date: Option<FuzzyDate>,
    pub episodes: Option<i32>,
    pub average_score: Option<i32>,
    pub popularity: Option<i64>,
}

/// AniList `relationType`. Kinds outside the franchise set are kept verbatim so a
/// snapshot round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    Sequel,
    Prequel,
    Parent,
    SideStory,
    Alternative,
    Other(String),
}

impl RelationKind {
    pub fn as_str(&self) -> &str {
        match self {
            RelationKind::Sequel => "SEQUEL",
            RelationKind::Prequel => "PREQUEL",
            RelationKind::Parent => "PARENT",
            RelationKind::SideStory => "SIDE_STORY",
            RelationKind::Alternative => "ALTERNATIVE",
            RelationKind::Other(raw) => raw,
        }
    }

    /// Kinds that place two entries in the same franchise.
    pub fn is_franchise(&self) -> bool {
        !matches!(self, RelationKind::Other(_))
    }
}

impl From<String> for RelationKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "SEQUEL" => RelationKind::Sequel,
            "PREQUEL" => RelationKind::Prequel,
            "PARENT" => RelationKind::Parent,
            "SIDE_STORY" => RelationKind::SideStory,
            "ALTERNATIVE" => RelationKind::Alternative,
            _ => RelationKind::Other(raw),
        }
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        match kind {
            RelationKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl MediaTitle {
    /// English if present, otherwise romaji. Blank strings count as missing.
    pub fn preferred(&self) -> Option<&str> {
        non_blank(self.english.as_deref()).or_else(|| non_blank(self.romaji.as_deref()))
    }

    /// Romaji, but only when it adds something over the English title.
    pub fn distinct_romaji(&self) -> Option<&str> {
        let english = non_blank(self.english.as_deref())?;
        let romaji = non_blank(self.romaji.as_deref())?;
        (english != romaji).then_some(romaji)
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

impl AnimeRecord {
    pub fn display_title(&self) -> &str {
        self.title
            .as_ref()
            .and_then(MediaTitle::preferred)
            .unwrap_or(UNKNOWN_TITLE)
    }

    pub fn year(&self) -> Option<i32> {
        self.start_date.as_ref().and_then(|d| d.year)
    }

    pub fn popularity_or_zero(&self) -> i64 {
        self.popularity.unwrap_or(0)
    }

    pub fn genres(&self) -> &[String] {
        self.genres.as_deref().unwrap_or_default()
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres().iter().any(|g| g == genre)
    }

    pub fn accent_color(&self) -> Option<&str> {
        self.cover_image.as_ref().and_then(|c| c.color.as_deref())
    }

    pub fn relation_edges(&self) -> &[RelationEdge] {
        self.relations
            .as_ref()
            .and_then(|r| r.edges.as_deref())
            .unwrap_or_default()
    }

    /// Anime on the far side of a franchise-kind relation edge.
    pub fn franchise_nodes(&self) -> impl Iterator<Item = &RelationNode> + '_ {
        self.relation_edges().iter().filter_map(|edge| {
            let kind = edge.relation_type.as_ref()?;
            let node = edge.node.as_ref()?;
            (kind.is_franchise() && node.is_anime()).then_some(node)
        })
    }

    pub fn franchise_links(&self) -> impl Iterator<Item = i32> + '_ {
        self.franchise_nodes().map(|node| node.id)
    }
}

impl RelationNode {
    pub fn display_title(&self) -> &str {
        self.title
            .as_ref()
            .and_then(MediaTitle::preferred)
            .unwrap_or(UNKNOWN_TITLE)
    }

    pub fn year(&self) -> Option<i32> {
        self.start_date.as_ref().and_then(|d| d.year)
    }

    /// Older snapshots may lack `type`; those nodes are assumed to be anime.
    pub fn is_anime(&self) -> bool {
        self.media_type.as_deref().map_or(true, |t| t == "ANIME")
    }
}

use anyhow::{bail, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::group::GroupingStrategy;
use super::hidden::HiddenSet;
use crate::models::AnimeRecord;

/// With no year selected, only titles from this year on are shown.
pub const DEFAULT_MIN_YEAR: i32 = 2010;
pub const SCORE_BUCKET_SIZE: i32 = 10;
pub const SCORE_BUCKETS: [i32; 4] = [60, 70, 80, 90];
/// How many years the year picker offers, counting back from the current one.
pub const YEAR_CHOICES: i32 = 16;

pub const GENRES: [&str; 17] = [
    "Action",
    "Adventure",
    "Comedy",
    "Drama",
    "Ecchi",
    "Fantasy",
    "Horror",
    "Mecha",
    "Music",
    "Mystery",
    "Psychological",
    "Romance",
    "Sci-Fi",
    "Slice of Life",
    "Sports",
    "Supernatural",
    "Thriller",
];

/// Lower bound of a ten-point score range; 70 keeps scores in `[70, 80)`.
/// Only the floors in `SCORE_BUCKETS` are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScoreBucket(i32);

impl ScoreBucket {
    pub fn new(floor: i32) -> Result<Self> {
        if !SCORE_BUCKETS.contains(&floor) {
            bail!(
                "score bucket must be one of {:?} (got {})",
                SCORE_BUCKETS,
                floor
            );
        }
        Ok(Self(floor))
    }

    pub fn floor(self) -> i32 {
        self.0
    }

    pub fn contains(self, score: Option<i32>) -> bool {
        score.is_some_and(|s| s >= self.0 && s < self.0 + SCORE_BUCKET_SIZE)
    }
}

impl FromStr for ScoreBucket {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let floor: i32 = s.trim().parse()?;
        Self::new(floor)
    }
}

impl fmt::Display for ScoreBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 / SCORE_BUCKET_SIZE)
    }
}

/// Year choices offered by the picker, newest first.
pub fn year_choices(current_year: i32) -> Vec<i32> {
    (0..YEAR_CHOICES).map(|i| current_year - i).collect()
}

/// Maps user input onto a known genre name, ignoring case. Unknown names pass
/// through unchanged since snapshots can carry genres outside the fixed list.
pub fn canonical_genre(name: &str) -> String {
    let trimmed = name.trim();
    GENRES
        .iter()
        .find(|g| g.eq_ignore_ascii_case(trimmed))
        .map(|g| g.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Everything the user has chosen that shapes the displayed list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    years: BTreeSet<i32>,
    score: Option<ScoreBucket>,
    include_genres: BTreeSet<String>,
    exclude_genres: BTreeSet<String>,
    grouping: Option<GroupingStrategy>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn score(&self) -> Option<ScoreBucket> {
        self.score
    }

    pub fn include_genres(&self) -> &BTreeSet<String> {
        &self.include_genres
    }

    pub fn exclude_genres(&self) -> &BTreeSet<String> {
        &self.exclude_genres
    }

    pub fn grouping(&self) -> Option<GroupingStrategy> {
        self.grouping
    }

    pub fn toggle_year(&mut self, year: i32) {
        if !self.years.remove(&year) {
            self.years.insert(year);
        }
    }

    pub fn clear_years(&mut self) {
        self.years.clear();
    }

    /// Picking the active bucket again switches the score filter off.
    pub fn select_score(&mut self, bucket: ScoreBucket) {
        self.score = if self.score == Some(bucket) {
            None
        } else {
            Some(bucket)
        };
    }

    pub fn clear_score(&mut self) {
        self.score = None;
    }

    pub fn toggle_include_genre(&mut self, genre: &str) {
        let genre = canonical_genre(genre);
        self.exclude_genres.remove(&genre);
        if !self.include_genres.remove(&genre) {
            self.include_genres.insert(genre);
        }
    }

    pub fn toggle_exclude_genre(&mut self, genre: &str) {
        let genre = canonical_genre(genre);
        self.include_genres.remove(&genre);
        if !self.exclude_genres.remove(&genre) {
            self.exclude_genres.insert(genre);
        }
    }

    pub fn clear_genres(&mut self) {
        self.include_genres.clear();
        self.exclude_genres.clear();
    }

    pub fn set_grouping(&mut self, grouping: Option<GroupingStrategy>) {
        self.grouping = grouping;
    }

    pub fn toggle_grouping(&mut self, strategy: GroupingStrategy) {
        self.grouping = match self.grouping {
            Some(_) => None,
            None => Some(strategy),
        };
    }

    /// Runs the predicates in their fixed order: hidden, year, score, included
    /// genres, excluded genres. Input order is preserved.
    pub fn apply<'a>(&self, records: &'a [AnimeRecord], hidden: &HiddenSet) -> Vec<&'a AnimeRecord> {
        records
            .iter()
            .filter(|r| !hidden.contains(r.id))
            .filter(|r| self.matches_year(r))
            .filter(|r| self.score.map_or(true, |b| b.contains(r.average_score)))
            .filter(|r| self.include_genres.iter().all(|g| r.has_genre(g)))
            .filter(|r| !self.exclude_genres.iter().any(|g| r.has_genre(g)))
            .collect()
    }

    fn matches_year(&self, record: &AnimeRecord) -> bool {
        if self.years.is_empty() {
            record.year().unwrap_or(0) >= DEFAULT_MIN_YEAR
        } else {
            record.year().is_some_and(|y| self.years.contains(&y))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::hidden::MemoryHiddenStore;
    use serde_json::json;

    fn anime(id: i32, year: Option<i32>, score: Option<i32>, genres: &[&str]) -> AnimeRecord {
        serde_json::from_value(json!({
            "id": id,
            "startDate": { "year": year },
            "averageScore": score,
            "genres": genres,
        }))
        .expect("record")
    }

    fn no_hidden() -> HiddenSet {
        HiddenSet::load(Box::new(MemoryHiddenStore::new())).unwrap()
    }

    fn ids(records: &[&AnimeRecord]) -> Vec<i32> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn default_year_floor_is_2010() {
        let records = vec![
            anime(1, Some(2009), None, &[]),
            anime(2, Some(2010), None, &[]),
            anime(3, None, None, &[]),
            anime(4, Some(2024), None, &[]),
        ];
        let state = FilterState::new();
        assert_eq!(ids(&state.apply(&records, &no_hidden())), vec![2, 4]);
    }

    #[test]
    fn explicit_years_override_default_floor() {
        let records = vec![
            anime(1, Some(2005), None, &[]),
            anime(2, Some(2015), None, &[]),
            anime(3, None, None, &[]),
        ];
        let mut state = FilterState::new();
        state.toggle_year(2005);
        assert_eq!(ids(&state.apply(&records, &no_hidden())), vec![1]);
        state.toggle_year(2005);
        assert!(state.years().is_empty());
    }

    #[test]
    fn score_bucket_keeps_half_open_range() {
        let records = vec![
            anime(1, Some(2020), Some(69), &[]),
            anime(2, Some(2020), Some(70), &[]),
            anime(3, Some(2020), Some(79), &[]),
            anime(4, Some(2020), Some(80), &[]),
            anime(5, Some(2020), None, &[]),
        ];
        let mut state = FilterState::new();
        state.select_score(ScoreBucket::new(70).unwrap());
        assert_eq!(ids(&state.apply(&records, &no_hidden())), vec![2, 3]);
    }

    #[test]
    fn selecting_active_bucket_clears_it() {
        let mut state = FilterState::new();
        let bucket: ScoreBucket = "80".parse().unwrap();
        state.select_score(bucket);
        state.select_score(bucket);
        assert_eq!(state.score(), None);
        assert_eq!(bucket.to_string(), "8");
    }

    #[test]
    fn rejects_buckets_outside_the_offered_list() {
        assert!(ScoreBucket::new(75).is_err());
        assert!(ScoreBucket::new(0).is_err());
        assert!(ScoreBucket::new(50).is_err());
        assert!(ScoreBucket::new(100).is_err());
        assert!("abc".parse::<ScoreBucket>().is_err());
        for floor in SCORE_BUCKETS {
            assert_eq!(ScoreBucket::new(floor).unwrap().floor(), floor);
        }
    }

    #[test]
    fn clear_operations_reset_each_control() {
        let mut state = FilterState::new();
        state.toggle_year(2020);
        state.toggle_year(2021);
        state.select_score(ScoreBucket::new(60).unwrap());
        state.toggle_include_genre("Action");
        state.toggle_exclude_genre("Horror");
        state.set_grouping(Some(GroupingStrategy::RelationGraph));

        state.clear_years();
        assert!(state.years().is_empty());
        assert!(state.score().is_some());

        state.clear_score();
        assert_eq!(state.score(), None);
        assert_eq!(state.include_genres().len(), 1);

        state.clear_genres();
        assert!(state.include_genres().is_empty());
        assert!(state.exclude_genres().is_empty());
        assert_eq!(state.grouping(), Some(GroupingStrategy::RelationGraph));

        state.set_grouping(None);
        assert_eq!(state, FilterState::new());
    }

    #[test]
    fn include_is_conjunction_and_exclude_is_negated_disjunction() {
        let records = vec![
            anime(1, Some(2020), None, &["Action", "Drama"]),
            anime(2, Some(2020), None, &["Action"]),
            anime(3, Some(2020), None, &["Action", "Drama", "Horror"]),
            anime(4, Some(2020), None, &["Action", "Drama", "Romance"]),
        ];
        let mut state = FilterState::new();
        state.toggle_include_genre("Action");
        state.toggle_include_genre("drama");
        assert_eq!(ids(&state.apply(&records, &no_hidden())), vec![1, 3, 4]);

        state.toggle_exclude_genre("Horror");
        state.toggle_exclude_genre("Romance");
        assert_eq!(ids(&state.apply(&records, &no_hidden())), vec![1]);
    }

    #[test]
    fn genre_cannot_be_included_and_excluded() {
        let mut state = FilterState::new();
        state.toggle_include_genre("Comedy");
        state.toggle_exclude_genre("Comedy");
        assert!(state.include_genres().is_empty());
        assert!(state.exclude_genres().contains("Comedy"));

        state.toggle_include_genre("comedy");
        assert!(state.exclude_genres().is_empty());
        assert!(state.include_genres().contains("Comedy"));
    }

    #[test]
    fn hidden_records_are_dropped_first() {
        let records = vec![anime(1, Some(2020), None, &[]), anime(2, Some(2020), None, &[])];
        let mut hidden = no_hidden();
        hidden.hide(1).unwrap();
        assert_eq!(ids(&FilterState::new().apply(&records, &hidden)), vec![2]);
    }

    #[test]
    fn year_choices_count_back_from_current() {
        let years = year_choices(2025);
        assert_eq!(years.len(), 16);
        assert_eq!(years.first(), Some(&2025));
        assert_eq!(years.last(), Some(&2010));
    }

    #[test]
    fn toggle_grouping_flips() {
        let mut state = FilterState::new();
        state.toggle_grouping(GroupingStrategy::TitleHeuristic);
        assert_eq!(state.grouping(), Some(GroupingStrategy::TitleHeuristic));
        state.toggle_grouping(GroupingStrategy::TitleHeuristic);
        assert_eq!(state.grouping(), None);
    }
}

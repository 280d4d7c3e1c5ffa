use anime_finder::catalog::card::updated_line;
use anime_finder::catalog::{
    Catalog, CatalogView, FileHiddenStore, FilterState, GroupingStrategy, HiddenStore,
    ScoreBucket,
};
use anime_finder::models::AnimeRecord;
use anime_finder::snapshot::Snapshot;
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

fn snapshot() -> Snapshot {
    let anime: Vec<AnimeRecord> = serde_json::from_value(json!([
        {
            "id": 101, "title": { "english": "Sky Knights" }, "startDate": { "year": 2014 },
            "averageScore": 78, "popularity": 90000, "genres": ["Action", "Fantasy"],
            "relations": { "edges": [{ "relationType": "SEQUEL", "node": { "id": 102, "type": "ANIME" } }] }
        },
        {
            "id": 102, "title": { "english": "Sky Knights: Storm Front" }, "startDate": { "year": 2016 },
            "averageScore": 81, "popularity": 60000, "genres": ["Action", "Fantasy"],
            "relations": { "edges": [
                { "relationType": "PREQUEL", "node": { "id": 101, "type": "ANIME" } },
                { "relationType": "SEQUEL", "node": { "id": 103, "type": "ANIME" } }
            ] }
        },
        {
            "id": 103, "title": { "english": "Iron Bloom" }, "startDate": { "year": 2019 },
            "averageScore": 74, "popularity": 40000, "genres": ["Action", "Drama"],
            "relations": { "edges": [{ "relationType": "PREQUEL", "node": { "id": 102, "type": "ANIME" } }] }
        },
        {
            "id": 200, "title": { "romaji": "Shizuka na Mori" }, "startDate": { "year": 2021 },
            "averageScore": 72, "popularity": 30000, "genres": ["Slice of Life"]
        },
        {
            "id": 300, "title": { "english": "Old Guard" }, "startDate": { "year": 2004 },
            "averageScore": 88, "popularity": 80000, "genres": ["Action"]
        },
        { "id": 400 }
    ]))
    .expect("records");
    Snapshot::at(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(), anime)
}

struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "anime_finder_catalog_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn store_path(&self) -> PathBuf {
        self.dir.join("anime-finder-hidden.json")
    }

    fn store(&self) -> Box<FileHiddenStore> {
        Box::new(FileHiddenStore::new(self.store_path()))
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn ids(view: &CatalogView<'_>) -> Vec<i32> {
    view.entries().iter().map(|g| g.representative.id).collect()
}

#[test]
fn default_view_hides_old_and_undated_entries() {
    let ws = Workspace::new("default");
    let catalog = Catalog::open(snapshot(), ws.store()).unwrap();
    let view = catalog.view(&FilterState::new());
    assert_eq!(ids(&view), vec![101, 102, 103, 200]);
    assert_eq!(
        catalog.summary_line(&view),
        "Showing 4 anime (filtered from 6 total)"
    );
}

#[test]
fn hidden_entries_stay_hidden_after_reload() {
    let ws = Workspace::new("reload");
    let path = ws.store_path();

    let mut catalog = Catalog::open(snapshot(), ws.store()).unwrap();
    assert!(catalog.hide(200).unwrap());
    assert!(catalog.hide(103).unwrap());
    assert_eq!(ids(&catalog.view(&FilterState::new())), vec![101, 102]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "[103,200]");

    let mut reopened = Catalog::open(snapshot(), ws.store()).unwrap();
    assert_eq!(ids(&reopened.view(&FilterState::new())), vec![101, 102]);

    reopened.clear_hidden().unwrap();
    assert!(!path.exists());
    assert_eq!(FileHiddenStore::new(&path).load().unwrap(), None);
    assert_eq!(ids(&reopened.view(&FilterState::new())), vec![101, 102, 103, 200]);
}

#[test]
fn filters_compose_and_can_empty_the_view() {
    let ws = Workspace::new("filters");
    let catalog = Catalog::open(snapshot(), ws.store()).unwrap();

    let mut state = FilterState::new();
    state.toggle_include_genre("Action");
    state.toggle_exclude_genre("Drama");
    state.select_score(ScoreBucket::new(70).unwrap());
    assert_eq!(ids(&catalog.view(&state)), vec![101]);

    state.toggle_year(2004);
    assert_eq!(catalog.view(&state), CatalogView::Empty);
    state.select_score(ScoreBucket::new(80).unwrap());
    assert_eq!(ids(&catalog.view(&state)), vec![300]);
}

#[test]
fn sequel_chain_groups_under_both_strategies() {
    let ws = Workspace::new("groups");
    let catalog = Catalog::open(snapshot(), ws.store()).unwrap();

    let mut state = FilterState::new();
    state.set_grouping(Some(GroupingStrategy::RelationGraph));
    let view = catalog.view(&state);
    assert_eq!(ids(&view), vec![101, 200]);
    let related: Vec<i32> = view.entries()[0].related.iter().map(|r| r.id).collect();
    assert_eq!(related, vec![102, 103]);

    state.set_grouping(Some(GroupingStrategy::TitleHeuristic));
    let view = catalog.view(&state);
    assert_eq!(ids(&view), vec![101, 200]);
    assert_eq!(view.entries()[0].related.len(), 2);
    assert_eq!(view.record_count(), 4);
}

#[test]
fn graph_grouping_bridges_a_filtered_out_middle_entry() {
    let ws = Workspace::new("bridge");
    let catalog = Catalog::open(snapshot(), ws.store()).unwrap();

    let mut state = FilterState::new();
    state.toggle_year(2014);
    state.toggle_year(2019);
    // 102 is filtered out by year; 101 and 103 both point at it.
    state.set_grouping(Some(GroupingStrategy::RelationGraph));
    let view = catalog.view(&state);
    assert_eq!(ids(&view), vec![101]);
    let nodes: Vec<i32> = view.entries()[0].related_nodes.iter().map(|n| n.id).collect();
    assert_eq!(nodes, vec![102]);
    assert_eq!(view.entries()[0].related_count(), 2);

    state.set_grouping(Some(GroupingStrategy::TitleHeuristic));
    assert_eq!(ids(&catalog.view(&state)), vec![101, 103]);
}

#[test]
fn snapshot_without_timestamp_still_opens() {
    let ws = Workspace::new("untimed");
    let snapshot_path = ws.dir.join("animeData.json");
    fs::write(&snapshot_path, r#"{"count":1,"anime":[{"id":1,"startDate":{"year":2020}}]}"#).unwrap();

    let snapshot = Snapshot::load(&snapshot_path).unwrap();
    let catalog = Catalog::open(snapshot, ws.store()).unwrap();
    assert_eq!(catalog.last_updated(), None);
    assert_eq!(updated_line(catalog.last_updated()), "Data updated unknown");
    assert_eq!(ids(&catalog.view(&FilterState::new())), vec![1]);
}

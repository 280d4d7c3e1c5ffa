//! Catalog engine over a loaded snapshot.
//!
//! Every call to [`Catalog::view`] recomputes the displayed list from scratch:
//! filter predicates first, then the optional franchise grouping. Only the
//! hide/restore/clear actions have side effects, and those write through to the
//! hidden-set store immediately.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

pub mod card;
pub mod filter;
pub mod group;
pub mod hidden;
pub mod text;
pub mod title;

pub use card::{render_card, CardStyle, EMPTY_VIEW_MESSAGE};
pub use filter::{FilterState, ScoreBucket};
pub use group::{franchise_groups, ungrouped, FranchiseGroup, GroupingStrategy};
pub use hidden::{FileHiddenStore, HiddenSet, HiddenStore, MemoryHiddenStore};

use crate::models::AnimeRecord;
use crate::snapshot::Snapshot;

/// What the list area shows after a recomputation.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogView<'a> {
    Empty,
    Entries(Vec<FranchiseGroup<'a>>),
}

impl<'a> CatalogView<'a> {
    /// Number of cards, i.e. groups when grouping is on.
    pub fn len(&self) -> usize {
        match self {
            CatalogView::Empty => 0,
            CatalogView::Entries(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CatalogView::Empty)
    }

    pub fn entries(&self) -> &[FranchiseGroup<'a>] {
        match self {
            CatalogView::Empty => &[],
            CatalogView::Entries(groups) => groups,
        }
    }

    /// Records represented by the view, related entries included.
    pub fn record_count(&self) -> usize {
        self.entries().iter().map(|g| 1 + g.related.len()).sum()
    }
}

pub struct Catalog {
    snapshot: Snapshot,
    hidden: HiddenSet,
}

impl Catalog {
    pub fn open(snapshot: Snapshot, store: Box<dyn HiddenStore>) -> Result<Self> {
        let hidden = HiddenSet::load(store)?;
        info!(
            "Catalog ready: {} anime, {} hidden",
            snapshot.anime.len(),
            hidden.len()
        );
        Ok(Self { snapshot, hidden })
    }

    pub fn view(&self, state: &FilterState) -> CatalogView<'_> {
        let filtered = state.apply(&self.snapshot.anime, &self.hidden);
        if filtered.is_empty() {
            return CatalogView::Empty;
        }
        let groups = match state.grouping() {
            Some(strategy) => franchise_groups(&filtered, strategy),
            None => ungrouped(&filtered),
        };
        CatalogView::Entries(groups)
    }

    pub fn summary_line(&self, view: &CatalogView<'_>) -> String {
        card::summary_line(view.record_count(), self.total())
    }

    pub fn hide(&mut self, id: i32) -> Result<bool> {
        let changed = self.hidden.hide(id)?;
        if changed {
            info!("Hid anime {}", id);
        }
        Ok(changed)
    }

    pub fn restore(&mut self, id: i32) -> Result<bool> {
        let changed = self.hidden.restore(id)?;
        if changed {
            info!("Restored anime {}", id);
        }
        Ok(changed)
    }

    pub fn clear_hidden(&mut self) -> Result<()> {
        let count = self.hidden.len();
        self.hidden.clear()?;
        info!("Cleared {} hidden anime", count);
        Ok(())
    }

    pub fn hidden(&self) -> &HiddenSet {
        &self.hidden
    }

    /// Hidden ids that resolve to a record in the snapshot, in snapshot order.
    pub fn hidden_records(&self) -> Vec<&AnimeRecord> {
        self.snapshot
            .anime
            .iter()
            .filter(|r| self.hidden.contains(r.id))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.snapshot.anime.len()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.snapshot.last_updated
    }
}

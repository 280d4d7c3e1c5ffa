//! Franchise grouping of an already-filtered list.
//!
//! Two strategies exist and they can disagree on membership for the same input.
//! Both build one disjoint-set structure per call and read groups off its roots.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use super::title::franchise_key;
use crate::models::{AnimeRecord, RelationNode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum GroupingStrategy {
    /// Connected components over franchise relation edges. Related ids that are
    /// not in the current view still connect the entries that point at them.
    #[default]
    RelationGraph,
    /// Buckets by normalized title, then merges buckets linked by a relation edge
    /// between two entries in view.
    TitleHeuristic,
}

/// A representative entry and the entries folded under it.
///
/// `related` holds members that are in the view. `related_nodes` holds the
/// relation-edge summaries of franchise entries the members point at but that
/// are not members themselves (filtered out, hidden, or never fetched).
#[derive(Debug, Clone, PartialEq)]
pub struct FranchiseGroup<'a> {
    pub representative: &'a AnimeRecord,
    pub related: Vec<&'a AnimeRecord>,
    pub related_nodes: Vec<&'a RelationNode>,
}

impl<'a> FranchiseGroup<'a> {
    pub fn single(representative: &'a AnimeRecord) -> Self {
        Self {
            representative,
            related: Vec::new(),
            related_nodes: Vec::new(),
        }
    }

    pub fn related_count(&self) -> usize {
        self.related.len() + self.related_nodes.len()
    }

    fn members(&self) -> impl Iterator<Item = &'a AnimeRecord> + '_ {
        std::iter::once(self.representative).chain(self.related.iter().copied())
    }

    /// Collects edge nodes pointing outside the group, once per id, oldest first.
    fn attach_outside_nodes(&mut self) {
        let mut seen: HashSet<i32> = self.members().map(|r| r.id).collect();
        let mut nodes: Vec<&'a RelationNode> = Vec::new();
        for member in self.members() {
            for node in member.franchise_nodes() {
                if seen.insert(node.id) {
                    nodes.push(node);
                }
            }
        }
        nodes.sort_by_key(|n| n.year().unwrap_or(i32::MAX));
        self.related_nodes = nodes;
    }
}

pub fn ungrouped<'a>(records: &[&'a AnimeRecord]) -> Vec<FranchiseGroup<'a>> {
    records.iter().copied().map(FranchiseGroup::single).collect()
}

pub fn franchise_groups<'a>(
    records: &[&'a AnimeRecord],
    strategy: GroupingStrategy,
) -> Vec<FranchiseGroup<'a>> {
    match strategy {
        GroupingStrategy::RelationGraph => group_by_relations(records),
        GroupingStrategy::TitleHeuristic => group_by_title(records),
    }
}

fn group_by_relations<'a>(records: &[&'a AnimeRecord]) -> Vec<FranchiseGroup<'a>> {
    let mut sets = DisjointSet::new(records.len());
    let mut slot_of: HashMap<i32, usize> = HashMap::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let slot = *slot_of.entry(record.id).or_insert(idx);
        sets.union(idx, slot);
    }
    for (idx, record) in records.iter().enumerate() {
        for linked in record.franchise_links() {
            let slot = *slot_of.entry(linked).or_insert_with(|| sets.push());
            sets.union(idx, slot);
        }
    }

    let mut groups = collect_components(records, &mut sets);
    for group in &mut groups {
        sort_by_year(&mut group.related);
        group.attach_outside_nodes();
    }
    groups
}

fn group_by_title<'a>(records: &[&'a AnimeRecord]) -> Vec<FranchiseGroup<'a>> {
    let mut sets = DisjointSet::new(records.len());
    let mut bucket_of: HashMap<String, usize> = HashMap::new();
    let mut slot_of: HashMap<i32, usize> = HashMap::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let key = franchise_key(record.display_title());
        let bucket = *bucket_of.entry(key).or_insert(idx);
        sets.union(idx, bucket);
        slot_of.entry(record.id).or_insert(idx);
    }
    for (idx, record) in records.iter().enumerate() {
        for linked in record.franchise_links() {
            if let Some(&slot) = slot_of.get(&linked) {
                sets.union(idx, slot);
            }
        }
    }

    let mut groups: Vec<FranchiseGroup<'a>> = collect_components(records, &mut sets)
        .into_iter()
        .map(|group| {
            let mut members = Vec::with_capacity(group.related.len() + 1);
            members.push(group.representative);
            members.extend(group.related);
            let best = members
                .iter()
                .enumerate()
                .max_by_key(|(pos, r)| (r.popularity_or_zero(), Reverse(*pos)))
                .map(|(pos, _)| pos)
                .unwrap_or(0);
            let representative = members.remove(best);
            sort_by_year(&mut members);
            let mut group = FranchiseGroup {
                representative,
                related: members,
                related_nodes: Vec::new(),
            };
            group.attach_outside_nodes();
            group
        })
        .collect();

    groups.sort_by_key(|g| Reverse(g.representative.popularity_or_zero()));
    groups
}

/// Groups in order of each component's first record; that record leads.
fn collect_components<'a>(
    records: &[&'a AnimeRecord],
    sets: &mut DisjointSet,
) -> Vec<FranchiseGroup<'a>> {
    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<FranchiseGroup<'a>> = Vec::new();
    for (idx, record) in records.iter().copied().enumerate() {
        let root = sets.find(idx);
        match group_of_root.get(&root) {
            Some(&g) => groups[g].related.push(record),
            None => {
                group_of_root.insert(root, groups.len());
                groups.push(FranchiseGroup::single(record));
            }
        }
    }
    groups
}

/// Oldest first; entries without a year go last. Stable for equal years.
fn sort_by_year(records: &mut [&AnimeRecord]) {
    records.sort_by_key(|r| r.year().unwrap_or(i32::MAX));
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn push(&mut self) -> usize {
        let slot = self.parent.len();
        self.parent.push(slot);
        self.rank.push(0);
        slot
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use super::error::RoutingError;
use super::types::{ContainmentCatalogue, UnitIdx};

/// Undirected connectivity over a working subset of containment units.
///
/// Every member has an entry, possibly with no neighbors. Adjacency is
/// symmetric and free of self-loops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionGraph {
    adjacency: BTreeMap<UnitIdx, BTreeSet<UnitIdx>>,
}

impl ConnectionGraph {
    /// Build the graph over `units`.
    ///
    /// Units sharing a connection point get a direct edge. A fitting is linked
    /// to each run it touches and those runs are also linked to each other, so
    /// a fitting never separates the runs it joins.
    pub fn build(
        catalogue: &ContainmentCatalogue,
        units: &[UnitIdx],
    ) -> Result<Self, RoutingError> {
        let mut graph = Self::default();
        for &idx in units {
            catalogue.unit(idx).validate()?;
            graph.adjacency.entry(idx).or_default();
        }

        for &idx in units {
            let touching: Vec<UnitIdx> = catalogue
                .touching(idx)
                .into_iter()
                .filter(|other| graph.contains(*other))
                .collect();

            for &other in &touching {
                graph.add_edge(idx, other);
            }

            if catalogue.unit(idx).category.is_fitting() {
                let runs: Vec<UnitIdx> = touching
                    .into_iter()
                    .filter(|&other| !catalogue.unit(other).category.is_fitting())
                    .collect();
                for (i, &a) in runs.iter().enumerate() {
                    for &b in &runs[i + 1..] {
                        graph.add_edge(a, b);
                    }
                }
            }
        }

        Ok(graph)
    }

    fn add_edge(&mut self, a: UnitIdx, b: UnitIdx) {
        if a == b {
            return;
        }
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    pub fn contains(&self, idx: UnitIdx) -> bool {
        self.adjacency.contains_key(&idx)
    }

    /// Neighbors of `idx` in ascending order. Unknown units have none.
    pub fn neighbors(&self, idx: UnitIdx) -> impl Iterator<Item = UnitIdx> + '_ {
        self.adjacency.get(&idx).into_iter().flatten().copied()
    }

    pub fn are_adjacent(&self, a: UnitIdx, b: UnitIdx) -> bool {
        self.adjacency.get(&a).is_some_and(|n| n.contains(&b))
    }

    /// Members in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = UnitIdx> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }
}

/// Breadth-first expansion from `seeds` through every physical connection in
/// the catalogue, whether or not the reached units carry the cable's label.
///
/// Returns units in discovery order, seeds first. `max_depth` bounds the
/// number of layers beyond the seeds.
pub fn relevant_network(
    catalogue: &ContainmentCatalogue,
    seeds: &[UnitIdx],
    max_depth: Option<usize>,
) -> Vec<UnitIdx> {
    let mut visited: HashSet<UnitIdx> = HashSet::with_capacity(seeds.len());
    let mut order = Vec::with_capacity(seeds.len());
    let mut queue = VecDeque::new();

    for &seed in seeds {
        if visited.insert(seed) {
            order.push(seed);
            queue.push_back((seed, 0usize));
        }
    }

    while let Some((idx, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|limit| depth >= limit) {
            continue;
        }
        for next in catalogue.touching(idx) {
            if visited.insert(next) {
                order.push(next);
                queue.push_back((next, depth + 1));
            }
        }
    }

    order
}

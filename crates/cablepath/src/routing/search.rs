use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use super::graph::ConnectionGraph;
use super::types::{ContainmentCatalogue, UnitIdx};

/// Wrapper for the priority queue with deterministic ordering.
/// BinaryHeap is a max-heap, so we reverse the ordering (lowest cost = highest priority).
#[derive(Debug)]
struct PqEntry<N> {
    cost: f64,
    /// Push order. Among equal costs the earliest discovery is settled first.
    seq: u64,
    node: N,
}

impl<N> PartialEq for PqEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N> Eq for PqEntry<N> {}

impl<N> Ord for PqEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then(other.seq.cmp(&self.seq))
    }
}

impl<N> PartialOrd for PqEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Settled distances and predecessors from one source.
#[derive(Debug, Clone)]
pub struct ShortestPathTree<N: Ord + Copy> {
    source: N,
    dist: BTreeMap<N, f64>,
    prev: BTreeMap<N, N>,
}

impl<N: Ord + Copy> ShortestPathTree<N> {
    pub fn source(&self) -> N {
        self.source
    }

    pub fn distance(&self, node: N) -> Option<f64> {
        self.dist.get(&node).copied()
    }

    /// Nodes from the source to `target`, inclusive.
    pub fn path_to(&self, target: N) -> Option<Vec<N>> {
        if !self.dist.contains_key(&target) {
            return None;
        }
        let mut path = vec![target];
        let mut current = target;
        while let Some(&parent) = self.prev.get(&current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// The reached node with the greatest distance. Ties go to the smallest node.
    pub fn farthest(&self) -> (N, f64) {
        let mut best = (self.source, 0.0);
        for (&node, &d) in &self.dist {
            if d > best.1 {
                best = (node, d);
            }
        }
        best
    }
}

/// Dijkstra from `source` over the graph described by `successors`.
///
/// `successors(n)` yields `(neighbor, cost)` pairs with non-negative cost.
/// When `target` is given the search stops once it is settled.
/// A node's predecessor only changes on a strictly shorter distance, so the
/// first path discovered at the minimal distance wins.
pub fn shortest_path_tree<N, F, I>(
    source: N,
    target: Option<N>,
    mut successors: F,
) -> ShortestPathTree<N>
where
    N: Ord + Copy,
    F: FnMut(N) -> I,
    I: IntoIterator<Item = (N, f64)>,
{
    let mut dist: BTreeMap<N, f64> = BTreeMap::new();
    let mut prev: BTreeMap<N, N> = BTreeMap::new();
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    dist.insert(source, 0.0);
    open.push(PqEntry {
        cost: 0.0,
        seq,
        node: source,
    });

    while let Some(PqEntry { cost, node, .. }) = open.pop() {
        // Skip stale entries.
        if dist.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }
        if target == Some(node) {
            break;
        }

        for (next, step) in successors(node) {
            let candidate = cost + step;
            let improves = dist.get(&next).is_none_or(|&best| candidate < best);
            if !improves {
                continue;
            }
            dist.insert(next, candidate);
            prev.insert(next, node);
            seq += 1;
            open.push(PqEntry {
                cost: candidate,
                seq,
                node: next,
            });
        }
    }

    ShortestPathTree { source, dist, prev }
}

/// A concrete route through containment units.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPath {
    pub units: Vec<UnitIdx>,
    /// Sum of the physical lengths of every unit on the path.
    pub length: f64,
}

/// Shortest path tree over a connection graph.
///
/// Leaving a unit costs that unit's physical length; fittings are free.
pub fn unit_tree(
    graph: &ConnectionGraph,
    catalogue: &ContainmentCatalogue,
    source: UnitIdx,
    target: Option<UnitIdx>,
) -> ShortestPathTree<UnitIdx> {
    shortest_path_tree(source, target, |idx| {
        let cost = catalogue.unit(idx).physical_length();
        graph.neighbors(idx).map(move |next| (next, cost))
    })
}

/// Turn a tree lookup into a [`UnitPath`], adding the final unit's own length.
pub fn unit_path_in(
    tree: &ShortestPathTree<UnitIdx>,
    catalogue: &ContainmentCatalogue,
    target: UnitIdx,
) -> Option<UnitPath> {
    let units = tree.path_to(target)?;
    let departed = tree.distance(target)?;
    Some(UnitPath {
        units,
        length: departed + catalogue.unit(target).physical_length(),
    })
}

/// Single source, single target shortest path.
pub fn unit_path(
    graph: &ConnectionGraph,
    catalogue: &ContainmentCatalogue,
    source: UnitIdx,
    target: UnitIdx,
) -> Option<UnitPath> {
    if !graph.contains(source) || !graph.contains(target) {
        return None;
    }
    let tree = unit_tree(graph, catalogue, source, Some(target));
    unit_path_in(&tree, catalogue, target)
}

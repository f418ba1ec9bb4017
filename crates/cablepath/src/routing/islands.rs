use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use super::graph::ConnectionGraph;
use super::search::shortest_path_tree;
use super::spatial::{BoundingBox, Point3, endpoint_distance, nearest_unit};
use super::types::{Category, ContainmentCatalogue, UnitIdx};

/// Containment kind of a whole island.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IslandCategory {
    Tray,
    Conduit,
    /// Runs of both kinds, or fittings only.
    Mixed,
}

impl fmt::Display for IslandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IslandCategory::Tray => f.write_str("Tray"),
            IslandCategory::Conduit => f.write_str("Conduit"),
            IslandCategory::Mixed => f.write_str("Mixed"),
        }
    }
}

/// A maximal connected group of one cable's own units.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainmentIsland {
    /// Member units, ascending.
    pub members: Vec<UnitIdx>,
    pub bounds: BoundingBox,
    pub category: IslandCategory,
}

impl ContainmentIsland {
    fn new(catalogue: &ContainmentCatalogue, members: Vec<UnitIdx>) -> Option<Self> {
        let bounds = BoundingBox::from_points(
            members
                .iter()
                .flat_map(|&idx| catalogue.unit(idx).connection_points.iter()),
        )?;

        let kinds: BTreeSet<Category> = members
            .iter()
            .map(|&idx| catalogue.unit(idx).category)
            .filter(|c| !c.is_fitting())
            .collect();
        let category = match (
            kinds.contains(&Category::Tray),
            kinds.contains(&Category::Conduit),
        ) {
            (true, false) => IslandCategory::Tray,
            (false, true) => IslandCategory::Conduit,
            _ => IslandCategory::Mixed,
        };

        Some(Self {
            members,
            bounds,
            category,
        })
    }

    /// Closest member to `point` by projection, with its distance.
    pub fn nearest_member(
        &self,
        catalogue: &ContainmentCatalogue,
        point: Point3,
    ) -> Option<(UnitIdx, f64)> {
        nearest_unit(catalogue, &self.members, point)
    }
}

/// Partition the units of `own` (a graph over one cable's assigned units)
/// into connected components.
///
/// Islands are ordered by their lowest member.
pub fn find_islands(
    catalogue: &ContainmentCatalogue,
    own: &ConnectionGraph,
) -> Vec<ContainmentIsland> {
    let mut assigned: BTreeSet<UnitIdx> = BTreeSet::new();
    let mut islands = Vec::new();

    for start in own.nodes() {
        if !assigned.insert(start) {
            continue;
        }
        let mut members = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(idx) = queue.pop_front() {
            for next in own.neighbors(idx) {
                if assigned.insert(next) {
                    members.push(next);
                    queue.push_back(next);
                }
            }
        }
        members.sort_unstable();
        islands.extend(ContainmentIsland::new(catalogue, members));
    }

    islands
}

/// The island closest to `point` as `(island, nearest member, distance)`.
/// Ties go to the lower island index.
pub fn nearest_island(
    catalogue: &ContainmentCatalogue,
    islands: &[ContainmentIsland],
    point: Point3,
) -> Option<(usize, UnitIdx, f64)> {
    let mut best: Option<(usize, UnitIdx, f64)> = None;
    for (i, island) in islands.iter().enumerate() {
        let Some((unit, d)) = island.nearest_member(catalogue, point) else {
            continue;
        };
        if best.is_none_or(|(_, _, best_d)| d < best_d) {
            best = Some((i, unit, d));
        }
    }
    best
}

/// Closest approach between two islands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IslandGap {
    pub distance: f64,
    /// Member of the island the gap is read from.
    pub from_unit: UnitIdx,
    /// Member of the island the gap leads to.
    pub to_unit: UnitIdx,
}

impl IslandGap {
    fn reversed(self) -> Self {
        Self {
            distance: self.distance,
            from_unit: self.to_unit,
            to_unit: self.from_unit,
        }
    }
}

/// Complete graph over islands weighted by closest endpoint distance.
#[derive(Debug, Clone)]
pub struct IslandGraph {
    /// `gaps[a][b]` read from island `a` towards island `b`. `None` on the diagonal.
    gaps: Vec<Vec<Option<IslandGap>>>,
}

impl IslandGraph {
    pub fn build(catalogue: &ContainmentCatalogue, islands: &[ContainmentIsland]) -> Self {
        let n = islands.len();
        let mut gaps = vec![vec![None; n]; n];
        for a in 0..n {
            for b in a + 1..n {
                if let Some(gap) = closest_approach(catalogue, &islands[a], &islands[b]) {
                    gaps[a][b] = Some(gap);
                    gaps[b][a] = Some(gap.reversed());
                }
            }
        }
        Self { gaps }
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn gap(&self, from: usize, to: usize) -> Option<IslandGap> {
        self.gaps.get(from)?.get(to).copied().flatten()
    }

    fn successors(&self, island: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.gaps[island]
            .iter()
            .enumerate()
            .filter_map(|(other, gap)| gap.map(|g| (other, g.distance)))
    }

    /// Island visitation order from `start` to `end` minimising total gap.
    pub fn shortest_route(&self, start: usize, end: usize) -> Option<Vec<usize>> {
        if start >= self.len() || end >= self.len() {
            return None;
        }
        shortest_path_tree(start, Some(end), |i| self.successors(i)).path_to(end)
    }

    /// Visitation order from `start` to the island farthest from it, by total gap.
    pub fn farthest_route(&self, start: usize) -> Option<Vec<usize>> {
        if start >= self.len() {
            return None;
        }
        let tree = shortest_path_tree(start, None, |i| self.successors(i));
        let (end, _) = tree.farthest();
        tree.path_to(end)
    }
}

fn closest_approach(
    catalogue: &ContainmentCatalogue,
    a: &ContainmentIsland,
    b: &ContainmentIsland,
) -> Option<IslandGap> {
    let mut best: Option<IslandGap> = None;
    for &ua in &a.members {
        let unit_a = catalogue.unit(ua);
        let bounds_a = BoundingBox::from_points(&unit_a.connection_points);
        for &ub in &b.members {
            let unit_b = catalogue.unit(ub);
            if let (Some(best), Some(ba), Some(bb)) = (
                best,
                bounds_a,
                BoundingBox::from_points(&unit_b.connection_points),
            ) {
                if ba.distance_to(&bb) >= best.distance {
                    continue;
                }
            }
            let Some(d) = endpoint_distance(unit_a, unit_b) else {
                continue;
            };
            if best.is_none_or(|g| d < g.distance) {
                best = Some(IslandGap {
                    distance: d,
                    from_unit: ua,
                    to_unit: ub,
                });
            }
        }
    }
    best
}

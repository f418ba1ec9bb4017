use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{ContainmentCatalogue, ContainmentUnit, UnitIdx};

/// A point in model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    fn sub(self, other: Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    fn dot(self, other: Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn lerp(self, other: Point3, t: f64) -> Point3 {
        Point3::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }
}

/// Centroid of a unit's connection points. For a two-ended run this is its midpoint.
pub fn representative_point(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum = points.iter().fold(Point3::default(), |acc, p| {
        Point3::new(acc.x + p.x, acc.y + p.y, acc.z + p.z)
    });
    Some(Point3::new(sum.x / n, sum.y / n, sum.z / n))
}

/// Closest point to `target` on the polyline through `points` (in order).
///
/// A single point projects onto itself; an empty slice has no projection.
pub fn project_onto(points: &[Point3], target: Point3) -> Option<Point3> {
    match points {
        [] => None,
        [only] => Some(*only),
        _ => points
            .windows(2)
            .map(|w| closest_on_segment(w[0], w[1], target))
            .min_by(|a, b| {
                a.distance_to(target)
                    .partial_cmp(&b.distance_to(target))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
    }
}

fn closest_on_segment(a: Point3, b: Point3, p: Point3) -> Point3 {
    let ab = b.sub(a);
    let len_sq = ab.dot(ab);
    if len_sq <= f64::EPSILON {
        return a;
    }
    let t = (p.sub(a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a.lerp(b, t)
}

/// Distance from `target` to its projection onto `unit`.
pub fn distance_to_unit(unit: &ContainmentUnit, target: Point3) -> Option<f64> {
    project_onto(&unit.connection_points, target).map(|p| p.distance_to(target))
}

/// The unit among `units` closest to `target` by projection.
///
/// Ties go to the unit whose representative point is closer, then to the
/// unit listed first.
pub fn nearest_unit(
    catalogue: &ContainmentCatalogue,
    units: &[UnitIdx],
    target: Point3,
) -> Option<(UnitIdx, f64)> {
    let mut best: Option<(UnitIdx, f64, f64)> = None;
    for &idx in units {
        let unit = catalogue.unit(idx);
        let Some(d) = distance_to_unit(unit, target) else {
            continue;
        };
        let centre = representative_point(&unit.connection_points)
            .map_or(f64::INFINITY, |c| c.distance_to(target));
        match best {
            Some((_, best_d, best_centre)) if (d, centre) >= (best_d, best_centre) => {}
            _ => best = Some((idx, d, centre)),
        }
    }
    best.map(|(idx, d, _)| (idx, d))
}

/// Minimum distance between any connection point of `a` and any of `b`.
pub fn endpoint_distance(a: &ContainmentUnit, b: &ContainmentUnit) -> Option<f64> {
    let mut best: Option<f64> = None;
    for pa in &a.connection_points {
        for pb in &b.connection_points {
            let d = pa.distance_to(*pb);
            if best.is_none_or(|current| d < current) {
                best = Some(d);
            }
        }
    }
    best
}

/// Axis-aligned bounds of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.include(*p);
        }
        Some(bounds)
    }

    pub fn include(&mut self, p: Point3) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Lower bound on the distance between any point in `self` and any point in `other`.
    /// Zero when the boxes overlap.
    pub fn distance_to(&self, other: &BoundingBox) -> f64 {
        let gap = |a_min: f64, a_max: f64, b_min: f64, b_max: f64| {
            (b_min - a_max).max(a_min - b_max).max(0.0)
        };
        let dx = gap(self.min.x, self.max.x, other.min.x, other.max.x);
        let dy = gap(self.min.y, self.max.y, other.min.y, other.max.y);
        let dz = gap(self.min.z, self.max.z, other.min.z, other.max.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

type CellKey = (i64, i64, i64);

/// Uniform spatial hash over connection points.
///
/// Cell size equals the match tolerance, so any two points within tolerance
/// sit in the same or an adjacent cell.
#[derive(Debug, Clone)]
pub struct PointIndex {
    tolerance: f64,
    cell_size: f64,
    cells: HashMap<CellKey, Vec<(Point3, UnitIdx)>>,
}

impl PointIndex {
    pub fn new(tolerance: f64) -> Self {
        let tolerance = tolerance.max(0.0);
        Self {
            tolerance,
            cell_size: tolerance.max(1e-9),
            cells: HashMap::new(),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn key(&self, p: Point3) -> CellKey {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    /// Non-finite points are not indexed; unit validation reports them.
    pub fn insert(&mut self, p: Point3, unit: UnitIdx) {
        if !p.is_finite() {
            return;
        }
        let key = self.key(p);
        self.cells.entry(key).or_default().push((p, unit));
    }

    /// Units with a connection point within tolerance of `p`, ascending and deduplicated.
    pub fn units_near(&self, p: Point3) -> Vec<UnitIdx> {
        let mut found = Vec::new();
        if !p.is_finite() {
            return found;
        }
        let (cx, cy, cz) = self.key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = (
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    );
                    let Some(bucket) = self.cells.get(&key) else {
                        continue;
                    };
                    found.extend(
                        bucket
                            .iter()
                            .filter(|(q, _)| q.distance_to(p) <= self.tolerance)
                            .map(|&(_, unit)| unit),
                    );
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }
}

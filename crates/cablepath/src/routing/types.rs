use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RoutingError;
use super::spatial::{Point3, PointIndex};

/// Arena index of a containment unit.
pub type UnitIdx = usize;

/// Arena index of an equipment item.
pub type EquipmentIdx = usize;

/// Physical kind of a containment unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Tray,
    Conduit,
    Fitting,
}

impl Category {
    pub fn is_fitting(self) -> bool {
        matches!(self, Category::Fitting)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Tray => "Tray",
            Category::Conduit => "Conduit",
            Category::Fitting => "Fitting",
        };
        f.write_str(label)
    }
}

/// A physical segment (tray/conduit run) or fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainmentUnit {
    pub id: String,
    pub category: Category,
    /// Physical length. Fittings carry zero.
    #[serde(default)]
    pub length: f64,
    pub connection_points: Vec<Point3>,
    #[serde(default)]
    pub route_tag: String,
    /// References of the cables assigned to run through this unit.
    #[serde(default)]
    pub cable_labels: Vec<String>,
}

impl ContainmentUnit {
    /// Length that counts towards a route. Fittings never contribute.
    pub fn physical_length(&self) -> f64 {
        if self.category.is_fitting() {
            0.0
        } else {
            self.length
        }
    }

    /// Text shown for this unit in a formatted route.
    pub fn display_tag(&self) -> &str {
        if self.route_tag.trim().is_empty() {
            &self.id
        } else {
            &self.route_tag
        }
    }

    /// Reject data the engine cannot reason about.
    pub fn validate(&self) -> Result<(), RoutingError> {
        let malformed = |reason: &str| RoutingError::MalformedUnit {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.connection_points.is_empty() {
            return Err(malformed("no connection points"));
        }
        if self.connection_points.iter().any(|p| !p.is_finite()) {
            return Err(malformed("non-finite connection point"));
        }
        if !self.length.is_finite() || self.length < 0.0 {
            return Err(malformed("length must be finite and non-negative"));
        }
        Ok(())
    }
}

/// An electrical endpoint such as a panel or fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptive_name: Option<String>,
    pub location: Point3,
}

impl EquipmentItem {
    /// Human-readable description used in report rows.
    pub fn describe(&self) -> String {
        let code = self.primary_code.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let name = self
            .descriptive_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        match (code, name) {
            (Some(code), Some(name)) => format!("{code} ({name})"),
            (Some(code), None) => code.to_string(),
            (None, Some(name)) => name.to_string(),
            (None, None) => self.id.clone(),
        }
    }
}

/// One row of the cable manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableEntry {
    pub cable_reference: String,
    #[serde(default)]
    pub from_identifier: String,
    #[serde(default)]
    pub to_identifier: String,
}

/// Flat arena of containment units plus the lookups the engine needs.
#[derive(Debug, Clone)]
pub struct ContainmentCatalogue {
    units: Vec<ContainmentUnit>,
    by_label: BTreeMap<String, Vec<UnitIdx>>,
    points: PointIndex,
}

impl ContainmentCatalogue {
    /// Build the catalogue. Unit ids must be unique.
    pub fn new(units: Vec<ContainmentUnit>, tolerance: f64) -> Result<Self, RoutingError> {
        let mut seen = HashSet::with_capacity(units.len());
        let mut by_label: BTreeMap<String, Vec<UnitIdx>> = BTreeMap::new();
        let mut points = PointIndex::new(tolerance);

        for (idx, unit) in units.iter().enumerate() {
            if !seen.insert(unit.id.as_str()) {
                return Err(RoutingError::DuplicateUnitId(unit.id.clone()));
            }
            for label in &unit.cable_labels {
                let label = label.trim();
                if label.is_empty() {
                    continue;
                }
                let entry = by_label.entry(label.to_string()).or_default();
                if entry.last() != Some(&idx) {
                    entry.push(idx);
                }
            }
            for &p in &unit.connection_points {
                points.insert(p, idx);
            }
        }

        Ok(Self {
            units,
            by_label,
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit(&self, idx: UnitIdx) -> &ContainmentUnit {
        &self.units[idx]
    }

    pub fn units(&self) -> &[ContainmentUnit] {
        &self.units
    }

    pub fn index_of(&self, id: &str) -> Option<UnitIdx> {
        self.units.iter().position(|u| u.id == id)
    }

    /// Units labeled with `cable_reference`, in arena order.
    pub fn assigned_to(&self, cable_reference: &str) -> &[UnitIdx] {
        self.by_label
            .get(cable_reference.trim())
            .map_or(&[], Vec::as_slice)
    }

    pub fn tolerance(&self) -> f64 {
        self.points.tolerance()
    }

    /// Every other unit sharing a connection point with `idx`, ascending.
    pub fn touching(&self, idx: UnitIdx) -> Vec<UnitIdx> {
        let mut found: Vec<UnitIdx> = self.units[idx]
            .connection_points
            .iter()
            .flat_map(|&p| self.points.units_near(p))
            .filter(|&other| other != idx)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }
}

/// Flat arena of equipment items.
#[derive(Debug, Clone, Default)]
pub struct EquipmentCatalogue {
    items: Vec<EquipmentItem>,
}

impl EquipmentCatalogue {
    pub fn new(items: Vec<EquipmentItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[EquipmentItem] {
        &self.items
    }

    pub fn get(&self, idx: EquipmentIdx) -> &EquipmentItem {
        &self.items[idx]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// How one end of a cable resolved against the equipment catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    /// The identifier was empty.
    Blank,
    NotFound,
    Unique,
    /// Several candidates share the identifier; all of them are evaluated.
    Multiple(usize),
}

impl MatchStatus {
    pub fn classify(identifier: &str, candidates: usize) -> Self {
        if identifier.trim().is_empty() {
            MatchStatus::Blank
        } else {
            match candidates {
                0 => MatchStatus::NotFound,
                1 => MatchStatus::Unique,
                n => MatchStatus::Multiple(n),
            }
        }
    }

    pub fn is_matched(self) -> bool {
        matches!(self, MatchStatus::Unique | MatchStatus::Multiple(_))
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Blank => f.write_str("Blank"),
            MatchStatus::NotFound => f.write_str("Not Found"),
            MatchStatus::Unique => f.write_str("Matched"),
            MatchStatus::Multiple(n) => write!(f, "Matched ({n} candidates)"),
        }
    }
}

/// Overall outcome for one cable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RouteStatus {
    /// A single physically connected path joins both ends.
    Confirmed,
    /// Only the from end matched; the route is stitched outward from it.
    ConfirmedFrom,
    /// Only the to end matched; the route is stitched back to it.
    ConfirmedTo,
    Unconfirmed,
    NoContainmentAssigned,
    ProcessingError,
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RouteStatus::Confirmed => "Confirmed",
            RouteStatus::ConfirmedFrom => "Confirmed From",
            RouteStatus::ConfirmedTo => "Confirmed To",
            RouteStatus::Unconfirmed => "Unconfirmed",
            RouteStatus::NoContainmentAssigned => "No Containment Assigned",
            RouteStatus::ProcessingError => "Processing Error",
        };
        f.write_str(label)
    }
}

/// One report row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub cable_reference: String,
    pub from_identifier: String,
    pub to_identifier: String,
    pub from_match: MatchStatus,
    pub to_match: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_to: Option<String>,
    pub status: RouteStatus,
    pub physical_length: f64,
    pub virtual_length: f64,
    pub branch_sequence: String,
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RouteResult {
    /// An empty row for `entry`; callers fill in the outcome.
    pub fn for_entry(entry: &CableEntry, status: RouteStatus) -> Self {
        Self {
            cable_reference: entry.cable_reference.clone(),
            from_identifier: entry.from_identifier.clone(),
            to_identifier: entry.to_identifier.clone(),
            from_match: MatchStatus::Blank,
            to_match: MatchStatus::Blank,
            matched_from: None,
            matched_to: None,
            status,
            physical_length: 0.0,
            virtual_length: 0.0,
            branch_sequence: String::new(),
            route: String::new(),
            message: None,
        }
    }

    /// Row for a cable whose processing failed. Match statuses are still reported.
    pub fn processing_error(
        entry: &CableEntry,
        (from_match, to_match): (MatchStatus, MatchStatus),
        error: &RoutingError,
    ) -> Self {
        Self {
            from_match,
            to_match,
            message: Some(error.to_string()),
            ..Self::for_entry(entry, RouteStatus::ProcessingError)
        }
    }
}

/// Tunables for the routing engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingOptions {
    /// Two connection points closer than this are the same physical joint.
    pub connection_tolerance: f64,
    /// Stitch gaps longer than this start a new `>>` route segment.
    pub jump_split_distance: f64,
    /// Trailing characters of a route tag used as its branch code.
    pub branch_code_len: usize,
    /// Breadth-first layers explored when building the relevant network.
    pub max_expansion_depth: Option<usize>,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            connection_tolerance: 0.01,
            jump_split_distance: 304.8,
            branch_code_len: 4,
            max_expansion_depth: None,
        }
    }
}

/// Ordered unit sequence for one cable, before formatting.
///
/// Consecutive segments are disconnected and render joined by `>>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoutePlan {
    pub segments: Vec<Vec<UnitIdx>>,
    pub physical_length: f64,
    pub virtual_length: f64,
}

impl RoutePlan {
    pub fn single(path: Vec<UnitIdx>, physical_length: f64) -> Self {
        Self {
            segments: vec![path],
            physical_length,
            virtual_length: 0.0,
        }
    }

    pub fn units(&self) -> impl Iterator<Item = UnitIdx> + '_ {
        self.segments.iter().flatten().copied()
    }
}

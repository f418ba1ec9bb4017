mod islands;
mod matcher;

use super::spatial::Point3;
use super::types::{
    CableEntry, Category, ContainmentCatalogue, ContainmentUnit, EquipmentCatalogue,
    EquipmentItem, RouteResult, RoutingOptions, UnitIdx,
};

const TOLERANCE: f64 = 0.01;

fn pt(x: f64, y: f64) -> Point3 {
    Point3::new(x, y, 0.0)
}

/// Helper to create a straight run. The route tag is the id.
fn run(
    id: &str,
    category: Category,
    length: f64,
    a: (f64, f64),
    b: (f64, f64),
    cables: &[&str],
) -> ContainmentUnit {
    ContainmentUnit {
        id: id.to_string(),
        category,
        length,
        connection_points: vec![pt(a.0, a.1), pt(b.0, b.1)],
        route_tag: id.to_string(),
        cable_labels: cables.iter().map(|c| c.to_string()).collect(),
    }
}

fn tray(
    id: &str,
    length: f64,
    a: (f64, f64),
    b: (f64, f64),
    cables: &[&str],
) -> ContainmentUnit {
    run(id, Category::Tray, length, a, b, cables)
}

fn conduit(
    id: &str,
    length: f64,
    a: (f64, f64),
    b: (f64, f64),
    cables: &[&str],
) -> ContainmentUnit {
    run(id, Category::Conduit, length, a, b, cables)
}

/// Helper to create a fitting joining the given points.
fn fitting(id: &str, points: &[(f64, f64)], cables: &[&str]) -> ContainmentUnit {
    ContainmentUnit {
        id: id.to_string(),
        category: Category::Fitting,
        length: 0.0,
        connection_points: points.iter().map(|&(x, y)| pt(x, y)).collect(),
        route_tag: id.to_string(),
        cable_labels: cables.iter().map(|c| c.to_string()).collect(),
    }
}

fn equip(id: &str, code: &str, name: &str, at: (f64, f64)) -> EquipmentItem {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    EquipmentItem {
        id: id.to_string(),
        primary_code: non_empty(code),
        descriptive_name: non_empty(name),
        location: pt(at.0, at.1),
    }
}

fn cable(reference: &str, from: &str, to: &str) -> CableEntry {
    CableEntry {
        cable_reference: reference.to_string(),
        from_identifier: from.to_string(),
        to_identifier: to.to_string(),
    }
}

fn catalogue(units: Vec<ContainmentUnit>) -> ContainmentCatalogue {
    ContainmentCatalogue::new(units, TOLERANCE).unwrap()
}

fn equipment(items: Vec<EquipmentItem>) -> EquipmentCatalogue {
    EquipmentCatalogue::new(items)
}

/// Arena index of the unit with `id`.
fn idx(catalogue: &ContainmentCatalogue, id: &str) -> UnitIdx {
    catalogue
        .index_of(id)
        .unwrap_or_else(|| panic!("no unit '{id}'"))
}

fn options() -> RoutingOptions {
    RoutingOptions::default()
}

/// Route one cable and fail the test on a processing fault.
fn route(
    entry: &CableEntry,
    containment: &ContainmentCatalogue,
    equipment: &EquipmentCatalogue,
    options: &RoutingOptions,
) -> RouteResult {
    match super::route_cable(entry, containment, equipment, options) {
        Ok(row) => row,
        Err(e) => panic!("cable {} failed: {e}", entry.cable_reference),
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

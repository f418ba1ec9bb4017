pub mod batch;
pub mod error;
pub mod format;
pub mod graph;
pub mod islands;
pub mod matcher;
pub mod search;
pub mod spatial;
pub mod stitch;
pub mod types;

#[cfg(test)]
mod tests;

use tracing::debug;

use error::RoutingError;
use format::{branch_sequence, format_route};
use graph::{ConnectionGraph, relevant_network};
use islands::{ContainmentIsland, IslandGraph, find_islands, nearest_island};
use matcher::match_equipment;
use search::{unit_path_in, unit_tree};
use spatial::nearest_unit;
use stitch::{Exit, disconnected_segments, reversed, stitch};
use types::{
    CableEntry, ContainmentCatalogue, EquipmentCatalogue, EquipmentIdx, MatchStatus, RoutePlan,
    RouteResult, RouteStatus, RoutingOptions, UnitIdx,
};

/// Route a single cable.
///
/// Matched ends are first joined through the relevant network, the
/// breadth-first expansion of the cable's own units. If no connected path
/// exists the cable's own units are split into islands and stitched together
/// with virtual jumps.
///
/// Errors are faults in the supplied data; the batch runner turns them into
/// `ProcessingError` rows.
pub fn route_cable(
    entry: &CableEntry,
    containment: &ContainmentCatalogue,
    equipment: &EquipmentCatalogue,
    options: &RoutingOptions,
) -> Result<RouteResult, RoutingError> {
    let from = match_equipment(&entry.from_identifier, equipment);
    let to = match_equipment(&entry.to_identifier, equipment);
    for &idx in from.iter().chain(&to) {
        let item = equipment.get(idx);
        if !item.location.is_finite() {
            return Err(RoutingError::MalformedEquipment {
                id: item.id.clone(),
            });
        }
    }

    let mut row = RouteResult::for_entry(entry, RouteStatus::NoContainmentAssigned);
    row.from_match = MatchStatus::classify(&entry.from_identifier, from.len());
    row.to_match = MatchStatus::classify(&entry.to_identifier, to.len());

    let assigned = containment.assigned_to(&entry.cable_reference);
    if assigned.is_empty() {
        debug!(cable = %entry.cable_reference, "no containment assigned");
        return Ok(row);
    }
    for &idx in assigned {
        containment.unit(idx).validate()?;
    }

    let network = relevant_network(containment, assigned, options.max_expansion_depth);
    let graph = ConnectionGraph::build(containment, &network)?;
    debug!(
        cable = %entry.cable_reference,
        assigned = assigned.len(),
        network = graph.len(),
        edges = graph.edge_count(),
        "built relevant network"
    );

    if let Some(found) = confirmed_route(containment, equipment, &graph, &network, &from, &to) {
        row.status = RouteStatus::Confirmed;
        row.matched_from = Some(equipment.get(found.from).describe());
        row.matched_to = Some(equipment.get(found.to).describe());
        fill_route(&mut row, containment, &graph, &found.plan, options);
        return Ok(row);
    }

    let own = ConnectionGraph::build(containment, assigned)?;
    let outcome = unconfirmed_route(containment, equipment, &own, &from, &to, options)?;
    row.status = outcome.status;
    row.matched_from = outcome.from.map(|idx| equipment.get(idx).describe());
    row.matched_to = outcome.to.map(|idx| equipment.get(idx).describe());
    fill_route(&mut row, containment, &own, &outcome.plan, options);
    Ok(row)
}

/// Match status of both ends of `entry`, as reported on its row.
pub fn match_statuses(
    entry: &CableEntry,
    equipment: &EquipmentCatalogue,
) -> (MatchStatus, MatchStatus) {
    let classify = |identifier: &str| {
        MatchStatus::classify(identifier, match_equipment(identifier, equipment).len())
    };
    (classify(&entry.from_identifier), classify(&entry.to_identifier))
}

fn fill_route(
    row: &mut RouteResult,
    containment: &ContainmentCatalogue,
    graph: &ConnectionGraph,
    plan: &RoutePlan,
    options: &RoutingOptions,
) {
    row.physical_length = plan.physical_length;
    row.virtual_length = plan.virtual_length;
    row.route = format_route(containment, graph, plan);
    row.branch_sequence = branch_sequence(containment, plan, options.branch_code_len);
    debug!(
        cable = %row.cable_reference,
        status = %row.status,
        physical = row.physical_length,
        virtual_length = row.virtual_length,
        "routed"
    );
}

struct ConfirmedRoute {
    from: EquipmentIdx,
    to: EquipmentIdx,
    plan: RoutePlan,
}

/// Try every (from, to) candidate pairing over the relevant network and keep
/// the shortest. Ties keep the pairing evaluated first.
fn confirmed_route(
    containment: &ContainmentCatalogue,
    equipment: &EquipmentCatalogue,
    graph: &ConnectionGraph,
    network: &[UnitIdx],
    from: &[EquipmentIdx],
    to: &[EquipmentIdx],
) -> Option<ConfirmedRoute> {
    if from.is_empty() || to.is_empty() {
        return None;
    }

    let snap = |idx: EquipmentIdx| {
        nearest_unit(containment, network, equipment.get(idx).location).map(|(unit, _)| unit)
    };
    let ends: Vec<(EquipmentIdx, UnitIdx)> = to
        .iter()
        .filter_map(|&idx| snap(idx).map(|unit| (idx, unit)))
        .collect();

    let mut best: Option<ConfirmedRoute> = None;
    for &from_idx in from {
        let Some(start) = snap(from_idx) else {
            continue;
        };
        let tree = unit_tree(graph, containment, start, None);
        for &(to_idx, end) in &ends {
            let Some(path) = unit_path_in(&tree, containment, end) else {
                continue;
            };
            if best
                .as_ref()
                .is_none_or(|b| path.length < b.plan.physical_length)
            {
                best = Some(ConfirmedRoute {
                    from: from_idx,
                    to: to_idx,
                    plan: RoutePlan::single(path.units, path.length),
                });
            }
        }
    }
    best
}

struct UnconfirmedRoute {
    status: RouteStatus,
    from: Option<EquipmentIdx>,
    to: Option<EquipmentIdx>,
    plan: RoutePlan,
}

/// An equipment candidate anchored to its closest island.
#[derive(Clone, Copy)]
struct Anchor {
    equipment: EquipmentIdx,
    island: usize,
    unit: UnitIdx,
}

fn anchor(
    containment: &ContainmentCatalogue,
    equipment: &EquipmentCatalogue,
    islands: &[ContainmentIsland],
    candidates: &[EquipmentIdx],
) -> Option<Anchor> {
    let mut best: Option<(Anchor, f64)> = None;
    for &idx in candidates {
        let location = equipment.get(idx).location;
        let Some((island, unit, d)) = nearest_island(containment, islands, location) else {
            continue;
        };
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((
                Anchor {
                    equipment: idx,
                    island,
                    unit,
                },
                d,
            ));
        }
    }
    best.map(|(a, _)| a)
}

fn unconfirmed_route(
    containment: &ContainmentCatalogue,
    equipment: &EquipmentCatalogue,
    own: &ConnectionGraph,
    from: &[EquipmentIdx],
    to: &[EquipmentIdx],
    options: &RoutingOptions,
) -> Result<UnconfirmedRoute, RoutingError> {
    let islands = find_islands(containment, own);
    let gaps = IslandGraph::build(containment, &islands);
    let split = options.jump_split_distance;
    debug!(islands = islands.len(), "stitching islands");

    let start = anchor(containment, equipment, &islands, from);
    let end = anchor(containment, equipment, &islands, to);

    let outcome = match (start, end) {
        (Some(start), Some(end)) => {
            let order = gaps
                .shortest_route(start.island, end.island)
                .unwrap_or_else(|| vec![start.island]);
            let exit = if order.last() == Some(&end.island) {
                Exit::Unit(end.unit)
            } else {
                Exit::Farthest
            };
            UnconfirmedRoute {
                status: RouteStatus::Unconfirmed,
                from: Some(start.equipment),
                to: Some(end.equipment),
                plan: stitch(containment, own, &gaps, &order, start.unit, exit, split)?,
            }
        }
        (Some(start), None) => {
            let order = gaps
                .farthest_route(start.island)
                .unwrap_or_else(|| vec![start.island]);
            UnconfirmedRoute {
                status: RouteStatus::ConfirmedFrom,
                from: Some(start.equipment),
                to: None,
                plan: stitch(containment, own, &gaps, &order, start.unit, Exit::Farthest, split)?,
            }
        }
        (None, Some(end)) => {
            let order = gaps
                .farthest_route(end.island)
                .unwrap_or_else(|| vec![end.island]);
            let plan = stitch(containment, own, &gaps, &order, end.unit, Exit::Farthest, split)?;
            UnconfirmedRoute {
                status: RouteStatus::ConfirmedTo,
                from: None,
                to: Some(end.equipment),
                plan: reversed(plan),
            }
        }
        (None, None) => UnconfirmedRoute {
            status: RouteStatus::Unconfirmed,
            from: None,
            to: None,
            plan: disconnected_segments(containment, own, &islands)?,
        },
    };
    Ok(outcome)
}

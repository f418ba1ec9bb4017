use super::error::RoutingError;
use super::graph::ConnectionGraph;
use super::islands::{ContainmentIsland, IslandGraph};
use super::search::{unit_path, unit_path_in, unit_tree};
use super::types::{ContainmentCatalogue, RoutePlan, UnitIdx};

/// Where the walk through the last island should stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// A known unit, e.g. the one nearest the destination equipment.
    Unit(UnitIdx),
    /// The unit physically farthest from where the walk entered the island.
    Farthest,
}

/// Chain per-island shortest paths along `order`, jumping between islands at
/// their closest approach.
///
/// `own` must be the graph the islands were derived from. Each jump adds its
/// gap to the plan's virtual length; jumps longer than `split_distance`
/// start a new route segment.
pub fn stitch(
    catalogue: &ContainmentCatalogue,
    own: &ConnectionGraph,
    gaps: &IslandGraph,
    order: &[usize],
    entry: UnitIdx,
    exit: Exit,
    split_distance: f64,
) -> Result<RoutePlan, RoutingError> {
    let mut plan = RoutePlan {
        segments: vec![Vec::new()],
        ..RoutePlan::default()
    };
    let mut current = entry;

    for (pos, &island) in order.iter().enumerate() {
        let next_island = order.get(pos + 1).copied();
        let jump = match next_island {
            Some(next) => gaps.gap(island, next),
            None => None,
        };

        let leave_at = match (jump, exit) {
            (Some(gap), _) => gap.from_unit,
            (None, Exit::Unit(unit)) => unit,
            (None, Exit::Farthest) => unit_tree(own, catalogue, current, None).farthest().0,
        };

        let leg = unit_path(own, catalogue, current, leave_at).ok_or_else(|| {
            RoutingError::BrokenIsland {
                from: catalogue.unit(current).id.clone(),
                to: catalogue.unit(leave_at).id.clone(),
            }
        })?;
        plan.physical_length += leg.length;
        if let Some(segment) = plan.segments.last_mut() {
            segment.extend(leg.units);
        }

        if let Some(gap) = jump {
            plan.virtual_length += gap.distance;
            if gap.distance > split_distance {
                plan.segments.push(Vec::new());
            }
            current = gap.to_unit;
        }
    }

    plan.segments.retain(|segment| !segment.is_empty());
    Ok(plan)
}

/// Walk each island along its longest run, independently of the others.
///
/// The run is found by a double sweep: the unit farthest from the island's
/// lowest member, then the unit farthest from that one.
pub fn disconnected_segments(
    catalogue: &ContainmentCatalogue,
    own: &ConnectionGraph,
    islands: &[ContainmentIsland],
) -> Result<RoutePlan, RoutingError> {
    let mut plan = RoutePlan::default();
    for island in islands {
        let Some(&first) = island.members.first() else {
            continue;
        };
        let (start, _) = unit_tree(own, catalogue, first, None).farthest();
        let tree = unit_tree(own, catalogue, start, None);
        let (end, _) = tree.farthest();
        let leg = unit_path_in(&tree, catalogue, end).ok_or_else(|| RoutingError::BrokenIsland {
            from: catalogue.unit(start).id.clone(),
            to: catalogue.unit(end).id.clone(),
        })?;
        plan.physical_length += leg.length;
        plan.segments.push(leg.units);
    }
    Ok(plan)
}

/// Reverse a plan so it reads from the other end.
pub fn reversed(mut plan: RoutePlan) -> RoutePlan {
    plan.segments.reverse();
    for segment in &mut plan.segments {
        segment.reverse();
    }
    plan
}

use std::collections::BTreeSet;

use super::*;
use crate::routing::graph::ConnectionGraph;
use crate::routing::islands::{IslandCategory, IslandGraph, find_islands, nearest_island};
use crate::routing::stitch::{Exit, stitch};

/// Trays along the x axis, one per island, each 4 long with 6 between them.
fn island_row(count: usize, cable: &str) -> ContainmentCatalogue {
    catalogue(
        (0..count)
            .map(|i| {
                let x = i as f64 * 10.0;
                tray(&format!("T{i}"), 4.0, (x, 0.0), (x + 4.0, 0.0), &[cable])
            })
            .collect(),
    )
}

fn own_graph(cat: &ContainmentCatalogue, cable: &str) -> ConnectionGraph {
    ConnectionGraph::build(cat, cat.assigned_to(cable)).unwrap()
}

#[test]
fn islands_partition_the_assigned_units() {
    let cat = catalogue(vec![
        tray("A1", 1.0, (0.0, 0.0), (1.0, 0.0), &["C1"]),
        tray("A2", 1.0, (1.0, 0.0), (2.0, 0.0), &["C1"]),
        tray("GAP", 1.0, (2.0, 0.0), (3.0, 0.0), &[]),
        tray("B1", 1.0, (3.0, 0.0), (4.0, 0.0), &["C1"]),
        conduit("C1", 1.0, (9.0, 0.0), (9.0, 3.0), &["C1"]),
        fitting("F", &[(9.0, 3.0), (9.0, 4.0)], &["C1"]),
        conduit("C2", 1.0, (9.0, 4.0), (9.0, 8.0), &["C1"]),
        tray("OTHER", 1.0, (4.0, 0.0), (5.0, 0.0), &["C2"]),
    ]);
    let own = own_graph(&cat, "C1");
    let islands = find_islands(&cat, &own);

    let assigned: BTreeSet<UnitIdx> = cat.assigned_to("C1").iter().copied().collect();
    let mut covered = BTreeSet::new();
    for island in &islands {
        for &m in &island.members {
            assert!(covered.insert(m), "unit {m} is in two islands");
        }
    }
    assert_eq!(covered, assigned);

    // The unlabeled run does not bridge A2 and B1.
    assert_eq!(islands.len(), 3);
    assert_eq!(islands[0].members, vec![idx(&cat, "A1"), idx(&cat, "A2")]);
    assert_eq!(islands[1].members, vec![idx(&cat, "B1")]);
    assert_eq!(
        islands[2].members,
        vec![idx(&cat, "C1"), idx(&cat, "F"), idx(&cat, "C2")]
    );
}

#[test]
fn island_category_reflects_members() {
    let cat = catalogue(vec![
        tray("T", 1.0, (0.0, 0.0), (1.0, 0.0), &["X"]),
        conduit("C", 1.0, (5.0, 0.0), (6.0, 0.0), &["X"]),
        fitting("F", &[(6.0, 0.0), (7.0, 0.0)], &["X"]),
        tray("M1", 1.0, (20.0, 0.0), (21.0, 0.0), &["X"]),
        conduit("M2", 1.0, (21.0, 0.0), (22.0, 0.0), &["X"]),
        fitting("ALONE", &[(40.0, 0.0)], &["X"]),
    ]);
    let islands = find_islands(&cat, &own_graph(&cat, "X"));
    let categories: Vec<IslandCategory> = islands.iter().map(|i| i.category).collect();
    assert_eq!(
        categories,
        vec![
            IslandCategory::Tray,
            IslandCategory::Conduit,
            IslandCategory::Mixed,
            IslandCategory::Mixed,
        ]
    );
}

#[test]
fn island_bounds_cover_all_connection_points() {
    let cat = catalogue(vec![
        tray("A", 1.0, (0.0, -2.0), (3.0, 0.0), &["X"]),
        tray("B", 1.0, (3.0, 0.0), (5.0, 7.0), &["X"]),
    ]);
    let islands = find_islands(&cat, &own_graph(&cat, "X"));
    assert_eq!(islands.len(), 1);
    let bounds = islands[0].bounds;
    assert_eq!((bounds.min.x, bounds.min.y), (0.0, -2.0));
    assert_eq!((bounds.max.x, bounds.max.y), (5.0, 7.0));
}

#[test]
fn gaps_use_closest_endpoints() {
    let cat = island_row(2, "X");
    let islands = find_islands(&cat, &own_graph(&cat, "X"));
    let gaps = IslandGraph::build(&cat, &islands);

    let forward = gaps.gap(0, 1).unwrap();
    assert_close(forward.distance, 6.0);
    assert_eq!((forward.from_unit, forward.to_unit), (0, 1));

    let back = gaps.gap(1, 0).unwrap();
    assert_eq!((back.from_unit, back.to_unit), (1, 0));
    assert!(gaps.gap(0, 0).is_none());
}

#[test]
fn island_route_hops_through_intermediate_islands() {
    let cat = island_row(3, "X");
    let islands = find_islands(&cat, &own_graph(&cat, "X"));
    let gaps = IslandGraph::build(&cat, &islands);

    // Direct 0 -> 2 is 16; hopping through 1 is 6 + 6.
    assert_eq!(gaps.shortest_route(0, 2), Some(vec![0, 1, 2]));
    assert_eq!(gaps.farthest_route(0), Some(vec![0, 1, 2]));
    assert_eq!(gaps.shortest_route(1, 1), Some(vec![1]));
    assert_eq!(gaps.shortest_route(0, 9), None);
}

#[test]
fn nearest_island_prefers_closest_member() {
    let cat = island_row(3, "X");
    let islands = find_islands(&cat, &own_graph(&cat, "X"));
    let (island, unit, d) = nearest_island(&cat, &islands, pt(12.0, 3.0)).unwrap();
    assert_eq!((island, unit), (1, idx(&cat, "T1")));
    assert_close(d, 3.0);
}

#[test]
fn virtual_length_grows_with_every_jump() {
    let mut previous = -1.0;
    for count in 1..=5 {
        let cat = island_row(count, "X");
        let own = own_graph(&cat, "X");
        let islands = find_islands(&cat, &own);
        let gaps = IslandGraph::build(&cat, &islands);
        let order = gaps.shortest_route(0, count - 1).unwrap();
        assert_eq!(order.len(), count);

        let exit = Exit::Unit(count - 1);
        let plan = stitch(&cat, &own, &gaps, &order, 0, exit, f64::INFINITY).unwrap();
        assert!(plan.virtual_length >= 0.0);
        assert!(plan.virtual_length > previous, "{count} islands did not add length");
        assert_close(plan.virtual_length, 6.0 * (count - 1) as f64);
        assert_close(plan.physical_length, 4.0 * count as f64);
        assert_eq!(plan.segments.len(), 1);
        previous = plan.virtual_length;
    }
}

#[test]
fn long_jumps_split_the_route() {
    let cat = island_row(3, "X");
    let own = own_graph(&cat, "X");
    let islands = find_islands(&cat, &own);
    let gaps = IslandGraph::build(&cat, &islands);
    let plan = stitch(&cat, &own, &gaps, &[0, 1, 2], 0, Exit::Farthest, 5.0).unwrap();
    assert_eq!(plan.segments, vec![vec![0], vec![1], vec![2]]);
    assert_close(plan.virtual_length, 12.0);
}

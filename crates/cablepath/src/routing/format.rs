use std::collections::HashSet;
use std::fmt;

use super::graph::ConnectionGraph;
use super::types::{ContainmentCatalogue, RoutePlan, UnitIdx};

/// Separator between disconnected route segments.
pub const SEGMENT_SEPARATOR: &str = ">>";

/// How a route passes from one unit to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The category changes, e.g. tray into conduit.
    CategoryChange,
    /// Same category, physically connected.
    Adjacent,
    /// Same category, not connected: a virtual jump.
    Jump,
}

impl Transition {
    pub fn between(
        catalogue: &ContainmentCatalogue,
        graph: &ConnectionGraph,
        a: UnitIdx,
        b: UnitIdx,
    ) -> Self {
        if catalogue.unit(a).category != catalogue.unit(b).category {
            Transition::CategoryChange
        } else if graph.are_adjacent(a, b) {
            Transition::Adjacent
        } else {
            Transition::Jump
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Transition::CategoryChange => "+",
            Transition::Adjacent => ",",
            Transition::Jump => "||",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Render one connected run of units.
///
/// Format: `TR-0001,TR-0002+CN-0007`
pub fn format_segment(
    catalogue: &ContainmentCatalogue,
    graph: &ConnectionGraph,
    units: &[UnitIdx],
) -> String {
    let mut out = String::new();
    for (i, &idx) in units.iter().enumerate() {
        if i > 0 {
            out.push_str(Transition::between(catalogue, graph, units[i - 1], idx).symbol());
        }
        out.push_str(catalogue.unit(idx).display_tag());
    }
    out
}

/// Render every segment of a plan, joined with [`SEGMENT_SEPARATOR`].
pub fn format_route(
    catalogue: &ContainmentCatalogue,
    graph: &ConnectionGraph,
    plan: &RoutePlan,
) -> String {
    plan.segments
        .iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| format_segment(catalogue, graph, segment))
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR)
}

/// The last `len` characters of a route tag.
pub fn branch_code(tag: &str, len: usize) -> &str {
    let tag = tag.trim();
    let skip = tag.chars().count().saturating_sub(len);
    match tag.char_indices().nth(skip) {
        Some((start, _)) => &tag[start..],
        None => "",
    }
}

/// Branch codes of every unit on the plan, first-seen order, joined with `, `.
pub fn branch_sequence(
    catalogue: &ContainmentCatalogue,
    plan: &RoutePlan,
    code_len: usize,
) -> String {
    let mut seen = HashSet::new();
    let mut codes = Vec::new();
    for idx in plan.units() {
        let code = branch_code(&catalogue.unit(idx).route_tag, code_len);
        if !code.is_empty() && seen.insert(code) {
            codes.push(code);
        }
    }
    codes.join(", ")
}

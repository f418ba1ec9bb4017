use super::types::{EquipmentCatalogue, EquipmentIdx, EquipmentItem};

/// Resolve a free-text identifier to candidate equipment, in catalogue order.
///
/// Primary codes are tried first; descriptive names are only consulted when
/// no code matches. Matching is case-insensitive containment in either
/// direction. A blank identifier matches nothing.
pub fn match_equipment(identifier: &str, catalogue: &EquipmentCatalogue) -> Vec<EquipmentIdx> {
    let needle = identifier.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let by_code = matching(catalogue, &needle, |item| item.primary_code.as_deref());
    if !by_code.is_empty() {
        return by_code;
    }
    matching(catalogue, &needle, |item| item.descriptive_name.as_deref())
}

fn matching(
    catalogue: &EquipmentCatalogue,
    needle: &str,
    field: impl Fn(&EquipmentItem) -> Option<&str>,
) -> Vec<EquipmentIdx> {
    catalogue
        .items()
        .iter()
        .enumerate()
        .filter(|(_, item)| field(item).is_some_and(|value| contains_either_way(value, needle)))
        .map(|(idx, _)| idx)
        .collect()
}

/// `needle` must already be trimmed and lowercased.
fn contains_either_way(value: &str, needle: &str) -> bool {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return false;
    }
    value.contains(needle) || needle.contains(&value)
}

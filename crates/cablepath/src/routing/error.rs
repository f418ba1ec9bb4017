use thiserror::Error;

/// Faults raised while building catalogues or routing a single cable.
///
/// Data problems that the report can express (unmatched equipment, missing
/// containment, disconnected networks) are statuses, not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("duplicate containment id '{0}'")]
    DuplicateUnitId(String),

    #[error("containment '{id}' is malformed: {reason}")]
    MalformedUnit { id: String, reason: String },

    #[error("equipment '{id}' has a non-finite location")]
    MalformedEquipment { id: String },

    #[error("no path from '{from}' to '{to}' inside a single island")]
    BrokenIsland { from: String, to: String },
}

//! Cable containment routing.
//!
//! For every cable in a manifest, find the tray/conduit route between its
//! source and destination equipment and describe it as a report row. The
//! engine lives in [`routing`]; catalogues are supplied by the caller.

pub mod config;
pub mod input;
pub mod routing;

pub use routing::batch::{BatchOutcome, Progress, run_batch, summarize};
pub use routing::error::RoutingError;
pub use routing::route_cable;
pub use routing::types::{
    CableEntry, Category, ContainmentCatalogue, ContainmentUnit, EquipmentCatalogue,
    EquipmentItem, MatchStatus, RouteResult, RouteStatus, RoutingOptions,
};

//! Application services: storage and lifecycle orchestration over the pure
//! calculation and workflow layers.

pub mod lifecycle;
pub mod store;

pub use lifecycle::{TimesheetDraft, TimesheetPatch, TimesheetService};
pub use store::{ActorRegistry, RecordedSessions, TimesheetStore};

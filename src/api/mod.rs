//! HTTP API module for the timesheet approval and rate engine.
//!
//! This module provides the REST endpoints for creating, quoting,
//! editing, approving, and removing casual-academic timesheets.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{create_router, ACTOR_HEADER};
pub use request::{
    ApprovalActionRequest, CreateTimesheetRequest, QuoteRequest, UpdateTimesheetRequest,
};
pub use response::{ApiError, ApprovalActionResponse};
pub use state::AppState;

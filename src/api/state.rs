//! Application state for the timesheet API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::service::TimesheetService;

/// Shared application state.
///
/// Wraps the timesheet service, which owns the policy snapshot, the
/// timesheet store, and the actor directory.
#[derive(Clone)]
pub struct AppState {
    service: Arc<TimesheetService>,
}

impl AppState {
    /// Creates a new application state around a timesheet service.
    pub fn new(service: TimesheetService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Returns a reference to the timesheet service.
    pub fn service(&self) -> &TimesheetService {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Required for axum state
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}

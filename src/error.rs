//! Error types for the timesheet engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during timesheet processing.
//!
//! The taxonomy separates caller mistakes (validation, authorization, state
//! conflicts) from operational data-integrity problems (policy configuration),
//! because the latter require a policy-data correction rather than a client
//! retry.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{ApprovalAction, ApprovalStatus, Qualification};

/// The main error type for the timesheet engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use catams_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Input violated a validation rule (non-Monday session date, wrong
    /// delivery-hour granularity, missing mandatory comment, ...).
    #[error("Validation failed for field '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the violation.
        message: String,
    },

    /// The actor lacks the role or ownership required for the operation.
    #[error("Not authorized: {message}")]
    Authorization {
        /// A description of the failed check.
        message: String,
    },

    /// The requested action is not valid for the timesheet's current status.
    ///
    /// Includes races where a concurrent transition already advanced the
    /// state; the caller must re-read the timesheet and resynchronize.
    #[error("Cannot perform action {action} from status {current_status}")]
    StateConflict {
        /// The action that was attempted.
        action: ApprovalAction,
        /// The status the timesheet was in when the action was attempted.
        current_status: ApprovalStatus,
    },

    /// No rate amount is effective for the requested rate code,
    /// qualification, and date. Indicates a gap in the policy snapshot.
    #[error("No effective rate for code '{rate_code}' ({qualification}) on date {date}")]
    NoEffectiveRate {
        /// The rate code that was requested.
        rate_code: String,
        /// The qualification band that was requested.
        qualification: Qualification,
        /// The date for which the rate was requested.
        date: NaiveDate,
    },

    /// The policy snapshot itself is inconsistent (e.g. overlapping
    /// effective windows for the same key, or an unknown rate code).
    ///
    /// Always fatal for the individual request; signals that the policy
    /// data needs correction, not that the user made a mistake.
    #[error("Policy configuration error: {message}")]
    PolicyConfiguration {
        /// A description of the data-integrity problem.
        message: String,
    },

    /// The referenced timesheet does not exist (or has been removed).
    #[error("Timesheet not found: {id}")]
    TimesheetNotFound {
        /// The id that was not found.
        id: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/file.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/file.yaml"
        );
    }

    #[test]
    fn test_validation_displays_field_and_message() {
        let error = EngineError::Validation {
            field: "session_date".to_string(),
            message: "must fall on a Monday".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Validation failed for field 'session_date': must fall on a Monday"
        );
    }

    #[test]
    fn test_state_conflict_displays_action_and_status() {
        let error = EngineError::StateConflict {
            action: ApprovalAction::TutorConfirm,
            current_status: ApprovalStatus::Rejected,
        };
        assert_eq!(
            error.to_string(),
            "Cannot perform action TUTOR_CONFIRM from status REJECTED"
        );
    }

    #[test]
    fn test_no_effective_rate_displays_key() {
        let error = EngineError::NoEffectiveRate {
            rate_code: "TU1".to_string(),
            qualification: Qualification::Phd,
            date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "No effective rate for code 'TU1' (PHD) on date 2020-01-06"
        );
    }

    #[test]
    fn test_policy_configuration_displays_message() {
        let error = EngineError::PolicyConfiguration {
            message: "overlapping effective windows for TU1/PHD".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Policy configuration error: overlapping effective windows for TU1/PHD"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::TimesheetNotFound {
                id: "missing".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}

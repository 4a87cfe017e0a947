//! Response types for the timesheet API.
//!
//! This module defines the error response structures, the mapping from
//! engine errors to HTTP status codes, and the approval-action response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{ApprovalAction, ApprovalStatus};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// The correlation id of the failed request, for log tracing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            correlation_id: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
            correlation_id: None,
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a missing-identity error response.
    pub fn missing_actor() -> Self {
        Self::new(
            "MISSING_ACTOR",
            "The X-Actor-Id header is required on every request",
        )
    }

    /// Attaches the request's correlation id so callers can quote it back.
    pub fn correlated(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Tags the error body with the request's correlation id.
    pub fn correlated(mut self, correlation_id: Uuid) -> Self {
        self.error = self.error.correlated(correlation_id);
        self
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::Validation { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("Validation failed for field '{}'", field),
                    message,
                ),
            },
            EngineError::Authorization { message } => ApiErrorResponse {
                status: StatusCode::FORBIDDEN,
                error: ApiError::new("FORBIDDEN", message),
            },
            EngineError::StateConflict {
                action,
                current_status,
            } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "STATE_CONFLICT",
                    format!("Cannot perform {} from status {}", action, current_status),
                    format!(
                        "The timesheet is currently in status {}; re-read it before retrying",
                        current_status
                    ),
                ),
            },
            // Missing and ambiguous rate rows are both policy-data
            // integrity failures, not user mistakes.
            EngineError::NoEffectiveRate {
                rate_code,
                qualification,
                date,
            } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "NO_EFFECTIVE_RATE",
                    format!(
                        "No effective rate for '{}' ({}) on {}",
                        rate_code, qualification, date
                    ),
                    "The policy snapshot has no rate row covering this date",
                ),
            },
            EngineError::PolicyConfiguration { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "POLICY_CONFIGURATION_ERROR",
                    "Policy configuration error",
                    message,
                ),
            },
            EngineError::TimesheetNotFound { id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new(
                    "TIMESHEET_NOT_FOUND",
                    format!("No timesheet with id {}", id),
                ),
            },
        }
    }
}

/// Response body for `POST /api/approvals` and the tutor-confirm alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalActionResponse {
    /// The timesheet the action was applied to.
    pub timesheet_id: Uuid,
    /// The action that was performed.
    pub action: ApprovalAction,
    /// True when the action was a confirmation step.
    pub confirmed: bool,
    /// True when the action rejected the timesheet.
    pub rejected: bool,
    /// True when the action requested modification.
    pub modification_requested: bool,
    /// The status the timesheet moved to.
    pub new_status: ApprovalStatus,
    /// Actions some suitably-privileged actor could take next.
    pub next_actions: Vec<ApprovalAction>,
    /// The acting user's identifier.
    pub actor_id: String,
    /// The acting user's display name.
    pub actor_name: String,
    /// When the transition was recorded.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Qualification;
    use chrono::NaiveDate;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_correlation_id_serialized_when_attached() {
        let correlation_id = Uuid::new_v4();
        let error = ApiError::new("TEST_ERROR", "Test message").correlated(correlation_id);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(&format!("\"correlation_id\":\"{}\"", correlation_id)));
    }

    #[test]
    fn test_validation_error_maps_to_400() {
        let response: ApiErrorResponse = EngineError::Validation {
            field: "session_date".to_string(),
            message: "must fall on a Monday".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_authorization_error_maps_to_403() {
        let response: ApiErrorResponse = EngineError::Authorization {
            message: "not yours".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_state_conflict_maps_to_409_with_current_status() {
        let response: ApiErrorResponse = EngineError::StateConflict {
            action: ApprovalAction::TutorConfirm,
            current_status: ApprovalStatus::Rejected,
        }
        .into();
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert!(response.error.message.contains("REJECTED"));
    }

    #[test]
    fn test_policy_errors_map_to_500() {
        let missing: ApiErrorResponse = EngineError::NoEffectiveRate {
            rate_code: "TU1".to_string(),
            qualification: Qualification::Phd,
            date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
        }
        .into();
        assert_eq!(missing.status, StatusCode::INTERNAL_SERVER_ERROR);

        let ambiguous: ApiErrorResponse = EngineError::PolicyConfiguration {
            message: "two effective rows".to_string(),
        }
        .into();
        assert_eq!(ambiguous.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response: ApiErrorResponse = EngineError::TimesheetNotFound {
            id: "abc".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}

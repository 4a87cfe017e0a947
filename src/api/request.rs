//! Request types for the timesheet API.
//!
//! Financial fields are deliberately absent from every request type: the
//! server derives rate code, hours, and amount itself, so any financial
//! values a client includes in the JSON body are silently dropped during
//! deserialization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ApprovalAction, ApprovalStatus, Qualification, TaskType};
use crate::service::{TimesheetDraft, TimesheetPatch};

/// Request body for `POST /api/timesheets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimesheetRequest {
    /// The tutor the session is claimed for.
    pub tutor_id: String,
    /// The course the session belongs to.
    pub course_id: String,
    /// The session date; must fall on a Monday.
    pub session_date: NaiveDate,
    /// The kind of academic activity.
    pub task_type: TaskType,
    /// The tutor's qualification band.
    pub qualification: Qualification,
    /// Claimed delivery hours.
    pub delivery_hours: Decimal,
    /// The repeat-session claim.
    #[serde(default)]
    pub repeat: bool,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Starting status; `DRAFT` when absent.
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
}

impl From<CreateTimesheetRequest> for TimesheetDraft {
    fn from(request: CreateTimesheetRequest) -> Self {
        TimesheetDraft {
            tutor_id: request.tutor_id,
            course_id: request.course_id,
            session_date: request.session_date,
            task_type: request.task_type,
            qualification: request.qualification,
            delivery_hours: request.delivery_hours,
            repeat: request.repeat,
            description: request.description,
            initial_status: request.status,
        }
    }
}

/// Request body for `PUT /api/timesheets/{id}`. Absent fields keep their
/// stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTimesheetRequest {
    /// New session date.
    #[serde(default)]
    pub session_date: Option<NaiveDate>,
    /// New task type.
    #[serde(default)]
    pub task_type: Option<TaskType>,
    /// New qualification band.
    #[serde(default)]
    pub qualification: Option<Qualification>,
    /// New delivery hours.
    #[serde(default)]
    pub delivery_hours: Option<Decimal>,
    /// New repeat-session claim.
    #[serde(default)]
    pub repeat: Option<bool>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdateTimesheetRequest> for TimesheetPatch {
    fn from(request: UpdateTimesheetRequest) -> Self {
        TimesheetPatch {
            session_date: request.session_date,
            task_type: request.task_type,
            qualification: request.qualification,
            delivery_hours: request.delivery_hours,
            repeat: request.repeat,
            description: request.description,
        }
    }
}

/// Request body for `POST /api/timesheets/quote` — the same rate-relevant
/// inputs as creation, resolved without persisting anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// The tutor the session would be claimed for.
    pub tutor_id: String,
    /// The course the session would belong to.
    pub course_id: String,
    /// The session date; must fall on a Monday.
    pub session_date: NaiveDate,
    /// The kind of academic activity.
    pub task_type: TaskType,
    /// The tutor's qualification band.
    pub qualification: Qualification,
    /// Claimed delivery hours.
    pub delivery_hours: Decimal,
    /// The repeat-session claim.
    #[serde(default)]
    pub repeat: bool,
}

impl From<QuoteRequest> for TimesheetDraft {
    fn from(request: QuoteRequest) -> Self {
        TimesheetDraft {
            tutor_id: request.tutor_id,
            course_id: request.course_id,
            session_date: request.session_date,
            task_type: request.task_type,
            qualification: request.qualification,
            delivery_hours: request.delivery_hours,
            repeat: request.repeat,
            description: None,
            initial_status: None,
        }
    }
}

/// Request body for `POST /api/approvals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalActionRequest {
    /// The timesheet the action applies to.
    pub timesheet_id: Uuid,
    /// The approval action to perform.
    pub action: ApprovalAction,
    /// Optional comment; mandatory for `REQUEST_MODIFICATION`.
    #[serde(default)]
    pub comment: Option<String>,
}

//! Approval workflow enums and the immutable approval record.
//!
//! Statuses and actions mirror the confirmation workflow: a timesheet moves
//! through tutor, lecturer, and administrator custody, with two terminal
//! sink states (`FINAL_CONFIRMED` and `REJECTED`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Role;

/// Position of a timesheet in its approval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Created but not yet submitted; editable by the creator.
    Draft,
    /// Submitted and awaiting the tutor's confirmation of accuracy.
    PendingTutorConfirmation,
    /// The tutor has confirmed; awaiting lecturer confirmation.
    TutorConfirmed,
    /// The lecturer has confirmed; awaiting the administrator's final sign-off.
    LecturerConfirmed,
    /// Finally confirmed and ready for payroll. Terminal.
    FinalConfirmed,
    /// Returned to the creator for corrections; editable again.
    ModificationRequested,
    /// Rejected. Terminal; resubmission requires a new timesheet.
    Rejected,
}

impl ApprovalStatus {
    /// Returns true for the two sink states from which no action is ever
    /// accepted, including by administrators.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApprovalStatus::FinalConfirmed | ApprovalStatus::Rejected
        )
    }

    /// Returns true while the timesheet is waiting on someone's confirmation.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            ApprovalStatus::PendingTutorConfirmation
                | ApprovalStatus::TutorConfirmed
                | ApprovalStatus::LecturerConfirmed
        )
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ApprovalStatus::Draft => "DRAFT",
            ApprovalStatus::PendingTutorConfirmation => "PENDING_TUTOR_CONFIRMATION",
            ApprovalStatus::TutorConfirmed => "TUTOR_CONFIRMED",
            ApprovalStatus::LecturerConfirmed => "LECTURER_CONFIRMED",
            ApprovalStatus::FinalConfirmed => "FINAL_CONFIRMED",
            ApprovalStatus::ModificationRequested => "MODIFICATION_REQUESTED",
            ApprovalStatus::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

/// An action performed against a timesheet's approval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalAction {
    /// Submit a draft (or returned) timesheet for tutor confirmation.
    /// `SUBMIT_DRAFT` is accepted as a legacy alias on the wire.
    #[serde(alias = "SUBMIT_DRAFT")]
    SubmitForApproval,
    /// The timesheet's own tutor confirms the claimed session.
    TutorConfirm,
    /// A lecturer assigned to the course confirms the timesheet.
    LecturerConfirm,
    /// An administrator grants final confirmation.
    HrConfirm,
    /// A lecturer or administrator sends the timesheet back for changes.
    /// Requires a non-empty comment.
    RequestModification,
    /// A lecturer or administrator rejects the timesheet outright.
    Reject,
}

impl ApprovalAction {
    /// Returns true for the confirmation-style actions that advance the
    /// timesheet toward final approval.
    pub fn is_confirmation(self) -> bool {
        matches!(
            self,
            ApprovalAction::TutorConfirm
                | ApprovalAction::LecturerConfirm
                | ApprovalAction::HrConfirm
        )
    }
}

impl std::fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ApprovalAction::SubmitForApproval => "SUBMIT_FOR_APPROVAL",
            ApprovalAction::TutorConfirm => "TUTOR_CONFIRM",
            ApprovalAction::LecturerConfirm => "LECTURER_CONFIRM",
            ApprovalAction::HrConfirm => "HR_CONFIRM",
            ApprovalAction::RequestModification => "REQUEST_MODIFICATION",
            ApprovalAction::Reject => "REJECT",
        };
        f.write_str(name)
    }
}

/// One immutable audit entry per successful status transition.
///
/// Records are append-only and owned exclusively by the timesheet they
/// belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRecord {
    /// The timesheet the action was performed on.
    pub timesheet_id: Uuid,
    /// The action that was taken.
    pub action: ApprovalAction,
    /// The user who performed the action.
    pub actor_id: String,
    /// The role the actor held when acting.
    pub actor_role: Role,
    /// Comment supplied with the action; mandatory for modification requests.
    pub comment: Option<String>,
    /// The status the timesheet moved to.
    pub resulting_status: ApprovalStatus,
    /// When the action was performed.
    pub timestamp: DateTime<Utc>,
}

//! Timesheet model and related enums.
//!
//! A timesheet represents one claimed casual-academic work session together
//! with the financial fields the rate resolution engine derived for it.
//! Financial fields are never accepted from a caller; they are recomputed on
//! creation and on any edit that changes a rate-relevant input.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::approval::{ApprovalRecord, ApprovalStatus};

/// The kind of academic activity a work session covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Tutorial delivery; always exactly one delivery hour per session.
    Tutorial,
    /// Lecture delivery, including developed and repeat lectures.
    Lecture,
    /// Other required academic activity (consultations, meetings).
    Oraa,
    /// Demonstration session (labs, practicals).
    Demo,
    /// Marking work.
    Marking,
    /// Miscellaneous academic activity; paid at the ORAA rates.
    Other,
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskType::Tutorial => "TUTORIAL",
            TaskType::Lecture => "LECTURE",
            TaskType::Oraa => "ORAA",
            TaskType::Demo => "DEMO",
            TaskType::Marking => "MARKING",
            TaskType::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// The tutor's qualification band at the time of the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Qualification {
    /// No doctoral qualification and no coordination duties.
    Standard,
    /// Holds a PhD; paid at the higher band.
    Phd,
    /// Coordinates the unit of study; paid at the higher band.
    Coordinator,
}

impl Qualification {
    /// Returns true for the PHD/COORDINATOR band, which attracts the
    /// higher Schedule 1 rates.
    pub fn is_high_band(self) -> bool {
        matches!(self, Qualification::Phd | Qualification::Coordinator)
    }
}

impl std::fmt::Display for Qualification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Qualification::Standard => "STANDARD",
            Qualification::Phd => "PHD",
            Qualification::Coordinator => "COORDINATOR",
        };
        f.write_str(name)
    }
}

/// Represents one claimed work session and its derived pay.
///
/// The `approvals` list is owned exclusively by the timesheet (composition):
/// one immutable record is appended for every successful status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timesheet {
    /// Unique identifier for the timesheet.
    pub id: Uuid,
    /// The tutor the session was worked by.
    pub tutor_id: String,
    /// The course the session belongs to.
    pub course_id: String,
    /// The session date; must fall on the canonical week-start Monday.
    pub session_date: NaiveDate,
    /// The kind of academic activity.
    pub task_type: TaskType,
    /// The tutor's qualification band at the time of the claim.
    pub qualification: Qualification,
    /// Hours of actual delivery claimed for the session.
    pub delivery_hours: Decimal,
    /// The repeat-session flag as the caller requested it.
    pub requested_repeat: bool,
    /// The repeat flag after eligibility evaluation; drives the rate.
    pub effective_repeat: bool,
    /// Free-text description; updatable without recomputation.
    #[serde(default)]
    pub description: String,

    // Derived financial fields. Always computed by the rate resolution
    // engine; any values submitted by a caller are discarded.
    /// The resolved Schedule 1 rate code (e.g. "TU1").
    pub rate_code: String,
    /// Associated (preparation/marking) hours credited for the session.
    pub associated_hours: Decimal,
    /// Delivery plus associated hours; the basis for the amount.
    pub payable_hours: Decimal,
    /// The hourly rate in force on the session date.
    pub hourly_rate: Decimal,
    /// Total amount payable for the session.
    pub amount: Decimal,
    /// Human-readable derivation of the amount, for audit display.
    pub formula: String,
    /// The enterprise-agreement clause the rate derives from.
    pub clause_reference: String,
    /// The policy version in force on the session date.
    pub policy_version: String,

    /// Current position in the approval lifecycle.
    pub status: ApprovalStatus,
    /// The user who created the timesheet (lecturer or administrator).
    pub created_by: String,
    /// Append-only approval history.
    #[serde(default)]
    pub approvals: Vec<ApprovalRecord>,
    /// Soft-removal marker; set only after a terminal state is reached.
    #[serde(default)]
    pub deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Timesheet {
    /// Returns true while the timesheet can still be edited by its creator.
    pub fn is_editable(&self) -> bool {
        matches!(
            self.status,
            ApprovalStatus::Draft | ApprovalStatus::ModificationRequested
        )
    }

    /// Appends an approval record and moves the timesheet to the record's
    /// resulting status.
    pub fn apply_transition(&mut self, record: ApprovalRecord) {
        self.status = record.resulting_status;
        self.updated_at = record.timestamp;
        self.approvals.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskType::Tutorial).unwrap(),
            "\"TUTORIAL\""
        );
        assert_eq!(serde_json::to_string(&TaskType::Oraa).unwrap(), "\"ORAA\"");
        assert_eq!(
            serde_json::to_string(&TaskType::Marking).unwrap(),
            "\"MARKING\""
        );
    }

    #[test]
    fn test_qualification_serialization() {
        assert_eq!(
            serde_json::to_string(&Qualification::Phd).unwrap(),
            "\"PHD\""
        );
        assert_eq!(
            serde_json::to_string(&Qualification::Coordinator).unwrap(),
            "\"COORDINATOR\""
        );
    }

    #[test]
    fn test_high_band_qualifications() {
        assert!(Qualification::Phd.is_high_band());
        assert!(Qualification::Coordinator.is_high_band());
        assert!(!Qualification::Standard.is_high_band());
    }

    #[test]
    fn test_task_type_display_matches_wire_format() {
        for task in [
            TaskType::Tutorial,
            TaskType::Lecture,
            TaskType::Oraa,
            TaskType::Demo,
            TaskType::Marking,
            TaskType::Other,
        ] {
            let wire = serde_json::to_string(&task).unwrap();
            assert_eq!(wire, format!("\"{}\"", task));
        }
    }
}

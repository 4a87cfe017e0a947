//! Role-gated approval state machine.
//!
//! Every legal transition lives in one static table of
//! (action, allowed-from states, required capability, resulting status)
//! tuples. Evaluation checks the from-state first and the actor's
//! capability second, so a stale caller learns about a state conflict and
//! an unauthorised caller is never told more than "forbidden".
//!
//! The table is pure data; the service layer is responsible for reading
//! the current status and applying the resulting status atomically.

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, ApprovalAction, ApprovalStatus, Role, Timesheet};

/// What an actor must be, relative to the timesheet, to take an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The timesheet's own tutor.
    OwnTutor,
    /// A lecturer assigned to the timesheet's course.
    AssignedLecturer,
    /// Any administrator.
    Administrator,
    /// An assigned lecturer or any administrator.
    LecturerOrAdmin,
}

impl Capability {
    /// Whether `actor` holds this capability for `timesheet`.
    pub fn permits(self, actor: &Actor, timesheet: &Timesheet) -> bool {
        match self {
            Capability::OwnTutor => {
                actor.role == Role::Tutor && actor.id == timesheet.tutor_id
            }
            Capability::AssignedLecturer => {
                actor.role == Role::Lecturer && actor.is_assigned_to(&timesheet.course_id)
            }
            Capability::Administrator => actor.role == Role::Admin,
            Capability::LecturerOrAdmin => {
                Capability::AssignedLecturer.permits(actor, timesheet)
                    || Capability::Administrator.permits(actor, timesheet)
            }
        }
    }
}

/// One row of the transition table.
#[derive(Debug)]
pub struct TransitionRule {
    /// The action this rule governs.
    pub action: ApprovalAction,
    /// Statuses the action may be taken from.
    pub from: &'static [ApprovalStatus],
    /// The capability the actor must hold.
    pub capability: Capability,
    /// The status the timesheet moves to.
    pub to: ApprovalStatus,
}

/// The complete transition table. One rule per action; terminal states
/// appear in no rule's `from` list, so nothing ever leaves them.
pub const TRANSITION_TABLE: &[TransitionRule] = &[
    TransitionRule {
        action: ApprovalAction::SubmitForApproval,
        from: &[ApprovalStatus::Draft, ApprovalStatus::ModificationRequested],
        capability: Capability::OwnTutor,
        to: ApprovalStatus::PendingTutorConfirmation,
    },
    TransitionRule {
        action: ApprovalAction::TutorConfirm,
        from: &[ApprovalStatus::PendingTutorConfirmation],
        capability: Capability::OwnTutor,
        to: ApprovalStatus::TutorConfirmed,
    },
    TransitionRule {
        action: ApprovalAction::LecturerConfirm,
        from: &[ApprovalStatus::TutorConfirmed],
        capability: Capability::AssignedLecturer,
        to: ApprovalStatus::LecturerConfirmed,
    },
    TransitionRule {
        action: ApprovalAction::HrConfirm,
        from: &[ApprovalStatus::LecturerConfirmed],
        capability: Capability::Administrator,
        to: ApprovalStatus::FinalConfirmed,
    },
    TransitionRule {
        action: ApprovalAction::RequestModification,
        from: &[
            ApprovalStatus::TutorConfirmed,
            ApprovalStatus::LecturerConfirmed,
        ],
        capability: Capability::LecturerOrAdmin,
        to: ApprovalStatus::ModificationRequested,
    },
    TransitionRule {
        action: ApprovalAction::Reject,
        from: &[
            ApprovalStatus::Draft,
            ApprovalStatus::PendingTutorConfirmation,
            ApprovalStatus::TutorConfirmed,
            ApprovalStatus::LecturerConfirmed,
            ApprovalStatus::ModificationRequested,
        ],
        capability: Capability::LecturerOrAdmin,
        to: ApprovalStatus::Rejected,
    },
];

fn rule_for(action: ApprovalAction) -> &'static TransitionRule {
    TRANSITION_TABLE
        .iter()
        .find(|rule| rule.action == action)
        .unwrap_or_else(|| unreachable!("every action has a rule"))
}

/// Validates a transition against the timesheet's current status and the
/// actor's capability, returning the resulting status.
///
/// A modification request must carry a non-empty comment; every other
/// action treats the comment as optional annotation.
pub fn evaluate_transition(
    action: ApprovalAction,
    comment: Option<&str>,
    actor: &Actor,
    timesheet: &Timesheet,
) -> EngineResult<ApprovalStatus> {
    if action == ApprovalAction::RequestModification
        && comment.is_none_or(|c| c.trim().is_empty())
    {
        return Err(EngineError::Validation {
            field: "comment".to_string(),
            message: "A comment is required when requesting modification".to_string(),
        });
    }

    let rule = rule_for(action);
    if !rule.from.contains(&timesheet.status) {
        return Err(EngineError::StateConflict {
            action,
            current_status: timesheet.status,
        });
    }
    if !rule.capability.permits(actor, timesheet) {
        return Err(EngineError::Authorization {
            message: format!(
                "Actor '{}' ({}) may not perform {} on this timesheet",
                actor.id, actor.role, action
            ),
        });
    }
    Ok(rule.to)
}

/// Actions that some suitably-privileged actor could take from `status`.
/// Terminal states return an empty list.
pub fn next_actions(status: ApprovalStatus) -> Vec<ApprovalAction> {
    TRANSITION_TABLE
        .iter()
        .filter(|rule| rule.from.contains(&status))
        .map(|rule| rule.action)
        .collect()
}

//! Timesheet lifecycle orchestration.
//!
//! `TimesheetService` ties the pure calculation and workflow layers to the
//! store: creation and rate-relevant edits always pass through rate
//! resolution (client-submitted financial values never survive), and
//! approval actions run through the state machine inside the store's
//! atomic transition.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::calculation::{resolve_rate, RateResolution, RepeatCandidate, ResolutionRequest};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, ApprovalAction, ApprovalRecord, ApprovalStatus, Qualification, Role, TaskType,
    Timesheet,
};
use crate::policy::PolicySnapshot;

use super::store::{ActorRegistry, TimesheetStore};

/// Rate-relevant inputs for a quote or a new timesheet. Financial fields
/// have no place here; they are always derived.
#[derive(Debug, Clone)]
pub struct TimesheetDraft {
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
    /// The repeat-session claim as submitted.
    pub repeat: bool,
    /// Free-text description.
    pub description: Option<String>,
    /// Starting status; `DRAFT` when absent. Only `DRAFT` and
    /// `PENDING_TUTOR_CONFIRMATION` are accepted.
    pub initial_status: Option<ApprovalStatus>,
}

/// A partial edit. Absent fields keep their stored values; any present
/// rate-relevant field forces recomputation of the financial fields.
#[derive(Debug, Clone, Default)]
pub struct TimesheetPatch {
    /// New session date.
    pub session_date: Option<NaiveDate>,
    /// New task type.
    pub task_type: Option<TaskType>,
    /// New qualification band.
    pub qualification: Option<Qualification>,
    /// New delivery hours.
    pub delivery_hours: Option<Decimal>,
    /// New repeat-session claim.
    pub repeat: Option<bool>,
    /// New description; updates without recomputation.
    pub description: Option<String>,
}

impl TimesheetPatch {
    fn touches_rate_inputs(&self) -> bool {
        self.session_date.is_some()
            || self.task_type.is_some()
            || self.qualification.is_some()
            || self.delivery_hours.is_some()
            || self.repeat.is_some()
    }
}

/// Application service for the timesheet lifecycle.
#[derive(Debug)]
pub struct TimesheetService {
    policy: PolicySnapshot,
    timesheets: TimesheetStore,
    actors: ActorRegistry,
}

impl TimesheetService {
    /// Builds a service over a loaded policy snapshot and a seeded actor
    /// directory.
    pub fn new(policy: PolicySnapshot, actors: Vec<Actor>) -> Self {
        Self {
            policy,
            timesheets: TimesheetStore::new(),
            actors: ActorRegistry::new(actors),
        }
    }

    /// Resolves the actor behind an `X-Actor-Id` header value.
    pub async fn actor(&self, actor_id: &str) -> EngineResult<Actor> {
        self.actors.get(actor_id).await
    }

    /// Dry-run rate resolution. Persists nothing.
    pub async fn quote(&self, draft: &TimesheetDraft) -> EngineResult<RateResolution> {
        self.resolve(draft, None).await
    }

    /// Creates a timesheet. Tutors never self-create; the creator must be
    /// a lecturer assigned to the course or an administrator.
    pub async fn create(&self, actor: &Actor, draft: TimesheetDraft) -> EngineResult<Timesheet> {
        match actor.role {
            Role::Admin => {}
            Role::Lecturer if actor.is_assigned_to(&draft.course_id) => {}
            _ => {
                return Err(EngineError::Authorization {
                    message: format!(
                        "Actor '{}' ({}) may not create timesheets for course {}",
                        actor.id, actor.role, draft.course_id
                    ),
                });
            }
        }

        let status = match draft.initial_status {
            None | Some(ApprovalStatus::Draft) => ApprovalStatus::Draft,
            Some(ApprovalStatus::PendingTutorConfirmation) => {
                ApprovalStatus::PendingTutorConfirmation
            }
            Some(other) => {
                return Err(EngineError::Validation {
                    field: "status".to_string(),
                    message: format!("Timesheets cannot be created in status {}", other),
                });
            }
        };

        let resolution = self.resolve(&draft, None).await?;
        let now = Utc::now();
        let timesheet = Timesheet {
            id: Uuid::new_v4(),
            tutor_id: draft.tutor_id,
            course_id: draft.course_id,
            session_date: resolution.session_date,
            task_type: resolution.task_type,
            qualification: resolution.qualification,
            delivery_hours: resolution.delivery_hours,
            requested_repeat: resolution.requested_repeat,
            effective_repeat: resolution.effective_repeat,
            description: draft.description.unwrap_or_default(),
            rate_code: resolution.rate_code,
            associated_hours: resolution.associated_hours,
            payable_hours: resolution.payable_hours,
            hourly_rate: resolution.hourly_rate,
            amount: resolution.amount,
            formula: resolution.formula,
            clause_reference: resolution.clause_reference,
            policy_version: resolution.policy_version,
            status,
            created_by: actor.id.clone(),
            approvals: vec![],
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        debug!(
            timesheet_id = %timesheet.id,
            rate_code = %timesheet.rate_code,
            amount = %timesheet.amount,
            "Timesheet created"
        );
        self.timesheets.insert(timesheet.clone()).await;
        Ok(timesheet)
    }

    /// Edits a timesheet while it is still editable. Touching any
    /// rate-relevant field reruns resolution, repeat eligibility included.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: TimesheetPatch,
    ) -> EngineResult<Timesheet> {
        let current = self.timesheets.get(id).await?;
        self.authorize_edit(actor, &current)?;
        if !current.is_editable() {
            return Err(EngineError::Validation {
                field: "status".to_string(),
                message: format!("Timesheet in status {} cannot be edited", current.status),
            });
        }

        let resolution = if patch.touches_rate_inputs() {
            let draft = TimesheetDraft {
                tutor_id: current.tutor_id.clone(),
                course_id: current.course_id.clone(),
                session_date: patch.session_date.unwrap_or(current.session_date),
                task_type: patch.task_type.unwrap_or(current.task_type),
                qualification: patch.qualification.unwrap_or(current.qualification),
                delivery_hours: patch.delivery_hours.unwrap_or(current.delivery_hours),
                repeat: patch.repeat.unwrap_or(current.requested_repeat),
                description: None,
                initial_status: None,
            };
            Some(self.resolve(&draft, Some(id)).await?)
        } else {
            None
        };

        self.timesheets
            .update_with(id, |timesheet| {
                if !timesheet.is_editable() {
                    return Err(EngineError::Validation {
                        field: "status".to_string(),
                        message: format!(
                            "Timesheet in status {} cannot be edited",
                            timesheet.status
                        ),
                    });
                }
                if let Some(description) = patch.description {
                    timesheet.description = description;
                }
                if let Some(resolution) = resolution {
                    timesheet.session_date = resolution.session_date;
                    timesheet.task_type = resolution.task_type;
                    timesheet.qualification = resolution.qualification;
                    timesheet.delivery_hours = resolution.delivery_hours;
                    timesheet.requested_repeat = resolution.requested_repeat;
                    timesheet.effective_repeat = resolution.effective_repeat;
                    timesheet.rate_code = resolution.rate_code;
                    timesheet.associated_hours = resolution.associated_hours;
                    timesheet.payable_hours = resolution.payable_hours;
                    timesheet.hourly_rate = resolution.hourly_rate;
                    timesheet.amount = resolution.amount;
                    timesheet.formula = resolution.formula;
                    timesheet.clause_reference = resolution.clause_reference;
                    timesheet.policy_version = resolution.policy_version;
                }
                timesheet.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    /// Performs an approval action, appending one approval record on
    /// success. The status check and the write happen under one lock.
    pub async fn perform_action(
        &self,
        actor: &Actor,
        id: Uuid,
        action: ApprovalAction,
        comment: Option<String>,
    ) -> EngineResult<Timesheet> {
        let actor = actor.clone();
        self.timesheets
            .transition(id, move |current| {
                let resulting_status = crate::workflow::evaluate_transition(
                    action,
                    comment.as_deref(),
                    &actor,
                    current,
                )?;
                Ok(ApprovalRecord {
                    timesheet_id: current.id,
                    action,
                    actor_id: actor.id.clone(),
                    actor_role: actor.role,
                    comment,
                    resulting_status,
                    timestamp: Utc::now(),
                })
            })
            .await
    }

    /// Fetches a timesheet with its full approval history.
    pub async fn get(&self, id: Uuid) -> EngineResult<Timesheet> {
        self.timesheets.get(id).await
    }

    /// Soft-removes a timesheet. Allowed only in a terminal status, or for
    /// a draft that never entered the approval flow.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> EngineResult<()> {
        let current = self.timesheets.get(id).await?;
        self.authorize_edit(actor, &current)?;

        self.timesheets
            .update_with(id, |timesheet| {
                let pristine_draft =
                    timesheet.status == ApprovalStatus::Draft && timesheet.approvals.is_empty();
                if !timesheet.status.is_terminal() && !pristine_draft {
                    return Err(EngineError::Validation {
                        field: "status".to_string(),
                        message: format!(
                            "Timesheet in status {} cannot be removed",
                            timesheet.status
                        ),
                    });
                }
                timesheet.deleted = true;
                timesheet.updated_at = Utc::now();
                Ok(())
            })
            .await?;
        Ok(())
    }

    fn authorize_edit(&self, actor: &Actor, timesheet: &Timesheet) -> EngineResult<()> {
        let permitted = match actor.role {
            Role::Admin => true,
            Role::Lecturer => {
                actor.id == timesheet.created_by || actor.is_assigned_to(&timesheet.course_id)
            }
            Role::Tutor => actor.id == timesheet.tutor_id,
        };
        if permitted {
            Ok(())
        } else {
            Err(EngineError::Authorization {
                message: format!(
                    "Actor '{}' ({}) may not modify this timesheet",
                    actor.id, actor.role
                ),
            })
        }
    }

    async fn resolve(
        &self,
        draft: &TimesheetDraft,
        exclude: Option<Uuid>,
    ) -> EngineResult<RateResolution> {
        let candidate = RepeatCandidate {
            tutor_id: &draft.tutor_id,
            course_id: &draft.course_id,
            qualification: draft.qualification,
            task_type: draft.task_type,
            session_date: draft.session_date,
        };
        let prior = self.timesheets.prior_sessions(&candidate, exclude).await;
        resolve_rate(
            &ResolutionRequest {
                tutor_id: &draft.tutor_id,
                course_id: &draft.course_id,
                task_type: draft.task_type,
                qualification: draft.qualification,
                session_date: draft.session_date,
                delivery_hours: draft.delivery_hours,
                requested_repeat: draft.repeat,
            },
            &self.policy,
            &prior,
        )
    }
}

//! In-memory persistence for timesheets and the actor directory.
//!
//! The store is the single place that holds mutable timesheet state. A
//! status transition is a check-then-write performed entirely under the
//! write lock, so two racing transitions on the same timesheet can never
//! both succeed; the loser observes the post-transition status and fails
//! the allowed-from-state check.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::calculation::{PriorSession, PriorSessionLookup, RepeatCandidate};
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, ApprovalRecord, Timesheet};

/// All stored timesheets, keyed by id. Soft-deleted rows stay in the map
/// but are invisible to reads and to repeat-eligibility scans.
#[derive(Debug, Default)]
pub struct TimesheetStore {
    inner: RwLock<HashMap<Uuid, Timesheet>>,
}

impl TimesheetStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly created timesheet.
    pub async fn insert(&self, timesheet: Timesheet) {
        self.inner.write().await.insert(timesheet.id, timesheet);
    }

    /// Fetches a timesheet by id. Soft-deleted timesheets read as absent.
    pub async fn get(&self, id: Uuid) -> EngineResult<Timesheet> {
        let guard = self.inner.read().await;
        match guard.get(&id) {
            Some(found) if !found.deleted => Ok(found.clone()),
            _ => Err(EngineError::TimesheetNotFound { id: id.to_string() }),
        }
    }

    /// Applies `mutate` to the stored timesheet under the write lock and
    /// returns the updated copy.
    pub async fn update_with<F>(&self, id: Uuid, mutate: F) -> EngineResult<Timesheet>
    where
        F: FnOnce(&mut Timesheet) -> EngineResult<()>,
    {
        let mut guard = self.inner.write().await;
        let timesheet = guard
            .get_mut(&id)
            .filter(|t| !t.deleted)
            .ok_or_else(|| EngineError::TimesheetNotFound { id: id.to_string() })?;
        mutate(timesheet)?;
        Ok(timesheet.clone())
    }

    /// Runs an approval transition atomically: `evaluate` sees the freshly
    /// read current state, and the returned record is applied before the
    /// write lock is released.
    pub async fn transition<F>(&self, id: Uuid, evaluate: F) -> EngineResult<Timesheet>
    where
        F: FnOnce(&Timesheet) -> EngineResult<ApprovalRecord>,
    {
        let mut guard = self.inner.write().await;
        let timesheet = guard
            .get_mut(&id)
            .filter(|t| !t.deleted)
            .ok_or_else(|| EngineError::TimesheetNotFound { id: id.to_string() })?;
        let record = evaluate(timesheet)?;
        timesheet.apply_transition(record);
        Ok(timesheet.clone())
    }

    /// Collects the prior sessions relevant to a repeat-eligibility check:
    /// same tutor, course, qualification, and task type, not soft-deleted.
    ///
    /// `exclude` omits the timesheet being edited so it never counts as its
    /// own prior session. The scan runs fresh on every call; eligibility is
    /// never cached because sibling timesheets come and go between requests.
    pub async fn prior_sessions(
        &self,
        candidate: &RepeatCandidate<'_>,
        exclude: Option<Uuid>,
    ) -> RecordedSessions {
        let guard = self.inner.read().await;
        let sessions = guard
            .values()
            .filter(|t| !t.deleted && Some(t.id) != exclude)
            .filter(|t| {
                t.tutor_id == candidate.tutor_id
                    && t.course_id == candidate.course_id
                    && t.qualification == candidate.qualification
                    && t.task_type == candidate.task_type
            })
            .map(|t| PriorSession {
                session_date: t.session_date,
                repeat: t.effective_repeat,
            })
            .collect();
        RecordedSessions(sessions)
    }
}

/// A snapshot of prior sessions taken under the store's read lock, usable
/// by the synchronous resolution path.
#[derive(Debug, Clone)]
pub struct RecordedSessions(pub Vec<PriorSession>);

impl PriorSessionLookup for RecordedSessions {
    fn matching_sessions(&self, _candidate: &RepeatCandidate<'_>) -> Vec<PriorSession> {
        self.0.clone()
    }
}

/// Known actors, keyed by the identifier presented in `X-Actor-Id`.
#[derive(Debug, Default)]
pub struct ActorRegistry {
    inner: RwLock<HashMap<String, Actor>>,
}

impl ActorRegistry {
    /// Creates a registry seeded with the given actors.
    pub fn new(actors: Vec<Actor>) -> Self {
        let inner = actors
            .into_iter()
            .map(|actor| (actor.id.clone(), actor))
            .collect();
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Adds or replaces an actor.
    pub async fn register(&self, actor: Actor) {
        self.inner.write().await.insert(actor.id.clone(), actor);
    }

    /// Looks up an actor; unknown identities are an authorization failure.
    pub async fn get(&self, actor_id: &str) -> EngineResult<Actor> {
        self.inner
            .read()
            .await
            .get(actor_id)
            .cloned()
            .ok_or_else(|| EngineError::Authorization {
                message: format!("Unknown actor '{}'", actor_id),
            })
    }
}

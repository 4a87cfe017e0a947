//! Repeat-session eligibility evaluation.
//!
//! A repeat session reuses the previous week's preparation, earning reduced
//! associated hours. A claim is only honoured if a genuinely eligible prior
//! session exists: same tutor, course, qualification, and task type, dated
//! strictly before the candidate, within the eligibility window, and not
//! itself a repeat. Ineligible claims are downgraded, and the downgrade is
//! reported so clients can reconcile their state with server truth.
//!
//! Eligibility must be evaluated fresh on every resolution call; sibling
//! timesheets can be created or deleted between calls, so results are never
//! cached across requests.

use chrono::{Duration, NaiveDate};

use crate::models::{Qualification, TaskType};

/// The Schedule 1 repeat eligibility window in days.
pub const REPEAT_ELIGIBILITY_WINDOW_DAYS: i64 = 7;

/// The session being claimed, as a repeat-eligibility lookup key.
#[derive(Debug, Clone)]
pub struct RepeatCandidate<'a> {
    /// The claiming tutor.
    pub tutor_id: &'a str,
    /// The course the session belongs to.
    pub course_id: &'a str,
    /// The qualification band of the claim.
    pub qualification: Qualification,
    /// The task type of the claim.
    pub task_type: TaskType,
    /// The candidate session date.
    pub session_date: NaiveDate,
}

/// A prior session considered during eligibility evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PriorSession {
    /// The prior session's date.
    pub session_date: NaiveDate,
    /// Whether the prior session was itself claimed as a repeat.
    pub repeat: bool,
}

/// Source of prior sessions for eligibility evaluation.
///
/// Implementations return every known session matching the candidate's
/// tutor, course, qualification, and task type; the window and repeat
/// filters are applied here, not by the implementation.
pub trait PriorSessionLookup {
    /// Returns the sessions matching the candidate's identity key.
    fn matching_sessions(&self, candidate: &RepeatCandidate<'_>) -> Vec<PriorSession>;
}

/// The outcome of evaluating a repeat-session claim.
///
/// `requested` and `effective` are kept distinct so the asymmetry between
/// claimed and honoured intent is always visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatEligibility {
    /// The repeat flag as the caller requested it.
    pub requested: bool,
    /// The repeat flag after eligibility evaluation.
    pub effective: bool,
}

impl RepeatEligibility {
    /// Returns true if the claim was downgraded.
    pub fn is_downgraded(self) -> bool {
        self.requested && !self.effective
    }
}

/// Evaluates a repeat-session claim against prior sessions.
///
/// Repeat pricing only exists for tutorials and lectures; claims on other
/// task types are always downgraded. For eligible task types the claim
/// holds if some prior non-repeat session lies strictly before the
/// candidate date and no more than [`REPEAT_ELIGIBILITY_WINDOW_DAYS`] days
/// earlier.
pub fn evaluate_repeat_claim(
    requested: bool,
    candidate: &RepeatCandidate<'_>,
    lookup: &dyn PriorSessionLookup,
) -> RepeatEligibility {
    if !requested {
        return RepeatEligibility {
            requested,
            effective: false,
        };
    }

    if !matches!(candidate.task_type, TaskType::Tutorial | TaskType::Lecture) {
        return RepeatEligibility {
            requested,
            effective: false,
        };
    }

    let window = Duration::days(REPEAT_ELIGIBILITY_WINDOW_DAYS);
    let eligible = lookup.matching_sessions(candidate).iter().any(|prior| {
        !prior.repeat
            && prior.session_date < candidate.session_date
            && candidate.session_date - prior.session_date <= window
    });

    RepeatEligibility {
        requested,
        effective: eligible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSessions(Vec<PriorSession>);

    impl PriorSessionLookup for FixedSessions {
        fn matching_sessions(&self, _candidate: &RepeatCandidate<'_>) -> Vec<PriorSession> {
            self.0.clone()
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn candidate(session_date: &str) -> RepeatCandidate<'static> {
        RepeatCandidate {
            tutor_id: "tutor_001",
            course_id: "COMP2022",
            qualification: Qualification::Phd,
            task_type: TaskType::Tutorial,
            session_date: date(session_date),
        }
    }

    fn prior(session_date: &str, repeat: bool) -> PriorSession {
        PriorSession {
            session_date: date(session_date),
            repeat,
        }
    }

    #[test]
    fn test_prior_session_seven_days_before_is_eligible() {
        let lookup = FixedSessions(vec![prior("2024-07-08", false)]);
        let result = evaluate_repeat_claim(true, &candidate("2024-07-15"), &lookup);
        assert!(result.effective);
        assert!(!result.is_downgraded());
    }

    #[test]
    fn test_prior_session_more_than_seven_days_before_is_downgraded() {
        let lookup = FixedSessions(vec![prior("2024-07-01", false)]);
        let result = evaluate_repeat_claim(true, &candidate("2024-07-15"), &lookup);
        assert!(!result.effective);
        assert!(result.is_downgraded());
    }

    #[test]
    fn test_prior_repeat_session_does_not_qualify() {
        let lookup = FixedSessions(vec![prior("2024-07-08", true)]);
        let result = evaluate_repeat_claim(true, &candidate("2024-07-15"), &lookup);
        assert!(result.is_downgraded());
    }

    #[test]
    fn test_same_day_session_does_not_qualify() {
        // The prior session must be strictly before the candidate date.
        let lookup = FixedSessions(vec![prior("2024-07-15", false)]);
        let result = evaluate_repeat_claim(true, &candidate("2024-07-15"), &lookup);
        assert!(result.is_downgraded());
    }

    #[test]
    fn test_later_session_does_not_qualify() {
        let lookup = FixedSessions(vec![prior("2024-07-22", false)]);
        let result = evaluate_repeat_claim(true, &candidate("2024-07-15"), &lookup);
        assert!(result.is_downgraded());
    }

    #[test]
    fn test_no_prior_sessions_downgrades() {
        let lookup = FixedSessions(vec![]);
        let result = evaluate_repeat_claim(true, &candidate("2024-07-15"), &lookup);
        assert!(result.is_downgraded());
    }

    #[test]
    fn test_unrequested_claim_stays_false() {
        let lookup = FixedSessions(vec![prior("2024-07-08", false)]);
        let result = evaluate_repeat_claim(false, &candidate("2024-07-15"), &lookup);
        assert!(!result.requested);
        assert!(!result.effective);
        assert!(!result.is_downgraded());
    }

    #[test]
    fn test_repeat_claim_on_marking_is_downgraded() {
        let lookup = FixedSessions(vec![prior("2024-07-08", false)]);
        let mut c = candidate("2024-07-15");
        c.task_type = TaskType::Marking;
        let result = evaluate_repeat_claim(true, &c, &lookup);
        assert!(result.is_downgraded());
    }

    #[test]
    fn test_one_eligible_among_ineligible_qualifies() {
        let lookup = FixedSessions(vec![
            prior("2024-06-03", false),
            prior("2024-07-08", true),
            prior("2024-07-08", false),
        ]);
        let result = evaluate_repeat_claim(true, &candidate("2024-07-15"), &lookup);
        assert!(result.effective);
    }
}

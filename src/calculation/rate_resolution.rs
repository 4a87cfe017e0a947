//! Schedule 1 rate resolution.
//!
//! The engine is a pure computation over the policy snapshot: given a task
//! type, qualification, repeat claim, delivery hours, and session date it
//! derives the rate code, associated/payable hours, hourly rate, amount,
//! and a human-readable formula naming the agreement clause.
//!
//! Client-submitted financial values never reach this module; callers pass
//! only the rate-relevant inputs and receive the authoritative result.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{Qualification, TaskType};
use crate::policy::PolicySnapshot;

use super::repeat_eligibility::{
    evaluate_repeat_claim, PriorSessionLookup, RepeatCandidate, RepeatEligibility,
};
use super::session_rules::{validate_delivery_hours, validate_session_date};

/// Rate-relevant inputs for one resolution call.
#[derive(Debug, Clone)]
pub struct ResolutionRequest<'a> {
    /// The claiming tutor; part of the repeat-eligibility key.
    pub tutor_id: &'a str,
    /// The course; part of the repeat-eligibility key.
    pub course_id: &'a str,
    /// The kind of academic activity.
    pub task_type: TaskType,
    /// The tutor's qualification band.
    pub qualification: Qualification,
    /// The session date; must fall on a Monday.
    pub session_date: NaiveDate,
    /// Claimed delivery hours.
    pub delivery_hours: Decimal,
    /// The repeat-session claim as submitted.
    pub requested_repeat: bool,
}

/// The authoritative result of rate resolution.
///
/// `requested_repeat` and `effective_repeat` are reported separately: when
/// an ineligible repeat claim is downgraded, the engine resolves the
/// non-repeat rate directly and the two flags differ, so a client can
/// reconcile its UI state with server truth.
#[derive(Debug, Clone, Serialize)]
pub struct RateResolution {
    /// The session date the rate was resolved for.
    pub session_date: NaiveDate,
    /// The task type of the claim.
    pub task_type: TaskType,
    /// The qualification band of the claim.
    pub qualification: Qualification,
    /// The repeat flag as the caller requested it.
    pub requested_repeat: bool,
    /// The repeat flag the rate was actually resolved with.
    pub effective_repeat: bool,
    /// The resolved Schedule 1 rate code.
    pub rate_code: String,
    /// Delivery hours, normalised to one decimal place.
    pub delivery_hours: Decimal,
    /// Associated hours credited for the session.
    pub associated_hours: Decimal,
    /// Delivery plus associated hours, after any policy cap.
    pub payable_hours: Decimal,
    /// The hourly rate in force on the session date.
    pub hourly_rate: Decimal,
    /// Total amount payable for the session.
    pub amount: Decimal,
    /// Human-readable derivation for audit display.
    pub formula: String,
    /// The agreement clause the rate derives from.
    pub clause_reference: String,
    /// The policy version in force on the session date.
    pub policy_version: String,
}

/// Selects the Schedule 1 rate code for a task, qualification, and
/// (effective) repeat status.
///
/// The mapping is the governing rate table: tutorials and lectures have
/// repeat variants; ORAA, demonstrations, and miscellaneous activity split
/// by qualification band; marking uses a single code for all bands.
pub fn select_rate_code(
    task_type: TaskType,
    qualification: Qualification,
    repeat: bool,
) -> &'static str {
    let high_band = qualification.is_high_band();
    match task_type {
        TaskType::Tutorial => match (repeat, high_band) {
            (false, true) => "TU1",
            (false, false) => "TU2",
            (true, true) => "TU3",
            (true, false) => "TU4",
        },
        TaskType::Lecture => {
            if repeat {
                "P04"
            } else if qualification == Qualification::Coordinator {
                "P02"
            } else {
                "P03"
            }
        }
        // OTHER is miscellaneous academic activity, paid at the ORAA rates.
        TaskType::Oraa | TaskType::Other => {
            if high_band {
                "AO1"
            } else {
                "AO2"
            }
        }
        TaskType::Demo => {
            if high_band {
                "DE1"
            } else {
                "DE2"
            }
        }
        TaskType::Marking => "M05",
    }
}

/// Resolves the rate for one work session.
///
/// Validation (Monday session date, delivery-hour granularity) runs before
/// any policy lookup. The repeat claim is evaluated fresh against prior
/// sessions on every call; an ineligible claim is downgraded internally and
/// the non-repeat rate is returned.
pub fn resolve_rate(
    request: &ResolutionRequest<'_>,
    snapshot: &PolicySnapshot,
    prior_sessions: &dyn PriorSessionLookup,
) -> EngineResult<RateResolution> {
    validate_session_date(request.session_date)?;
    validate_delivery_hours(request.task_type, request.delivery_hours)?;

    let policy_version = snapshot.effective_version(request.session_date)?.code.clone();

    let eligibility = evaluate_repeat_claim(
        request.requested_repeat,
        &RepeatCandidate {
            tutor_id: request.tutor_id,
            course_id: request.course_id,
            qualification: request.qualification,
            task_type: request.task_type,
            session_date: request.session_date,
        },
        prior_sessions,
    );

    resolve_with_eligibility(request, snapshot, &policy_version, eligibility)
}

fn resolve_with_eligibility(
    request: &ResolutionRequest<'_>,
    snapshot: &PolicySnapshot,
    policy_version: &str,
    eligibility: RepeatEligibility,
) -> EngineResult<RateResolution> {
    let code = select_rate_code(
        request.task_type,
        request.qualification,
        eligibility.effective,
    );
    let definition = snapshot.rate_code(code)?;
    if definition.task_type != request.task_type && request.task_type != TaskType::Other {
        // The catalogue row disagrees with the selection table; the policy
        // snapshot needs correction.
        return Err(EngineError::PolicyConfiguration {
            message: format!(
                "rate code '{}' is defined for {} but was selected for {}",
                code, definition.task_type, request.task_type
            ),
        });
    }
    let row = snapshot.effective_amount(code, request.qualification, request.session_date)?;

    let delivery = round_hours(request.delivery_hours);

    let mut associated = definition.default_associated_hours;
    if let Some(cap) = row.max_associated_hours {
        associated = associated.min(cap);
    }
    if let Some(cap) = row.max_payable_hours {
        // Associated hours can never push payable hours past the cap.
        associated = associated.min((cap - delivery).max(Decimal::ZERO));
    }
    let associated = round_hours(associated);

    let mut payable = delivery + associated;
    if let Some(cap) = row.max_payable_hours {
        payable = payable.min(cap);
    }
    let payable = round_hours(payable);

    let (hourly_rate, amount) = match (row.session_amount, row.hourly_rate) {
        (Some(session), _) => {
            // Session-priced: the hourly rate is derived, and both
            // representations round-trip within a cent. A zero payable
            // window means the rate row's caps are unusable.
            if payable.is_zero() {
                return Err(EngineError::PolicyConfiguration {
                    message: format!("rate code '{}' caps payable hours at zero", code),
                });
            }
            let hourly = (session / payable)
                .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero);
            (hourly, round_amount(session))
        }
        (None, Some(hourly)) => {
            let amount = round_amount(hourly * payable);
            (hourly, amount)
        }
        (None, None) => {
            // The loader rejects this shape; reaching it means the snapshot
            // was constructed by hand with inconsistent data.
            return Err(EngineError::PolicyConfiguration {
                message: format!("rate amount for '{}' carries no pricing", code),
            });
        }
    };

    let formula = format!(
        "{}h delivery + {}h associated (EA {})",
        delivery.normalize(),
        associated.normalize(),
        definition.clause_reference
    );

    Ok(RateResolution {
        session_date: request.session_date,
        task_type: request.task_type,
        qualification: request.qualification,
        requested_repeat: eligibility.requested,
        effective_repeat: eligibility.effective,
        rate_code: code.to_string(),
        delivery_hours: delivery,
        associated_hours: associated,
        payable_hours: payable,
        hourly_rate,
        amount,
        formula,
        clause_reference: definition.clause_reference.clone(),
        policy_version: policy_version.to_string(),
    })
}

fn round_hours(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

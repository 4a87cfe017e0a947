//! Pure calculation layer: session validation, repeat eligibility, and
//! Schedule 1 rate resolution.
//!
//! Nothing in this module touches storage or the HTTP surface; everything is
//! a function of its inputs plus a [`PolicySnapshot`](crate::policy::PolicySnapshot),
//! which keeps the financial core trivially testable.

pub mod rate_resolution;
pub mod repeat_eligibility;
pub mod session_rules;

pub use rate_resolution::{resolve_rate, select_rate_code, RateResolution, ResolutionRequest};
pub use repeat_eligibility::{
    evaluate_repeat_claim, PriorSession, PriorSessionLookup, RepeatCandidate, RepeatEligibility,
    REPEAT_ELIGIBILITY_WINDOW_DAYS,
};
pub use session_rules::{
    validate_delivery_hours, validate_session_date, CANONICAL_WEEK_START,
};

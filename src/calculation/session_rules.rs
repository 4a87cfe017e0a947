//! Session-level validation rules.
//!
//! Two rules gate every resolution before any rate lookup runs: the session
//! date must fall on the canonical week-start weekday, and delivery hours
//! must satisfy the task type's granularity rule.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::TaskType;

/// The canonical week-start weekday every session date must fall on.
pub const CANONICAL_WEEK_START: Weekday = Weekday::Mon;

/// Validates that the session date falls on the canonical weekday.
///
/// # Example
///
/// ```
/// use catams_engine::calculation::validate_session_date;
/// use chrono::NaiveDate;
///
/// let monday = NaiveDate::from_ymd_opt(2024, 7, 8).unwrap();
/// assert!(validate_session_date(monday).is_ok());
///
/// let wednesday = NaiveDate::from_ymd_opt(2024, 7, 10).unwrap();
/// assert!(validate_session_date(wednesday).is_err());
/// ```
pub fn validate_session_date(date: NaiveDate) -> EngineResult<()> {
    if date.weekday() != CANONICAL_WEEK_START {
        return Err(EngineError::Validation {
            field: "session_date".to_string(),
            message: format!(
                "session date {} falls on {}, must be a Monday",
                date,
                date.weekday()
            ),
        });
    }
    Ok(())
}

/// Validates delivery hours against the task type's granularity rule.
///
/// Tutorials are a fixed one-hour delivery under Schedule 1, so any other
/// value is rejected. The remaining task types permit fractional hours but
/// must be positive.
pub fn validate_delivery_hours(task_type: TaskType, hours: Decimal) -> EngineResult<()> {
    if hours <= Decimal::ZERO {
        return Err(EngineError::Validation {
            field: "delivery_hours".to_string(),
            message: format!("delivery hours must be positive, got {}", hours),
        });
    }

    if task_type == TaskType::Tutorial && hours != Decimal::ONE {
        return Err(EngineError::Validation {
            field: "delivery_hours".to_string(),
            message: format!("tutorial delivery hours must equal 1.0, got {}", hours),
        });
    }

    Ok(())
}

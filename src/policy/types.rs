//! Policy snapshot types for rate resolution.
//!
//! This module contains the strongly-typed policy structures that are
//! deserialized from YAML configuration files: enterprise-agreement
//! versions, rate codes, and the time-bounded amounts attached to them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::models::{Qualification, TaskType};

/// One enterprise-agreement snapshot with its effective window.
///
/// Multiple versions may exist; exactly one must be effective for any
/// given date.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyVersion {
    /// Reference code for the agreement version (e.g. "EA2023").
    pub code: String,
    /// First date (inclusive) on which this version applies.
    pub effective_from: NaiveDate,
    /// First date on which this version no longer applies, if bounded.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Pointer to the source agreement document.
    pub source_url: String,
    /// Free-text notes about the version.
    #[serde(default)]
    pub notes: Option<String>,
}

impl PolicyVersion {
    /// Returns true if the version's window contains the given date.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.is_none_or(|to| date < to)
    }
}

/// The qualification band a rate amount is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateBand {
    /// Applies to STANDARD tutors only.
    Standard,
    /// Applies to PHD and COORDINATOR tutors.
    HighBand,
    /// Applies regardless of qualification.
    Any,
}

impl RateBand {
    /// Returns true if the band covers the given qualification.
    pub fn covers(self, qualification: Qualification) -> bool {
        match self {
            RateBand::Standard => qualification == Qualification::Standard,
            RateBand::HighBand => qualification.is_high_band(),
            RateBand::Any => true,
        }
    }
}

/// One compensation category under the agreement.
#[derive(Debug, Clone, Deserialize)]
pub struct RateCodeDef {
    /// The task type this code applies to.
    pub task_type: TaskType,
    /// A description of the category.
    pub description: String,
    /// Default delivery hours per session for this code.
    pub default_delivery_hours: Decimal,
    /// Default associated (preparation/marking) hours credited per session.
    pub default_associated_hours: Decimal,
    /// Whether the code requires the PHD/COORDINATOR band.
    #[serde(default)]
    pub requires_high_band: bool,
    /// Whether the code is the repeat-session variant of its activity.
    #[serde(default)]
    pub repeat_eligible: bool,
    /// Reference to the agreement clause defining this category.
    pub clause_reference: String,
}

/// Rate codes configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct RateCodesConfig {
    /// Map of rate code string to definition.
    pub rate_codes: HashMap<String, RateCodeDef>,
}

/// Policy versions configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyVersionsConfig {
    /// All known agreement versions.
    pub versions: Vec<PolicyVersion>,
}

/// The amount payable for one rate code under one policy version,
/// scoped to a qualification band and an effective window.
///
/// Exactly one of `hourly_rate` and `session_amount` must be set: hourly
/// rates multiply with payable hours; session amounts are fixed per session
/// and divide back into an hourly rate.
#[derive(Debug, Clone, Deserialize)]
pub struct RateAmount {
    /// The rate code this amount belongs to.
    pub rate_code: String,
    /// The qualification band this amount is scoped to.
    pub band: RateBand,
    /// Hourly amount in AUD, for hour-multiplied categories.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Fixed per-session amount in AUD, for session-priced categories.
    #[serde(default)]
    pub session_amount: Option<Decimal>,
    /// First date (inclusive) on which this amount applies.
    pub effective_from: NaiveDate,
    /// First date on which this amount no longer applies, if bounded.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Cap on associated hours credited, if any.
    #[serde(default)]
    pub max_associated_hours: Option<Decimal>,
    /// Cap on payable hours, if any.
    #[serde(default)]
    pub max_payable_hours: Option<Decimal>,
}

impl RateAmount {
    /// Returns true if the amount's window contains the given date.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.is_none_or(|to| date < to)
    }
}

/// Rate amounts file structure (one file per effective tranche).
#[derive(Debug, Clone, Deserialize)]
pub struct RateAmountsConfig {
    /// The policy version these amounts belong to.
    pub policy_version: String,
    /// The amount rows.
    pub amounts: Vec<RateAmount>,
}

/// The complete policy snapshot loaded from YAML files.
///
/// Resolves "the rule set effective on date D": the agreement version in
/// force, the definition of each rate code, and the single amount row
/// effective for a (rate code, qualification, date) key. Read-only at
/// request time.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    versions: Vec<PolicyVersion>,
    rate_codes: HashMap<String, RateCodeDef>,
    /// Amount rows sorted oldest-first by effective_from.
    amounts: Vec<RateAmount>,
}

impl PolicySnapshot {
    /// Creates a snapshot from its component parts.
    pub fn new(
        versions: Vec<PolicyVersion>,
        rate_codes: HashMap<String, RateCodeDef>,
        amounts: Vec<RateAmount>,
    ) -> Self {
        let mut versions = versions;
        versions.sort_by_key(|v| v.effective_from);
        let mut amounts = amounts;
        amounts.sort_by_key(|a| a.effective_from);
        Self {
            versions,
            rate_codes,
            amounts,
        }
    }

    /// Returns all known policy versions, oldest first.
    pub fn versions(&self) -> &[PolicyVersion] {
        &self.versions
    }

    /// Returns all rate code definitions.
    pub fn rate_codes(&self) -> &HashMap<String, RateCodeDef> {
        &self.rate_codes
    }

    /// Resolves the policy version effective on the given date.
    ///
    /// Exactly one version must be effective; zero or several is a
    /// data-integrity problem and fails loudly.
    pub fn effective_version(&self, date: NaiveDate) -> EngineResult<&PolicyVersion> {
        let mut matches = self.versions.iter().filter(|v| v.is_effective_on(date));
        let first = matches.next().ok_or_else(|| EngineError::PolicyConfiguration {
            message: format!("no policy version effective on {}", date),
        })?;
        if matches.next().is_some() {
            return Err(EngineError::PolicyConfiguration {
                message: format!("more than one policy version effective on {}", date),
            });
        }
        Ok(first)
    }

    /// Looks up a rate code definition.
    ///
    /// An unknown code signals a policy-data gap, not a user error.
    pub fn rate_code(&self, code: &str) -> EngineResult<&RateCodeDef> {
        self.rate_codes
            .get(code)
            .ok_or_else(|| EngineError::PolicyConfiguration {
                message: format!("rate code '{}' is not defined in the policy snapshot", code),
            })
    }

    /// Resolves the single amount row effective for a rate code and
    /// qualification on the given date.
    ///
    /// More than one matching effective row violates the single-effective-row
    /// invariant and fails loudly rather than picking arbitrarily; none at
    /// all is a "no effective rate" error.
    pub fn effective_amount(
        &self,
        rate_code: &str,
        qualification: Qualification,
        date: NaiveDate,
    ) -> EngineResult<&RateAmount> {
        let mut matches = self.amounts.iter().filter(|a| {
            a.rate_code == rate_code && a.band.covers(qualification) && a.is_effective_on(date)
        });
        let first = matches.next().ok_or_else(|| EngineError::NoEffectiveRate {
            rate_code: rate_code.to_string(),
            qualification,
            date,
        })?;
        if matches.next().is_some() {
            return Err(EngineError::PolicyConfiguration {
                message: format!(
                    "more than one rate amount effective for '{}' ({}) on {}",
                    rate_code, qualification, date
                ),
            });
        }
        Ok(first)
    }
}

//! Policy snapshot loading functionality.
//!
//! This module provides the [`PolicyLoader`] type for loading the
//! enterprise-agreement policy snapshot from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    PolicySnapshot, PolicyVersionsConfig, RateAmount, RateAmountsConfig, RateCodesConfig,
};

/// Loads and provides access to the policy snapshot.
///
/// The `PolicyLoader` reads YAML configuration files from a directory and
/// hands out an immutable [`PolicySnapshot`] for rate resolution.
///
/// # Directory Structure
///
/// ```text
/// config/ea2023/
/// ├── policy.yaml       # Enterprise-agreement versions
/// ├── rate_codes.yaml   # Schedule 1 rate code catalogue
/// └── rates/
///     └── 2024-07-01.yaml  # Amounts effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use catams_engine::policy::PolicyLoader;
///
/// let loader = PolicyLoader::load("./config/ea2023").unwrap();
/// let snapshot = loader.snapshot();
/// println!("versions loaded: {}", snapshot.versions().len());
/// ```
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    snapshot: PolicySnapshot,
}

impl PolicyLoader {
    /// Loads the policy snapshot from the specified directory.
    ///
    /// Returns an error if any required file is missing, contains invalid
    /// YAML, or references rate codes or policy versions that are not
    /// defined elsewhere in the snapshot.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let versions_path = path.join("policy.yaml");
        let versions_config = Self::load_yaml::<PolicyVersionsConfig>(&versions_path)?;

        let rate_codes_path = path.join("rate_codes.yaml");
        let rate_codes_config = Self::load_yaml::<RateCodesConfig>(&rate_codes_path)?;

        let rates_dir = path.join("rates");
        let amounts = Self::load_amounts(&rates_dir, &versions_config, &rate_codes_config)?;

        Ok(Self {
            snapshot: PolicySnapshot::new(
                versions_config.versions,
                rate_codes_config.rate_codes,
                amounts,
            ),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all amount files from the rates directory and cross-checks
    /// their rate code and policy version references.
    fn load_amounts(
        rates_dir: &Path,
        versions: &PolicyVersionsConfig,
        rate_codes: &RateCodesConfig,
    ) -> EngineResult<Vec<RateAmount>> {
        let rates_dir_str = rates_dir.display().to_string();

        if !rates_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: rates_dir_str,
            });
        }

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut amounts = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let config = Self::load_yaml::<RateAmountsConfig>(&path)?;
                Self::validate_amounts(&config, versions, rate_codes)?;
                amounts.extend(config.amounts);
            }
        }

        if amounts.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(amounts)
    }

    fn validate_amounts(
        config: &RateAmountsConfig,
        versions: &PolicyVersionsConfig,
        rate_codes: &RateCodesConfig,
    ) -> EngineResult<()> {
        if !versions
            .versions
            .iter()
            .any(|v| v.code == config.policy_version)
        {
            return Err(EngineError::PolicyConfiguration {
                message: format!(
                    "rate amounts reference unknown policy version '{}'",
                    config.policy_version
                ),
            });
        }

        for amount in &config.amounts {
            if !rate_codes.rate_codes.contains_key(&amount.rate_code) {
                return Err(EngineError::PolicyConfiguration {
                    message: format!(
                        "rate amount references unknown rate code '{}'",
                        amount.rate_code
                    ),
                });
            }
            match (&amount.hourly_rate, &amount.session_amount) {
                (Some(_), Some(_)) | (None, None) => {
                    return Err(EngineError::PolicyConfiguration {
                        message: format!(
                            "rate amount for '{}' must set exactly one of hourly_rate and session_amount",
                            amount.rate_code
                        ),
                    });
                }
                _ => {}
            }
            for (name, cap) in [
                ("max_associated_hours", amount.max_associated_hours),
                ("max_payable_hours", amount.max_payable_hours),
            ] {
                if cap.is_some_and(|c| c.is_sign_negative() || c.is_zero()) {
                    return Err(EngineError::PolicyConfiguration {
                        message: format!(
                            "rate amount for '{}' has a non-positive {}",
                            amount.rate_code, name
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Returns the loaded snapshot.
    pub fn snapshot(&self) -> &PolicySnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Qualification, TaskType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/ea2023"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = PolicyLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load policy: {:?}", result.err());

        let loader = result.unwrap();
        let version = loader
            .snapshot()
            .effective_version(date("2024-07-08"))
            .unwrap();
        assert_eq!(version.code, "EA2023");
    }

    #[test]
    fn test_rate_code_catalogue_loaded() {
        let loader = PolicyLoader::load(config_path()).unwrap();
        let snapshot = loader.snapshot();

        let tu1 = snapshot.rate_code("TU1").unwrap();
        assert_eq!(tu1.task_type, TaskType::Tutorial);
        assert!(tu1.requires_high_band);
        assert!(!tu1.repeat_eligible);
        assert_eq!(tu1.default_associated_hours, dec("2.0"));

        let tu3 = snapshot.rate_code("TU3").unwrap();
        assert!(tu3.repeat_eligible);
        assert_eq!(tu3.default_associated_hours, dec("1.0"));
    }

    #[test]
    fn test_tutorial_session_amount_loaded() {
        let loader = PolicyLoader::load(config_path()).unwrap();
        let row = loader
            .snapshot()
            .effective_amount("TU1", Qualification::Phd, date("2024-07-08"))
            .unwrap();

        assert_eq!(row.session_amount, Some(dec("210.19")));
        assert_eq!(row.hourly_rate, None);
        assert_eq!(row.max_payable_hours, Some(dec("3.0")));
    }

    #[test]
    fn test_oraa_hourly_rate_loaded() {
        let loader = PolicyLoader::load(config_path()).unwrap();
        let row = loader
            .snapshot()
            .effective_amount("AO2", Qualification::Standard, date("2024-07-08"))
            .unwrap();

        assert_eq!(row.hourly_rate, Some(dec("58.32")));
        assert_eq!(row.session_amount, None);
    }

    #[test]
    fn test_marking_rate_covers_all_bands() {
        let loader = PolicyLoader::load(config_path()).unwrap();
        for q in [
            Qualification::Standard,
            Qualification::Phd,
            Qualification::Coordinator,
        ] {
            assert!(
                loader
                    .snapshot()
                    .effective_amount("M05", q, date("2024-07-08"))
                    .is_ok(),
                "M05 should cover {}",
                q
            );
        }
    }

    #[test]
    fn test_no_rate_before_first_effective_date() {
        let loader = PolicyLoader::load(config_path()).unwrap();
        let result =
            loader
                .snapshot()
                .effective_amount("TU1", Qualification::Phd, date("2020-01-06"));
        assert!(matches!(result, Err(EngineError::NoEffectiveRate { .. })));
    }

    #[test]
    fn test_non_positive_hour_caps_rejected() {
        use crate::policy::{PolicyVersion, RateBand, RateCodeDef};
        use std::collections::HashMap;

        let versions = PolicyVersionsConfig {
            versions: vec![PolicyVersion {
                code: "EA2023".to_string(),
                effective_from: date("2024-07-01"),
                effective_to: None,
                source_url: "https://example.edu/ea2023".to_string(),
                notes: None,
            }],
        };
        let rate_codes = RateCodesConfig {
            rate_codes: HashMap::from([(
                "TU1".to_string(),
                RateCodeDef {
                    task_type: TaskType::Tutorial,
                    description: "Tutorial".to_string(),
                    default_delivery_hours: dec("1.0"),
                    default_associated_hours: dec("2.0"),
                    requires_high_band: true,
                    repeat_eligible: false,
                    clause_reference: "Schedule 1 Clause 2.1".to_string(),
                },
            )]),
        };
        let row = |payable: &str| RateAmountsConfig {
            policy_version: "EA2023".to_string(),
            amounts: vec![RateAmount {
                rate_code: "TU1".to_string(),
                band: RateBand::HighBand,
                hourly_rate: None,
                session_amount: Some(dec("210.19")),
                effective_from: date("2024-07-01"),
                effective_to: None,
                max_associated_hours: None,
                max_payable_hours: Some(dec(payable)),
            }],
        };

        let result = PolicyLoader::validate_amounts(&row("0"), &versions, &rate_codes);
        assert!(matches!(
            result,
            Err(EngineError::PolicyConfiguration { message })
                if message.contains("non-positive max_payable_hours")
        ));

        let result = PolicyLoader::validate_amounts(&row("3.0"), &versions, &rate_codes);
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = PolicyLoader::load("/nonexistent/path");
        assert!(result.is_err());

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("policy.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}

//! Environment variable handling for configuration overrides.
//!
//! `ALLOT_*` variables override configuration file values.

use crate::config::schema::{Config, OutputFormat};
use crate::error::{Error, Result};
use crate::money::Currency;
use std::env;
use std::str::FromStr;

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use allot::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid
    /// (e.g., non-numeric batch size, invalid boolean).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(org) = env::var("ALLOT_ORG") {
            config.org = Some(org);
        }

        if let Ok(val) = env::var("ALLOT_BATCH_SIZE") {
            config.batch_size = Some(Self::parse_number("ALLOT_BATCH_SIZE", &val)?);
        }

        if let Ok(val) = env::var("ALLOT_LOW_AVAILABILITY_THRESHOLD") {
            config.low_availability_threshold_percent =
                Some(Self::parse_number("ALLOT_LOW_AVAILABILITY_THRESHOLD", &val)?);
        }

        if let Ok(val) = env::var("ALLOT_DISABLE_AUTOINIT") {
            config.disable_autoinit = Some(Self::parse_bool("ALLOT_DISABLE_AUTOINIT", &val)?);
        }

        if let Ok(val) = env::var("ALLOT_MAXIMUM_LOCK_WAIT_SECONDS") {
            config.maximum_lock_wait_seconds =
                Some(Self::parse_number("ALLOT_MAXIMUM_LOCK_WAIT_SECONDS", &val)?);
        }

        if let Ok(val) = env::var("ALLOT_OUTPUT_FORMAT") {
            config.output_format = Some(val.parse::<OutputFormat>().map_err(|message| {
                Error::Validation {
                    field: "ALLOT_OUTPUT_FORMAT".into(),
                    message,
                }
            })?);
        }

        if let Ok(val) = env::var("ALLOT_FLOOR_AT_ZERO") {
            let bulk = config.bulk.get_or_insert_with(Default::default);
            bulk.floor_at_zero = Some(Self::parse_bool("ALLOT_FLOOR_AT_ZERO", &val)?);
        }

        Self::apply_generation_overrides(config)
    }

    fn apply_generation_overrides(config: &mut Config) -> Result<()> {
        let mut generation = config.generation.clone().unwrap_or_default();
        let mut modified = false;

        if let Ok(val) = env::var("ALLOT_DEFAULT_QUANTITY") {
            generation.default_quantity = Some(Self::parse_number("ALLOT_DEFAULT_QUANTITY", &val)?);
            modified = true;
        }

        if let Ok(val) = env::var("ALLOT_CURRENCY") {
            generation.currency = Some(Currency::try_from(val.trim())?);
            modified = true;
        }

        if modified {
            config.generation = Some(generation);
        }
        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }

    fn parse_number<T: FromStr>(field: &str, s: &str) -> Result<T> {
        s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Invalid number: '{s}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 10] = [
        "ALLOT_ORG",
        "ALLOT_BATCH_SIZE",
        "ALLOT_LOW_AVAILABILITY_THRESHOLD",
        "ALLOT_DISABLE_AUTOINIT",
        "ALLOT_MAXIMUM_LOCK_WAIT_SECONDS",
        "ALLOT_OUTPUT_FORMAT",
        "ALLOT_FLOOR_AT_ZERO",
        "ALLOT_DEFAULT_QUANTITY",
        "ALLOT_CURRENCY",
        "ALLOT_DATA_DIR",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_parse_bool_true_variants() {
        for v in ["true", "TRUE", "1", "yes", "On"] {
            assert!(EnvironmentConfig::parse_bool("X", v).unwrap());
        }
    }

    #[test]
    fn test_parse_bool_false_variants() {
        for v in ["false", "0", "no", "OFF"] {
            assert!(!EnvironmentConfig::parse_bool("X", v).unwrap());
        }
    }

    #[test]
    fn test_parse_bool_invalid() {
        assert!(EnvironmentConfig::parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(EnvironmentConfig::parse_number::<usize>("X", " 42 ").unwrap(), 42);
        assert!(EnvironmentConfig::parse_number::<u32>("X", "-1").is_err());
        assert!(EnvironmentConfig::parse_number::<f64>("X", "12.5").is_ok());
    }

    #[test]
    #[serial]
    fn test_apply_overrides_no_env_vars() {
        clear();
        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_apply_overrides_sets_fields() {
        clear();
        env::set_var("ALLOT_ORG", "globex");
        env::set_var("ALLOT_BATCH_SIZE", "25");
        env::set_var("ALLOT_FLOOR_AT_ZERO", "no");
        env::set_var("ALLOT_CURRENCY", "usd");
        env::set_var("ALLOT_OUTPUT_FORMAT", "json");

        let mut config = Config::default();
        let applied = EnvironmentConfig::apply_overrides(&mut config);
        clear();
        applied.unwrap();

        assert_eq!(config.org.as_deref(), Some("globex"));
        assert_eq!(config.batch_size, Some(25));
        assert!(!config.floor_at_zero());
        assert_eq!(config.output_format, Some(OutputFormat::Json));
        assert_eq!(config.generation.unwrap().currency.unwrap().as_str(), "USD");
    }

    #[test]
    #[serial]
    fn test_invalid_value_is_reported_with_variable_name() {
        clear();
        env::set_var("ALLOT_BATCH_SIZE", "lots");
        let result = EnvironmentConfig::apply_overrides(&mut Config::default());
        clear();

        match result {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "ALLOT_BATCH_SIZE"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}

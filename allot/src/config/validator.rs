//! Configuration validation.
//!
//! Checks every populated field of a merged [`Config`] before it is used.

use crate::config::schema::{Config, GenerationConfig};
use crate::error::{Error, Result};
use crate::ids::OrgId;
use rust_decimal::Decimal;

/// Upper bound on the bulk batch size.
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use allot::config::{Config, ConfigValidator};
///
/// let config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns validation errors for invalid configurations.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref org) = config.org {
            Self::validate_identifier("org", org)?;
        }

        if let Some(batch_size) = config.batch_size {
            if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
                return Err(Error::Validation {
                    field: "batch_size".into(),
                    message: format!("Must be between 1 and {MAX_BATCH_SIZE}"),
                });
            }
        }

        if let Some(threshold) = config.low_availability_threshold_percent {
            Self::validate_percentage("low_availability_threshold_percent", threshold)?;
        }

        if let Some(ref generation) = config.generation {
            Self::validate_generation(generation)?;
        }

        if let Some(timeout) = config.maximum_lock_wait_seconds {
            if timeout == 0 {
                return Err(Error::Validation {
                    field: "maximum_lock_wait_seconds".into(),
                    message: "Timeout must be greater than 0".into(),
                });
            }
        }

        Ok(())
    }

    /// Checks that an identifier is non-empty, has no null bytes, and is at
    /// most 255 characters.
    fn validate_identifier(field: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();

        if trimmed.contains('\0') {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot contain null bytes".into(),
            });
        }

        if trimmed.len() > 255 {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot exceed 255 characters".into(),
            });
        }

        OrgId::new(trimmed).map(|_| ()).map_err(|e| Error::Validation {
            field: field.into(),
            message: e.to_string(),
        })
    }

    fn validate_percentage(field: &str, value: f64) -> Result<()> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(Error::Validation {
                field: field.into(),
                message: format!("Must be a percentage between 0 and 100, got {value}"),
            });
        }
        Ok(())
    }

    fn validate_generation(generation: &GenerationConfig) -> Result<()> {
        if let Some(cost) = generation.unit_cost {
            if cost < Decimal::ZERO {
                return Err(Error::Validation {
                    field: "generation.unit_cost".into(),
                    message: "Cannot be negative".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<()>) -> String {
        match result {
            Err(Error::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_empty_config() {
        assert!(ConfigValidator::validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_org_whitespace_only() {
        let config = Config {
            org: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(field_of(ConfigValidator::validate(&config)), "org");
    }

    #[test]
    fn test_validate_identifier_null_byte() {
        assert!(ConfigValidator::validate_identifier("org", "ac\0me").is_err());
    }

    #[test]
    fn test_validate_identifier_too_long() {
        let long = "a".repeat(256);
        assert!(ConfigValidator::validate_identifier("org", &long).is_err());
        assert!(ConfigValidator::validate_identifier("org", &long[..255]).is_ok());
    }

    #[test]
    fn test_validate_batch_size_bounds() {
        for (size, ok) in [(0, false), (1, true), (MAX_BATCH_SIZE, true), (MAX_BATCH_SIZE + 1, false)] {
            let config = Config {
                batch_size: Some(size),
                ..Default::default()
            };
            assert_eq!(ConfigValidator::validate(&config).is_ok(), ok, "batch size {size}");
        }
    }

    #[test]
    fn test_validate_threshold_range() {
        for (value, ok) in [(0.0, true), (100.0, true), (-0.5, false), (100.5, false), (f64::NAN, false)] {
            let config = Config {
                low_availability_threshold_percent: Some(value),
                ..Default::default()
            };
            assert_eq!(ConfigValidator::validate(&config).is_ok(), ok, "threshold {value}");
        }
    }

    #[test]
    fn test_validate_negative_unit_cost() {
        let config = Config {
            generation: Some(GenerationConfig {
                unit_cost: Some(Decimal::new(-1, 0)),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(field_of(ConfigValidator::validate(&config)), "generation.unit_cost");
    }

    #[test]
    fn test_validate_zero_lock_wait() {
        let config = Config {
            maximum_lock_wait_seconds: Some(0),
            ..Default::default()
        };
        assert_eq!(
            field_of(ConfigValidator::validate(&config)),
            "maximum_lock_wait_seconds"
        );
    }
}

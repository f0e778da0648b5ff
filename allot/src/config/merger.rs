//! Configuration merging and precedence handling.
//!
//! Scalar fields are overwritten by higher-precedence sources; nested
//! sections merge field by field.

use crate::config::loader::ConfigSource;
use crate::config::schema::{BulkConfig, Config, GenerationConfig};

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use allot::config::{Config, ConfigMerger};
///
/// let low = Config { org: Some("low".to_string()), ..Default::default() };
/// let high = Config { org: Some("high".to_string()), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.org, Some("high".to_string()));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple configuration sources into final config.
    ///
    /// Sources should be provided in order from lowest to highest precedence.
    #[must_use]
    pub fn merge(sources: Vec<ConfigSource>) -> Config {
        let mut result = Config::default();

        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }

        result
    }

    /// Merge source config into target (source overwrites target).
    ///
    /// # Merging Rules
    ///
    /// - Simple fields: source overwrites if Some
    /// - `generation` and `bulk`: field-by-field merge
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.org.is_some() {
            target.org.clone_from(&source.org);
        }

        if source.batch_size.is_some() {
            target.batch_size = source.batch_size;
        }

        if source.low_availability_threshold_percent.is_some() {
            target.low_availability_threshold_percent = source.low_availability_threshold_percent;
        }

        if source.disable_autoinit.is_some() {
            target.disable_autoinit = source.disable_autoinit;
        }

        if source.maximum_lock_wait_seconds.is_some() {
            target.maximum_lock_wait_seconds = source.maximum_lock_wait_seconds;
        }

        if source.output_format.is_some() {
            target.output_format = source.output_format;
        }

        if let Some(ref source_generation) = source.generation {
            target.generation = Some(match &target.generation {
                Some(target_generation) => {
                    Self::merge_generation(target_generation, source_generation)
                }
                None => source_generation.clone(),
            });
        }

        if let Some(ref source_bulk) = source.bulk {
            target.bulk = Some(match &target.bulk {
                Some(target_bulk) => BulkConfig {
                    floor_at_zero: source_bulk.floor_at_zero.or(target_bulk.floor_at_zero),
                },
                None => source_bulk.clone(),
            });
        }
    }

    fn merge_generation(target: &GenerationConfig, source: &GenerationConfig) -> GenerationConfig {
        GenerationConfig {
            default_quantity: source.default_quantity.or(target.default_quantity),
            allocation_type: source.allocation_type.or(target.allocation_type),
            currency: source.currency.or(target.currency),
            unit_cost: source.unit_cost.or(target.unit_cost),
            release_period_hours: source.release_period_hours.or(target.release_period_hours),
        }
    }
}

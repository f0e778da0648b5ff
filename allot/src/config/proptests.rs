//! Property-based tests for configuration system.

use super::merger::ConfigMerger;
use super::schema::{BulkConfig, Config, GenerationConfig};
use super::validator::ConfigValidator;
use proptest::prelude::*;

fn generation_strategy() -> impl Strategy<Value = GenerationConfig> {
    (
        prop::option::of(0u32..1000),
        prop::option::of(0u32..168),
    )
        .prop_map(|(default_quantity, release_period_hours)| GenerationConfig {
            default_quantity,
            release_period_hours,
            ..Default::default()
        })
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop::option::of("[a-z]{1,20}"),
        prop::option::of(1usize..=10_000),
        prop::option::of(0.0f64..=100.0),
        prop::option::of(generation_strategy()),
        prop::option::of(any::<bool>()),
        prop::option::of(1u64..=600),
    )
        .prop_map(|(org, batch_size, threshold, generation, floor, lock_wait)| Config {
            org,
            batch_size,
            low_availability_threshold_percent: threshold,
            generation,
            bulk: floor.map(|f| BulkConfig {
                floor_at_zero: Some(f),
            }),
            maximum_lock_wait_seconds: lock_wait,
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 5000,
        .. ProptestConfig::default()
    })]

    // A set field in the higher layer always wins; an unset one never erases
    #[test]
    fn config_merge_higher_precedence_wins(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, &high);
        let floor = result.floor_at_zero();

        prop_assert_eq!(result.org, high.org.or(low.org));
        prop_assert_eq!(result.batch_size, high.batch_size.or(low.batch_size));
        prop_assert_eq!(
            result.maximum_lock_wait_seconds,
            high.maximum_lock_wait_seconds.or(low.maximum_lock_wait_seconds)
        );
        prop_assert_eq!(
            floor,
            high.bulk.and_then(|b| b.floor_at_zero)
                .or(low.bulk.and_then(|b| b.floor_at_zero))
                .unwrap_or(true)
        );
    }

    // Empty config is identity element for merge
    #[test]
    fn config_merge_identity(config in config_strategy()) {
        let mut merged = config.clone();
        ConfigMerger::merge_into(&mut merged, &Config::default());
        prop_assert_eq!(merged, config);
    }

    // Merging two valid configs yields a valid config
    #[test]
    fn valid_configs_stay_valid_after_merge(a in config_strategy(), b in config_strategy()) {
        prop_assert!(ConfigValidator::validate(&a).is_ok());
        let mut merged = a;
        ConfigMerger::merge_into(&mut merged, &b);
        prop_assert!(ConfigValidator::validate(&merged).is_ok());
    }

    // Thresholds outside 0..=100 are always rejected
    #[test]
    fn out_of_range_threshold_rejected(value in prop_oneof![-1e6f64..-0.001, 100.001f64..1e6]) {
        let config = Config {
            low_availability_threshold_percent: Some(value),
            ..Default::default()
        };
        prop_assert!(ConfigValidator::validate(&config).is_err());
    }
}

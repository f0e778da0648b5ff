//! Property-based tests for operations module.
//!
//! These tests exercise the pure parts of the derivations: day folding and
//! stats roll-up, without a database.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;

use super::availability::{summarize_day, utilization};
use super::stats::StatsAggregator;
use crate::bucket::{AllocationBucket, AllocationType, BucketSpec, Counters};
use crate::error::Result;
use crate::ids::{BucketId, OrgId, VariantId};
use crate::money::Currency;
use crate::scope::TimeScope;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

// (quantity, booked, held, overbooking, closed, freesale)
fn bucket_strategy() -> impl Strategy<Value = (u32, u32, u32, u32, bool, bool)> {
    (0u32..200, 0u32..100, 0u32..100, 0u32..20, any::<bool>(), prop::bool::weighted(0.1))
}

fn make_bucket(id: i64, raw: (u32, u32, u32, u32, bool, bool)) -> AllocationBucket {
    let (quantity, booked, held, overbooking, closed, freesale) = raw;
    let builder = BucketSpec::builder(
        OrgId::new("acme").unwrap(),
        VariantId::new("dbl").unwrap(),
        TimeScope::date(day()),
        Currency::try_from("EUR").unwrap(),
    )
    .stop_sell(closed);
    let spec = if freesale {
        builder
            .allocation_type(AllocationType::Freesale)
            .quantity(None)
            .build()
            .unwrap()
    } else {
        builder
            .quantity(Some(quantity))
            .overbooking(overbooking)
            .build()
            .unwrap()
    };
    AllocationBucket {
        id: BucketId::new(id),
        spec,
        booked,
        held,
        version: 0,
        created_at: Utc::now(),
    }
}

fn own(bucket: &AllocationBucket) -> Result<Counters> {
    Ok(bucket.own_counters())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // available + booked + held == inventory, whatever the counters
    #[test]
    fn day_inventory_identity(raw in prop::collection::vec(bucket_strategy(), 0..8)) {
        let buckets: Vec<_> = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| make_bucket(i64::try_from(i).unwrap() + 1, r))
            .collect();
        let summary = summarize_day(day(), &buckets, 10.0, own).unwrap();

        prop_assert_eq!(
            summary.total_inventory,
            summary.total_available + summary.total_booked + summary.total_held
        );
        prop_assert_eq!(summary.buckets, buckets.len());
        prop_assert_eq!(summary.sellability.is_some(), !buckets.is_empty());
    }

    // A day is closed exactly when it has buckets and all of them are closed
    #[test]
    fn closed_only_when_every_bucket_closed(raw in prop::collection::vec(bucket_strategy(), 1..6)) {
        let buckets: Vec<_> = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| make_bucket(i64::try_from(i).unwrap() + 1, r))
            .collect();
        let summary = summarize_day(day(), &buckets, 10.0, own).unwrap();

        prop_assert_eq!(summary.closed, buckets.iter().all(AllocationBucket::is_closed));
        if summary.closed {
            prop_assert_eq!(summary.total_available, 0);
        }
    }

    // Utilization stays a percentage
    #[test]
    fn utilization_is_bounded(booked in 0u64..1_000_000, available in 0u64..1_000_000) {
        let u = utilization(booked, available);
        prop_assert!((0.0..=100.0).contains(&u));
    }

    // Every day lands in at most one ladder bucket
    #[test]
    fn stats_day_counts_never_exceed_days(
        raw in prop::collection::vec(prop::collection::vec(bucket_strategy(), 0..4), 0..20),
        threshold in 0.0f64..100.0,
    ) {
        let days: Vec<_> = raw
            .into_iter()
            .map(|buckets| {
                let buckets: Vec<_> = buckets
                    .into_iter()
                    .enumerate()
                    .map(|(i, r)| make_bucket(i64::try_from(i).unwrap() + 1, r))
                    .collect();
                summarize_day(day(), &buckets, threshold, own).unwrap()
            })
            .collect();
        let stats = StatsAggregator::new(threshold).aggregate(&days);

        prop_assert!(stats.sold_out_days + stats.low_availability_days + stats.closed_days <= stats.days);
        prop_assert_eq!(
            stats.total_inventory,
            stats.total_available + stats.total_booked + stats.total_held
        );
    }
}

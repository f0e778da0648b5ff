//! Idempotency tests for bulk creation and availability generation.
//!
//! Re-running a creation over the same window must leave the store
//! unchanged and report every date as skipped.

mod common;

use allot::operations::{
    generate_availability, BulkCreateOptions, BulkCreatePlan, GenerateOptions, ItemStatus,
    SkipReason,
};
use allot::{Database, PlanExecutor, VariantId};

use common::{bucket_on, date, eur, org, range, variant, TestStore};

#[test]
fn test_bulk_create_twice_creates_nothing_new() {
    let store = TestStore::new();
    let mut db = store.open();
    let template = bucket_on(date(2025, 8, 1)).quantity(Some(12)).build().unwrap();
    let window = range(date(2025, 8, 1), date(2025, 8, 14));

    let plan = BulkCreatePlan::new(BulkCreateOptions::daily(template.clone(), window))
        .build_plan()
        .unwrap();
    let first = PlanExecutor::new(&mut db).execute(&plan).unwrap();
    assert_eq!(first.applied(), 14);
    assert_eq!(first.skipped(), 0);

    let plan = BulkCreatePlan::new(BulkCreateOptions::daily(template, window))
        .build_plan()
        .unwrap();
    let second = PlanExecutor::new(&mut db).execute(&plan).unwrap();
    assert_eq!(second.applied(), 0);
    assert_eq!(second.skipped(), 14);
    assert!(second
        .outcomes
        .iter()
        .all(|o| o.status == ItemStatus::Skipped(SkipReason::DuplicateScope)));

    let stored = Database::buckets_in_window(
        db.connection(),
        &org(),
        &variant(),
        date(2025, 8, 1),
        date(2025, 8, 14),
    )
    .unwrap();
    assert_eq!(stored.len(), 14);
}

#[test]
fn test_overlapping_windows_only_fill_gaps() {
    let store = TestStore::new();
    let mut db = store.open();
    let template = bucket_on(date(2025, 9, 1)).quantity(Some(3)).build().unwrap();

    let plan = BulkCreatePlan::new(BulkCreateOptions::daily(
        template.clone(),
        range(date(2025, 9, 1), date(2025, 9, 5)),
    ))
    .build_plan()
    .unwrap();
    PlanExecutor::new(&mut db).execute(&plan).unwrap();

    let plan = BulkCreatePlan::new(BulkCreateOptions::daily(
        template,
        range(date(2025, 9, 4), date(2025, 9, 8)),
    ))
    .build_plan()
    .unwrap();
    let result = PlanExecutor::new(&mut db).execute(&plan).unwrap();
    assert_eq!(result.applied(), 3);
    assert_eq!(result.skipped(), 2);
}

#[test]
fn test_generate_is_idempotent_per_variant() {
    let store = TestStore::new();
    let mut db = store.open();
    let suite = VariantId::new("suite").unwrap();
    let options = GenerateOptions::new(
        org(),
        vec![variant(), suite.clone()],
        range(date(2025, 10, 1), date(2025, 10, 10)),
        eur(),
    );

    let first = generate_availability(&mut db, &options, 4, None).unwrap();
    for report in &first.variants {
        assert_eq!(report.created, 10, "variant {}", report.variant);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.uncovered_days, 0);
    }

    let second = generate_availability(&mut db, &options, 4, None).unwrap();
    for report in &second.variants {
        assert_eq!(report.created, 0, "variant {}", report.variant);
        assert_eq!(report.skipped, 10);
    }

    let suites = Database::buckets_in_window(
        db.connection(),
        &org(),
        &suite,
        date(2025, 10, 1),
        date(2025, 10, 10),
    )
    .unwrap();
    assert_eq!(suites.len(), 10);
}

#[test]
fn test_dry_run_leaves_store_untouched() {
    let store = TestStore::new();
    let mut db = store.open();
    let template = bucket_on(date(2025, 11, 1)).quantity(Some(5)).build().unwrap();
    let plan = BulkCreatePlan::new(BulkCreateOptions::daily(
        template,
        range(date(2025, 11, 1), date(2025, 11, 3)),
    ))
    .build_plan()
    .unwrap();

    let preview = PlanExecutor::new(&mut db).dry_run().execute(&plan).unwrap();
    assert!(preview.dry_run);
    assert_eq!(preview.applied(), 3);

    let stored = Database::buckets_in_window(
        db.connection(),
        &org(),
        &variant(),
        date(2025, 11, 1),
        date(2025, 11, 3),
    )
    .unwrap();
    assert!(stored.is_empty());
}

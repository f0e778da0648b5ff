//! Concurrent reservation tests.
//!
//! Each thread opens its own connection to a shared database file, the way
//! separate processes would, and competes for the same counters.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use allot::{Database, Error};

use common::{bucket_on, date, org, TestStore};

/// Runs `threads` single-unit reservations against `bucket` at once and
/// returns the per-thread outcomes.
fn race(store: &TestStore, bucket: allot::BucketId, threads: usize) -> Vec<Result<(), Error>> {
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let path = store.path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut db = Database::open(allot::DatabaseConfig::new(path))?;
                barrier.wait();
                db.reserve(&org(), bucket, 1, false).map(|_| ())
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

/// N concurrent single-unit reservations against quantity K succeed exactly
/// min(N, K) times; every failure is a capacity error.
#[test]
fn test_concurrent_reserves_never_oversell() {
    let store = TestStore::new();
    let bucket = {
        let mut db = store.open();
        db.create_bucket(&bucket_on(date(2025, 7, 1)).quantity(Some(5)).build().unwrap())
            .unwrap()
    };

    let results = race(&store, bucket.id, 12);
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 5);
    for failure in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(failure, Error::InsufficientInventory { .. }),
            "unexpected failure: {failure}"
        );
    }

    let db = store.open();
    let stored = Database::get_bucket(db.connection(), &org(), bucket.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.booked, 5);
    assert_eq!(stored.held, 0);
}

/// With spare capacity every racing reservation lands.
#[test]
fn test_concurrent_reserves_all_fit() {
    let store = TestStore::new();
    let bucket = {
        let mut db = store.open();
        db.create_bucket(&bucket_on(date(2025, 7, 2)).quantity(Some(50)).build().unwrap())
            .unwrap()
    };

    let results = race(&store, bucket.id, 8);
    assert!(results.iter().all(Result::is_ok));

    let db = store.open();
    let stored = Database::get_bucket(db.connection(), &org(), bucket.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.booked, 8);
}

/// Buckets drawing on one pool share its counters under contention.
#[test]
fn test_concurrent_reserves_across_pooled_buckets() {
    let store = TestStore::new();
    let (first, second) = {
        let mut db = store.open();
        let pool = db.create_pool(&org(), "Allotment", 4, None).unwrap();
        let a = db
            .create_bucket(&bucket_on(date(2025, 7, 3)).pool(Some(pool.id)).build().unwrap())
            .unwrap();
        let b = db
            .create_bucket(&bucket_on(date(2025, 7, 4)).pool(Some(pool.id)).build().unwrap())
            .unwrap();
        (a.id, b.id)
    };

    let barrier = Arc::new(Barrier::new(10));
    let handles: Vec<_> = (0..10)
        .map(|i| {
            let path = store.path.clone();
            let barrier = Arc::clone(&barrier);
            let bucket = if i % 2 == 0 { first } else { second };
            thread::spawn(move || {
                let mut db = Database::open(allot::DatabaseConfig::new(path)).unwrap();
                barrier.wait();
                db.reserve(&org(), bucket, 1, false).is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 4);
}

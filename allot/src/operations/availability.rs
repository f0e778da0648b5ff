//! Per-day availability derived from stored buckets.
//!
//! Nothing here writes. A [`Generator`] walks the requested dates lazily and
//! recomputes every day from the bucket and pool rows, so it can be dropped
//! and restarted at any point.

use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::bucket::{AllocationBucket, Availability, CounterAuthority, Counters, Sellability};
use crate::database::Database;
use crate::error::Result;
use crate::ids::{OrgId, SupplierId, VariantId};
use crate::scope::DateRange;

/// Default low-availability threshold in percent.
pub const DEFAULT_LOW_THRESHOLD_PERCENT: f64 = 10.0;

/// What to derive availability for.
#[derive(Debug, Clone)]
pub struct AvailabilityQuery {
    /// Owning tenant.
    pub org: OrgId,
    /// Variant to inspect.
    pub variant: VariantId,
    /// Only count this supplier's buckets.
    pub supplier: Option<SupplierId>,
    /// Inclusive date window.
    pub range: DateRange,
    /// Threshold below which a day is reported low.
    pub threshold_percent: f64,
}

impl AvailabilityQuery {
    /// Query over all suppliers with the default threshold.
    #[must_use]
    pub fn new(org: OrgId, variant: VariantId, range: DateRange) -> Self {
        Self {
            org,
            variant,
            supplier: None,
            range,
            threshold_percent: DEFAULT_LOW_THRESHOLD_PERCENT,
        }
    }

    /// Restricts the query to one supplier.
    #[must_use]
    pub fn with_supplier(mut self, supplier: Option<SupplierId>) -> Self {
        self.supplier = supplier;
        self
    }

    /// Overrides the low-availability threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold_percent: f64) -> Self {
        self.threshold_percent = threshold_percent;
        self
    }

    /// Starts a generator over `conn`.
    #[must_use]
    pub fn generate<'c>(&self, conn: &'c Connection) -> Generator<'c> {
        Generator::new(conn, self.clone())
    }
}

/// Aggregate availability for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityDay {
    /// The date.
    pub date: NaiveDate,
    /// `total_available + total_booked + total_held`.
    pub total_inventory: u64,
    /// Units still sellable across open candidates.
    pub total_available: u64,
    /// Booked units.
    pub total_booked: u64,
    /// Held units.
    pub total_held: u64,
    /// At least one open candidate is unconstrained.
    pub unbounded: bool,
    /// Every candidate is closed.
    pub closed: bool,
    /// `booked / (booked + available) * 100`, zero with nothing to divide.
    pub utilization_percentage: f64,
    /// `None` when no bucket covers the date.
    pub sellability: Option<Sellability>,
    /// Number of buckets covering the date.
    pub buckets: usize,
}

impl AvailabilityDay {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_inventory: 0,
            total_available: 0,
            total_booked: 0,
            total_held: 0,
            unbounded: false,
            closed: false,
            utilization_percentage: 0.0,
            sellability: None,
            buckets: 0,
        }
    }

    /// Availability as a single value.
    #[must_use]
    pub fn availability(&self) -> Availability {
        if self.unbounded {
            Availability::Unbounded
        } else {
            Availability::Limited(u32::try_from(self.total_available).unwrap_or(u32::MAX))
        }
    }
}

/// Ratio of booked to booked-plus-available, as a percentage.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn utilization(booked: u64, available: u64) -> f64 {
    let denominator = booked + available;
    if denominator == 0 {
        0.0
    } else {
        booked as f64 / denominator as f64 * 100.0
    }
}

/// Folds the buckets covering one date into a day record.
///
/// `counters` resolves an authority to its counters; buckets sharing an
/// authority are counted once, and the authority is open if any of its
/// member buckets is.
pub(crate) fn summarize_day<F>(
    date: NaiveDate,
    buckets: &[AllocationBucket],
    threshold_percent: f64,
    mut counters: F,
) -> Result<AvailabilityDay>
where
    F: FnMut(&AllocationBucket) -> Result<Counters>,
{
    let mut day = AvailabilityDay::empty(date);
    if buckets.is_empty() {
        return Ok(day);
    }

    // authority -> (counters, any open member)
    let mut groups: Vec<(CounterAuthority, Counters, bool)> = Vec::new();
    let mut index: HashMap<CounterAuthority, usize> = HashMap::new();
    for bucket in buckets {
        let authority = bucket.authority();
        if let Some(&i) = index.get(&authority) {
            groups[i].2 |= !bucket.is_closed();
            continue;
        }
        index.insert(authority, groups.len());
        groups.push((authority, counters(bucket)?, !bucket.is_closed()));
    }

    for (_, c, open) in &groups {
        day.total_booked += u64::from(c.booked);
        day.total_held += u64::from(c.held);
        if !open {
            continue;
        }
        match c.available() {
            Availability::Unbounded => day.unbounded = true,
            Availability::Limited(n) => day.total_available += u64::from(n),
        }
    }

    day.buckets = buckets.len();
    day.closed = groups.iter().all(|(_, _, open)| !open);
    day.total_inventory = day.total_available + day.total_booked + day.total_held;
    day.utilization_percentage = utilization(day.total_booked, day.total_available);
    day.sellability = Some(Sellability::classify(
        day.availability(),
        u32::try_from(day.total_inventory).unwrap_or(u32::MAX),
        day.closed,
        threshold_percent,
    ));
    Ok(day)
}

/// Lazy sequence of [`AvailabilityDay`] records, one per date in order.
///
/// # Examples
///
/// ```no_run
/// use allot::operations::AvailabilityQuery;
/// use allot::{Database, DatabaseConfig, DateRange, OrgId, VariantId};
/// use chrono::NaiveDate;
///
/// let db = Database::open(DatabaseConfig::new("/tmp/allot.db")).unwrap();
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
/// )
/// .unwrap();
/// let query = AvailabilityQuery::new(
///     OrgId::new("acme").unwrap(),
///     VariantId::new("dbl").unwrap(),
///     range,
/// );
/// for day in query.generate(db.connection()) {
///     let day = day.unwrap();
///     println!("{} {}", day.date, day.total_available);
/// }
/// ```
pub struct Generator<'c> {
    conn: &'c Connection,
    query: AvailabilityQuery,
    next: Option<NaiveDate>,
}

impl<'c> Generator<'c> {
    /// Creates a generator positioned at the first date of the query.
    #[must_use]
    pub fn new(conn: &'c Connection, query: AvailabilityQuery) -> Self {
        let next = Some(query.range.start());
        Self { conn, query, next }
    }

    fn day(&self, date: NaiveDate) -> Result<AvailabilityDay> {
        let q = &self.query;
        let buckets = Database::buckets_on_date(self.conn, &q.org, &q.variant, q.supplier, date)?;
        summarize_day(date, &buckets, q.threshold_percent, |bucket| {
            Database::authority_counters(self.conn, bucket).map(|(c, _)| c)
        })
    }
}

impl Iterator for Generator<'_> {
    type Item = Result<AvailabilityDay>;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.next?;
        self.next = date.succ_opt().filter(|d| *d <= self.query.range.end());
        Some(self.day(date))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.next.map_or(0, |d| {
            usize::try_from((self.query.range.end() - d).num_days() + 1).unwrap_or(0)
        });
        (left, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::AllocationType;
    use crate::database::test_util::{create_test_database, date, org, spec_on, variant};

    fn july(from: u32, to: u32) -> DateRange {
        DateRange::new(date(2025, 7, from), date(2025, 7, to)).unwrap()
    }

    fn days(db: &Database, range: DateRange) -> Vec<AvailabilityDay> {
        AvailabilityQuery::new(org(), variant(), range)
            .generate(db.connection())
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_one_record_per_date() {
        let db = create_test_database();
        let out = days(&db, july(1, 5));
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|d| d.sellability.is_none() && !d.closed));
    }

    #[test]
    fn test_identity_with_bookings_and_holds() {
        let mut db = create_test_database();
        let bucket = db
            .create_bucket(&spec_on(date(2025, 7, 1)).quantity(Some(20)).build().unwrap())
            .unwrap();
        db.reserve(&org(), bucket.id, 5, false).unwrap();
        db.reserve(&org(), bucket.id, 3, true).unwrap();

        let day = &days(&db, july(1, 1))[0];
        assert_eq!(day.total_available, 12);
        assert_eq!(day.total_booked, 5);
        assert_eq!(day.total_held, 3);
        assert_eq!(day.total_inventory, 20);
        assert!((day.utilization_percentage - 5.0 / 17.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pool_counted_once() {
        let mut db = create_test_database();
        let pool = db.create_pool(&org(), "shared", 10, None).unwrap();
        for supplier_name in ["A", "B"] {
            let supplier = db.register_supplier(&org(), supplier_name, 0).unwrap();
            db.create_bucket(
                &spec_on(date(2025, 7, 1))
                    .supplier(Some(supplier.id))
                    .quantity(Some(10))
                    .pool(Some(pool.id))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        }

        let day = &days(&db, july(1, 1))[0];
        assert_eq!(day.buckets, 2);
        assert_eq!(day.total_available, 10);
    }

    #[test]
    fn test_closed_day_reports_zero() {
        let mut db = create_test_database();
        db.create_bucket(
            &spec_on(date(2025, 7, 1))
                .quantity(Some(10))
                .stop_sell(true)
                .build()
                .unwrap(),
        )
        .unwrap();

        let day = &days(&db, july(1, 1))[0];
        assert!(day.closed);
        assert_eq!(day.total_available, 0);
        assert_eq!(day.sellability, Some(Sellability::Closed));
    }

    #[test]
    fn test_freesale_is_unbounded() {
        let mut db = create_test_database();
        db.create_bucket(
            &spec_on(date(2025, 7, 1))
                .quantity(None)
                .allocation_type(AllocationType::Freesale)
                .build()
                .unwrap(),
        )
        .unwrap();

        let day = &days(&db, july(1, 1))[0];
        assert!(day.unbounded);
        assert_eq!(day.availability(), Availability::Unbounded);
        assert_eq!(day.sellability, Some(Sellability::Open));
    }

    #[test]
    fn test_generator_is_restartable_and_pure() {
        let mut db = create_test_database();
        db.create_bucket(&spec_on(date(2025, 7, 2)).quantity(Some(4)).build().unwrap())
            .unwrap();

        let first = days(&db, july(1, 3));
        let second = days(&db, july(1, 3));
        assert_eq!(first, second);

        let mut generator = AvailabilityQuery::new(org(), variant(), july(1, 3))
            .generate(db.connection());
        assert_eq!(generator.size_hint(), (3, Some(3)));
        generator.next();
        assert_eq!(generator.size_hint(), (2, Some(2)));
    }

    #[test]
    fn test_utilization_zero_denominator() {
        assert!(utilization(0, 0).abs() < f64::EPSILON);
        assert!((utilization(1, 3) - 25.0).abs() < 1e-9);
    }
}

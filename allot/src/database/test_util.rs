//! Shared fixtures for unit tests that need a database.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::tempdir;

use crate::bucket::{AllocationType, BucketBuilder, BucketSpec};
use crate::database::{Database, DatabaseConfig};
use crate::ids::{OrgId, VariantId};
use crate::money::Currency;
use crate::rates::{PricingModel, RateKind, RateOccupancy, RatePlanSpec};
use crate::scope::{DateRange, TimeScope};

/// Creates a database in a temporary directory that outlives the test.
///
/// # Panics
///
/// Panics if the temporary directory or database cannot be created.
#[must_use]
pub fn create_test_database() -> Database {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::open(DatabaseConfig::new(path)).unwrap();

    // Keep the directory alive for the life of the database
    std::mem::forget(dir);

    db
}

/// The tenant used by fixtures.
#[must_use]
pub fn org() -> OrgId {
    OrgId::new("acme").unwrap()
}

/// The variant used by fixtures.
#[must_use]
pub fn variant() -> VariantId {
    VariantId::new("dbl").unwrap()
}

/// Shorthand for a calendar date.
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builder for a house bucket on `day` in EUR.
pub fn spec_on(day: NaiveDate) -> BucketBuilder {
    BucketSpec::builder(
        org(),
        variant(),
        TimeScope::date(day),
        Currency::try_from("EUR").unwrap(),
    )
}

/// Master plan for 2025 with a single fixed band for 1-4 pax.
#[must_use]
pub fn master_plan(base: Decimal) -> RatePlanSpec {
    RatePlanSpec {
        variant: variant(),
        kind: RateKind::Master,
        currency: Currency::try_from("EUR").unwrap(),
        validity: DateRange::new(date(2025, 1, 1), date(2025, 12, 31)).unwrap(),
        inventory_model: AllocationType::Freesale,
        priority: None,
        preferred: true,
        seasons: Vec::new(),
        occupancies: vec![RateOccupancy {
            min_occupancy: 1,
            max_occupancy: 4,
            pricing_model: PricingModel::Fixed,
            base_amount: base,
            per_person_amount: Decimal::ZERO,
        }],
    }
}

//! Common test utilities for integration tests.
//!
//! Fixture builders for a tenant, a variant and plans priced in EUR.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use allot::bucket::BucketBuilder;
use allot::rates::{PricingModel, RateKind, RateOccupancy};
use allot::{
    AllocationType, BucketSpec, Currency, Database, DatabaseConfig, DateRange, OrgId,
    RatePlanSpec, SupplierId, TimeScope, VariantId,
};

/// A database file inside a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct TestStore {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allot.db");
        Database::open(DatabaseConfig::new(&path)).unwrap();
        Self { dir, path }
    }

    /// Opens another connection to the same file.
    pub fn open(&self) -> Database {
        Database::open(DatabaseConfig::new(&self.path)).unwrap()
    }
}

pub fn org() -> OrgId {
    OrgId::new("acme").unwrap()
}

pub fn variant() -> VariantId {
    VariantId::new("dbl").unwrap()
}

pub fn eur() -> Currency {
    Currency::try_from("EUR").unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn range(from: NaiveDate, to: NaiveDate) -> DateRange {
    DateRange::new(from, to).unwrap()
}

/// House bucket builder for `day`.
pub fn bucket_on(day: NaiveDate) -> BucketBuilder {
    BucketSpec::builder(org(), variant(), TimeScope::date(day), eur())
}

fn band(min: u32, max: u32, model: PricingModel, base: i64, per_person: i64) -> RateOccupancy {
    RateOccupancy {
        min_occupancy: min,
        max_occupancy: max,
        pricing_model: model,
        base_amount: Decimal::from(base),
        per_person_amount: Decimal::from(per_person),
    }
}

/// Master plan for 2025 selling at a flat `price` for 1-4 pax.
pub fn master_plan(price: i64) -> RatePlanSpec {
    RatePlanSpec {
        variant: variant(),
        kind: RateKind::Master,
        currency: eur(),
        validity: range(date(2025, 1, 1), date(2025, 12, 31)),
        inventory_model: AllocationType::Freesale,
        priority: None,
        preferred: true,
        seasons: Vec::new(),
        occupancies: vec![band(1, 4, PricingModel::Fixed, price, 0)],
    }
}

/// Master plan with a single-occupancy band and a base-plus-pax band.
pub fn banded_master_plan() -> RatePlanSpec {
    RatePlanSpec {
        occupancies: vec![
            band(1, 1, PricingModel::Fixed, 100, 0),
            band(2, 4, PricingModel::BasePlusPax, 120, 30),
        ],
        ..master_plan(0)
    }
}

/// Supplier cost plan at a flat `cost`.
pub fn supplier_plan(supplier_id: SupplierId, cost: i64) -> RatePlanSpec {
    RatePlanSpec {
        kind: RateKind::Supplier {
            supplier_id,
            contract_ref: None,
        },
        inventory_model: AllocationType::Committed,
        preferred: false,
        ..master_plan(cost)
    }
}

/// Registers a supplier with a cost plan and `quantity` units on `day`.
pub fn supplier_with_stock(
    db: &mut Database,
    name: &str,
    cost: i64,
    priority: i32,
    quantity: u32,
    day: NaiveDate,
) -> SupplierId {
    let supplier = db.register_supplier(&org(), name, priority).unwrap();
    db.insert_rate_plan(&org(), &supplier_plan(supplier.id, cost))
        .unwrap();
    db.create_bucket(
        &bucket_on(day)
            .supplier(Some(supplier.id))
            .quantity(Some(quantity))
            .unit_cost(Decimal::from(cost))
            .build()
            .unwrap(),
    )
    .unwrap();
    supplier.id
}

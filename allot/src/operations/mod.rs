//! Engine operations built on the store.
//!
//! Bulk work follows a plan-execute pattern: a planner turns a request into
//! an [`OperationPlan`] without touching the database, and the
//! [`PlanExecutor`] applies it in bounded, cancellable batches, or previews
//! it in dry-run mode. Every action resolves to exactly one
//! [`ItemOutcome`].
//!
//! Read-side derivations ([`Generator`], [`StatsAggregator`]) never write,
//! and supplier selection ([`SupplierSelector`]) runs as a single
//! all-or-nothing transaction.
//!
//! # Examples
//!
//! ```no_run
//! use allot::operations::{
//!     AvailabilityQuery, BulkAction, BulkUpdateOptions, BulkUpdatePlan, PlanExecutor,
//!     StatsAggregator,
//! };
//! use allot::{Database, DatabaseConfig, DateRange, OrgId, VariantId};
//! use chrono::NaiveDate;
//!
//! let mut db = Database::open(DatabaseConfig::new("/tmp/allot.db")).unwrap();
//! let org = OrgId::new("acme").unwrap();
//! let variant = VariantId::new("dbl").unwrap();
//! let range = DateRange::new(
//!     NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 12, 26).unwrap(),
//! )
//! .unwrap();
//!
//! // Close the holidays
//! let options = BulkUpdateOptions::for_range(org.clone(), variant.clone(), range, BulkAction::Close);
//! let plan = BulkUpdatePlan::new(options).build_plan().unwrap();
//! PlanExecutor::new(&mut db).execute(&plan).unwrap();
//!
//! // Summarize
//! let days = AvailabilityQuery::new(org, variant, range)
//!     .generate(db.connection())
//!     .collect::<allot::Result<Vec<_>>>()
//!     .unwrap();
//! let stats = StatsAggregator::default().aggregate(&days);
//! assert_eq!(stats.days, 3);
//! ```

pub mod availability;
pub mod bulk_create;
pub mod bulk_update;
pub mod cancel;
pub mod executor;
pub mod expire;
pub mod init;
pub mod outcome;
pub mod plan;
pub mod stats;
pub mod waterfall;

#[cfg(test)]
mod proptests;

pub use availability::{AvailabilityDay, AvailabilityQuery, Generator, DEFAULT_LOW_THRESHOLD_PERCENT};
pub use bulk_create::{
    generate_availability, BulkCreateOptions, BulkCreatePlan, GenerateOptions, GenerateReport,
    VariantReport, DEFAULT_GENERATED_QUANTITY,
};
pub use bulk_update::{BulkAction, BulkUpdateOptions, BulkUpdatePlan};
pub use cancel::CancellationToken;
pub use executor::{ExecutionResult, PlanExecutor, DEFAULT_BATCH_SIZE};
pub use expire::{ExpireResult, HoldOperations};
pub use init::{init_database, InitOptions, InitResult};
pub use outcome::{ItemOutcome, ItemStatus, SkipReason};
pub use plan::{OperationPlan, PlanAction};
pub use stats::{AvailabilityStats, StatsAggregator};
pub use waterfall::{SelectionRequest, SelectionResult, SupplierAllocation, SupplierSelector};

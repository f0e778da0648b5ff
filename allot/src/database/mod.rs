//! Database layer for persistent inventory state.
//!
//! A SQLite store holding suppliers, time slots, pools, buckets,
//! reservations and rate plans, with schema versioning, version-guarded
//! counter updates and batched writes.
//!
//! # Examples
//!
//! ```no_run
//! use allot::database::{Database, DatabaseConfig};
//! use allot::{BucketSpec, Currency, OrgId, TimeScope, VariantId};
//! use chrono::NaiveDate;
//!
//! let mut db = Database::open(DatabaseConfig::new("/tmp/allot.db")).unwrap();
//!
//! let org = OrgId::new("acme").unwrap();
//! let spec = BucketSpec::builder(
//!     org.clone(),
//!     VariantId::new("dbl").unwrap(),
//!     TimeScope::date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()),
//!     Currency::try_from("EUR").unwrap(),
//! )
//! .quantity(Some(20))
//! .build()
//! .unwrap();
//!
//! let bucket = db.create_bucket(&spec).unwrap();
//! db.reserve(&org, bucket.id, 2, false).unwrap();
//! ```

mod config;
mod connection;
mod counters;
pub mod migrations;
mod operations;
mod rates;
mod schema;
#[cfg(test)]
pub(crate) mod test_util;
mod transaction;

// Re-export public API
pub use config::{
    default_data_dir, resolve_data_dir, resolve_database_path, DatabaseConfig,
    DATABASE_FILE_NAME, DATA_DIR_ENV,
};
pub use connection::Database;

// Re-export migration functions for advanced use cases
pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};

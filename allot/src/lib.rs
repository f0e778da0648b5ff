#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # allot
//!
//! A library for allocating supplier inventory and answering availability
//! questions over it.
//!
//! Inventory lives in allocation buckets scoped to a date, a date range or a
//! time slot, optionally sharing counters through a pool. Reservations move
//! units between held and booked; supplier selection walks ranked supplier
//! rates and reserves across them in one transaction.
//!
//! ## Core Types
//!
//! - [`BucketSpec`] and [`AllocationBucket`]: inventory rows and their counters
//! - [`Reservation`]: held or booked units against a bucket
//! - [`RatePlan`]: master and supplier pricing
//! - [`Database`]: `SQLite` storage with transactional counter updates
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use allot::{Availability, Counters};
//!
//! let counters = Counters {
//!     quantity: Some(20),
//!     booked: 12,
//!     held: 3,
//!     allow_overbooking: true,
//!     overbooking_limit: 2,
//! };
//! assert_eq!(counters.available(), Availability::Limited(7));
//! ```

pub mod bucket;
pub mod config;
pub mod database;
pub mod error;
pub mod ids;
pub mod logging;
pub mod money;
pub mod operations;
pub mod output;
pub mod rates;
pub mod reservation;
pub mod scope;
pub mod supplier;

// Re-export key types at crate root for convenience
pub use bucket::{
    AllocationBucket, AllocationType, Availability, BucketBuilder, BucketSpec, CounterAuthority,
    Counters, InventoryPool, Sellability,
};
pub use config::{Config, ConfigBuilder};
pub use database::{Database, DatabaseConfig};
pub use error::{Error, Result, ValidationError};
pub use ids::{BucketId, OrgId, PoolId, RatePlanId, ReservationId, SlotId, SupplierId, VariantId};
pub use logging::{init_logger, LogLevel, Logger};
pub use money::Currency;
pub use operations::{
    AvailabilityDay, AvailabilityQuery, AvailabilityStats, CancellationToken, ExecutionResult,
    ExpireResult, HoldOperations, OperationPlan, PlanAction, PlanExecutor, SelectionRequest,
    SelectionResult, StatsAggregator, SupplierSelector,
};
pub use rates::{RatePlan, RatePlanSpec, RateRegistry};
pub use reservation::{Reservation, ReservationStatus};
pub use scope::{DateRange, TimeScope, TimeSlot, WeekdayMask};
pub use supplier::Supplier;

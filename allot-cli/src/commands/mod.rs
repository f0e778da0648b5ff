//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `init`: Create the data directory and database
//! - `supplier`: Register and list suppliers
//! - `pool`: Create shared inventory pools and attach buckets
//! - `time_slot`: Define named intra-day windows
//! - `allocate`: Create buckets over a date window
//! - `generate`: Seed default daily availability
//! - `reserve`, `release`, `confirm`: Reservation lifecycle
//! - `expire_holds`: Release holds past their release period
//! - `availability`: Per-day availability with totals
//! - `bulk_update`: Close, open, or adjust buckets across dates
//! - `select_supplier`: Waterfall supplier selection
//! - `rate_plan`: Load and list rate plans
//! - `show_data_dir`: Show resolved data directory path
//! - `completions`: Shell completion scripts

pub mod allocate;
pub mod availability;
pub mod bulk_update;
pub mod completions;
pub mod confirm;
pub mod expire_holds;
pub mod generate;
pub mod init;
pub mod pool;
pub mod rate_plan;
pub mod release;
pub mod reserve;
pub mod select_supplier;
pub mod show_data_dir;
pub mod supplier;
pub mod time_slot;

pub use allocate::AllocateCommand;
pub use availability::AvailabilityCommand;
pub use bulk_update::BulkUpdateCommand;
pub use completions::CompletionsCommand;
pub use confirm::ConfirmCommand;
pub use expire_holds::ExpireHoldsCommand;
pub use generate::GenerateCommand;
pub use init::InitCommand;
pub use pool::PoolCommand;
pub use rate_plan::RatePlanCommand;
pub use release::ReleaseCommand;
pub use reserve::ReserveCommand;
pub use select_supplier::SelectSupplierCommand;
pub use show_data_dir::ShowDataDirCommand;
pub use supplier::SupplierCommand;
pub use time_slot::TimeSlotCommand;

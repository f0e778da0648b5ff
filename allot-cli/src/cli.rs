//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    AllocateCommand, AvailabilityCommand, BulkUpdateCommand, CompletionsCommand, ConfirmCommand,
    ExpireHoldsCommand, GenerateCommand, InitCommand, PoolCommand, RatePlanCommand,
    ReleaseCommand, ReserveCommand, SelectSupplierCommand, ShowDataDirCommand, SupplierCommand,
    TimeSlotCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for supplier inventory allocation and availability.
#[derive(Parser)]
#[command(name = "allot")]
#[command(
    version,
    about = "Allocate supplier inventory and answer availability",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "ALLOT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds)
    #[arg(long, value_name = "SECONDS", global = true, env = "ALLOT_BUSY_TIMEOUT")]
    pub busy_timeout: Option<u32>,

    /// Organization (tenant) to act for
    #[arg(long, value_name = "ORG", global = true, env = "ALLOT_ORG")]
    pub org: Option<String>,

    /// Disable automatic database initialization
    #[arg(long, global = true, env = "ALLOT_DISABLE_AUTOINIT")]
    pub disable_autoinit: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize the data directory and database
    Init(InitCommand),

    /// Manage suppliers
    #[command(subcommand)]
    Supplier(SupplierCommand),

    /// Manage shared inventory pools
    #[command(subcommand)]
    Pool(PoolCommand),

    /// Manage named time slots
    #[command(subcommand)]
    TimeSlot(TimeSlotCommand),

    /// Create allocation buckets for a date or date window
    Allocate(AllocateCommand),

    /// Seed default daily availability for one or more variants
    Generate(GenerateCommand),

    /// Book or hold units on a bucket
    Reserve(ReserveCommand),

    /// Release a hold
    Release(ReleaseCommand),

    /// Turn a hold into a booking
    Confirm(ConfirmCommand),

    /// Release holds whose release period has passed
    ExpireHolds(ExpireHoldsCommand),

    /// Show per-day availability and totals
    Availability(AvailabilityCommand),

    /// Close, open, or adjust buckets across dates
    BulkUpdate(BulkUpdateCommand),

    /// Fill demand from suppliers in waterfall order
    SelectSupplier(SelectSupplierCommand),

    /// Manage rate plans
    #[command(subcommand)]
    RatePlan(RatePlanCommand),

    /// Show the resolved data directory path
    ShowDataDir(ShowDataDirCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}

//! Main entry point for the allot CLI.
//!
//! This is the command-line interface for the allot inventory engine.
//! It provides commands for managing supplier allocations:
//! - `allocate` / `generate`: Create buckets
//! - `reserve` / `release` / `confirm`: Move units through the counters
//! - `availability`: Report per-day availability
//! - `select-supplier`: Fill demand in waterfall order

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Route library diagnostics to stderr at the requested verbosity
    allot::init_logger(cli.verbose, cli.quiet).install();

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        data_dir: cli.data_dir,
        busy_timeout: cli.busy_timeout,
        org: cli.org,
        disable_autoinit: cli.disable_autoinit,
    };

    // Execute the command
    let result = match cli.command {
        cli::Command::Init(cmd) => cmd.execute(&global),
        cli::Command::Supplier(cmd) => cmd.execute(&global),
        cli::Command::Pool(cmd) => cmd.execute(&global),
        cli::Command::TimeSlot(cmd) => cmd.execute(&global),
        cli::Command::Allocate(cmd) => cmd.execute(&global),
        cli::Command::Generate(cmd) => cmd.execute(&global),
        cli::Command::Reserve(cmd) => cmd.execute(&global),
        cli::Command::Release(cmd) => cmd.execute(&global),
        cli::Command::Confirm(cmd) => cmd.execute(&global),
        cli::Command::ExpireHolds(cmd) => cmd.execute(&global),
        cli::Command::Availability(cmd) => cmd.execute(&global),
        cli::Command::BulkUpdate(cmd) => cmd.execute(&global),
        cli::Command::SelectSupplier(cmd) => cmd.execute(&global),
        cli::Command::RatePlan(cmd) => cmd.execute(&global),
        cli::Command::ShowDataDir(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

//! Build script for allot-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
/// When adding/removing/modifying commands, update both files.
fn build_cli() -> Command {
    Command::new("allot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Allocate supplier inventory and answer availability")
        .long_about(
            "Command-line tool for managing supplier allocations, reservations, \
             availability and supplier selection",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Override the data directory location")
                .value_name("PATH")
                .global(true)
                .env("ALLOT_DATA_DIR"),
        )
        .arg(
            Arg::new("busy-timeout")
                .long("busy-timeout")
                .help("Override the default busy timeout (in seconds)")
                .value_name("SECONDS")
                .global(true)
                .env("ALLOT_BUSY_TIMEOUT"),
        )
        .arg(
            Arg::new("org")
                .long("org")
                .help("Organization (tenant) to act for")
                .value_name("ORG")
                .global(true)
                .env("ALLOT_ORG"),
        )
        .arg(
            Arg::new("disable-autoinit")
                .long("disable-autoinit")
                .help("Disable automatic database initialization")
                .global(true)
                .action(clap::ArgAction::SetTrue)
                .env("ALLOT_DISABLE_AUTOINIT"),
        )
        .subcommands(vec![
            Command::new("init")
                .about("Initialize the data directory and database")
                .long_about("Set up the allot database and configuration"),
            Command::new("supplier")
                .about("Manage suppliers")
                .long_about("Register suppliers and list them with their default priority"),
            Command::new("pool")
                .about("Manage shared inventory pools")
                .long_about("Create pools and attach buckets so they share one counter"),
            Command::new("time-slot")
                .about("Manage named time slots")
                .long_about("Define named intra-day windows buckets can be scoped to"),
            Command::new("allocate")
                .about("Create allocation buckets for a date or date window")
                .long_about(
                    "Create one bucket per day, per slot, or one event bucket over a window; \
                     existing scopes are skipped",
                ),
            Command::new("generate")
                .about("Seed default daily availability for one or more variants")
                .long_about("Fill every uncovered day with a bucket built from configured defaults"),
            Command::new("reserve")
                .about("Book or hold units on a bucket")
                .long_about("Decrement a bucket or its pool, as a booking or an expiring hold"),
            Command::new("release")
                .about("Release a hold")
                .long_about("Return the units of a hold to its counter"),
            Command::new("confirm")
                .about("Turn a hold into a booking")
                .long_about("Move held units to booked on the same counter"),
            Command::new("expire-holds")
                .about("Release holds whose release period has passed")
                .long_about("Release every due hold of the organization"),
            Command::new("availability")
                .about("Show per-day availability and totals")
                .long_about("Derive availability for a variant over a window as table, JSON, CSV or TSV"),
            Command::new("bulk-update")
                .about("Close, open, or adjust buckets across dates")
                .long_about("Apply one action per date; each date succeeds or fails on its own"),
            Command::new("select-supplier")
                .about("Fill demand from suppliers in waterfall order")
                .long_about(
                    "Hold units from suppliers by priority and cost, priced against the master rate",
                ),
            Command::new("rate-plan")
                .about("Manage rate plans")
                .long_about("Load rate plans from YAML and list them per variant"),
            Command::new("show-data-dir")
                .about("Show the resolved data directory path")
                .long_about("Display the path to the allot data directory")
                .arg(
                    Arg::new("database")
                        .long("database")
                        .action(clap::ArgAction::SetTrue)
                        .help("Print the database file inside the data directory instead"),
                ),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("allot.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}

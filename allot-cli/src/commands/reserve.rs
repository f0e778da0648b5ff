//! Reserve command implementation.
//!
//! Books or holds units on a bucket. The counter authority (the bucket or
//! its pool) is decremented under an optimistic version guard.

use crate::error::CliError;
use crate::utils::{format_timestamp, load_configuration, open_database, resolve_org, GlobalOptions};
use allot::BucketId;
use clap::Args;

/// Book or hold units on a bucket.
#[derive(Args)]
pub struct ReserveCommand {
    /// Bucket to draw from
    #[arg(long)]
    pub bucket: BucketId,

    /// Number of units
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,

    /// Place a hold that expires after the bucket's release period
    #[arg(long)]
    pub hold: bool,
}

impl ReserveCommand {
    /// Execute the reserve command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let mut db = open_database(global, &config)?;

        let reservation = db.reserve(&org, self.bucket, self.quantity, self.hold)?;

        println!("{}", reservation.id.value());
        if !global.quiet {
            let expiry = reservation
                .expires_at
                .map(|at| format!(", expires {}", format_timestamp(at)))
                .unwrap_or_default();
            eprintln!(
                "{} {} unit(s) on {}{}",
                reservation.status, reservation.quantity, reservation.bucket, expiry
            );
        }

        Ok(())
    }
}

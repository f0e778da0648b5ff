//! Expire-holds command implementation.

use crate::error::CliError;
use crate::utils::{format_timestamp, load_configuration, open_database, resolve_org, GlobalOptions};
use allot::HoldOperations;
use chrono::Utc;
use clap::Args;

/// Release holds whose release period has passed.
#[derive(Args)]
pub struct ExpireHoldsCommand {
    /// List the holds that would expire without releasing them
    #[arg(long)]
    pub dry_run: bool,
}

impl ExpireHoldsCommand {
    /// Execute the expire-holds command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let mut db = open_database(global, &config)?;

        let result = HoldOperations::expire(&mut db, &org, Utc::now(), self.dry_run)?;

        if global.verbose || self.dry_run {
            for hold in &result.expired {
                let expired_at = hold.expires_at.map(format_timestamp).unwrap_or_default();
                eprintln!(
                    "  {} {} unit(s) on {} (expired {})",
                    hold.id, hold.quantity, hold.bucket, expired_at
                );
            }
        }

        if self.dry_run {
            println!("Would expire {} hold(s)", result.expired_count);
        } else {
            println!("Expired {} hold(s)", result.expired_count);
        }

        Ok(())
    }
}

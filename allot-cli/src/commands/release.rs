//! Release command implementation.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, resolve_org, GlobalOptions};
use allot::ReservationId;
use clap::Args;

/// Release a hold, returning its units.
#[derive(Args)]
pub struct ReleaseCommand {
    /// Reservation to release
    pub reservation: ReservationId,
}

impl ReleaseCommand {
    /// Execute the release command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let mut db = open_database(global, &config)?;

        let reservation = db.release(&org, self.reservation)?;

        if !global.quiet {
            println!(
                "Released {} ({} unit(s) on {})",
                reservation.id, reservation.quantity, reservation.bucket
            );
        }

        Ok(())
    }
}

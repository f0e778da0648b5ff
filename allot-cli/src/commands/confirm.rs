//! Confirm command implementation.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, resolve_org, GlobalOptions};
use allot::ReservationId;
use clap::Args;

/// Turn a hold into a booking.
#[derive(Args)]
pub struct ConfirmCommand {
    /// Held reservation to confirm
    pub reservation: ReservationId,
}

impl ConfirmCommand {
    /// Execute the confirm command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let mut db = open_database(global, &config)?;

        let reservation = db.confirm_hold(&org, self.reservation)?;

        if !global.quiet {
            println!(
                "Confirmed {} ({} unit(s) on {})",
                reservation.id, reservation.quantity, reservation.bucket
            );
        }

        Ok(())
    }
}

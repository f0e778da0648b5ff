//! Time slot commands.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, resolve_org, GlobalOptions};
use allot::VariantId;
use chrono::NaiveTime;
use clap::{Args, Subcommand};

/// Define named intra-day windows.
#[derive(Subcommand)]
pub enum TimeSlotCommand {
    /// Add a time slot to a variant
    Add(TimeSlotAddArgs),
}

/// Arguments for `time-slot add`.
#[derive(Args)]
pub struct TimeSlotAddArgs {
    /// Variant the slot belongs to
    #[arg(long)]
    pub variant: VariantId,

    /// Slot name, unique within the variant
    #[arg(long)]
    pub name: String,

    /// Start of the window (HH:MM:SS)
    #[arg(long, value_name = "TIME")]
    pub start: NaiveTime,

    /// End of the window (HH:MM:SS)
    #[arg(long, value_name = "TIME")]
    pub end: NaiveTime,
}

impl TimeSlotCommand {
    /// Execute the time-slot command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let mut db = open_database(global, &config)?;

        match self {
            TimeSlotCommand::Add(args) => {
                let slot =
                    db.create_time_slot(&org, &args.variant, &args.name, args.start, args.end)?;
                println!("{}", slot.id.value());
                if !global.quiet {
                    eprintln!(
                        "Added slot '{}' ({} - {}) to {}",
                        slot.name, slot.start, slot.end, slot.variant
                    );
                }
            }
        }

        Ok(())
    }
}

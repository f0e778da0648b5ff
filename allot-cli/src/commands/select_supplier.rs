//! Select-supplier command implementation.
//!
//! Runs the supplier waterfall for one date. Units are taken as holds;
//! confirm them with `allot confirm` or let them expire.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, resolve_org, GlobalOptions};
use allot::output::ReportFormat;
use allot::{SelectionRequest, SupplierSelector, VariantId};
use chrono::NaiveDate;
use clap::Args;

/// Fill demand from suppliers in waterfall order.
#[derive(Args)]
pub struct SelectSupplierCommand {
    /// Variant to sell
    #[arg(long)]
    pub variant: VariantId,

    /// Date to sell (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: NaiveDate,

    /// Guests per unit
    #[arg(long, default_value_t = 1)]
    pub pax: u32,

    /// Units to fill
    #[arg(long, default_value_t = 1)]
    pub demand: u32,

    /// Print the selection as JSON
    #[arg(long)]
    pub json: bool,
}

impl SelectSupplierCommand {
    /// Execute the select-supplier command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let mut db = open_database(global, &config)?;

        let request = SelectionRequest {
            org,
            variant: self.variant,
            date: self.date,
            pax: self.pax,
            demand: self.demand,
        };
        let selection = SupplierSelector::select(&mut db, &request)?;

        let format = if self.json {
            ReportFormat::Json
        } else {
            ReportFormat::Human
        };
        let rendered = format.create_formatter().format_selection(&selection)?;
        println!("{}", rendered.trim_end());

        Ok(())
    }
}

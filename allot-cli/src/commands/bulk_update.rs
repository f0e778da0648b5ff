//! Bulk update command implementation.
//!
//! Applies one action to every bucket of a variant on the selected dates.
//! Each date succeeds or fails on its own; failures are listed and the
//! remaining dates still apply.

use crate::error::CliError;
use crate::utils::{
    load_configuration, open_database, report_execution, resolve_org, resolve_window,
    GlobalOptions,
};
use allot::operations::{BulkAction, BulkUpdateOptions, BulkUpdatePlan};
use allot::{PlanExecutor, SupplierId, VariantId};
use chrono::NaiveDate;
use clap::{ArgGroup, Args};

/// Close, open, or adjust buckets across dates.
#[derive(Args)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["close", "open", "adjust", "set", "annotate"]),
))]
pub struct BulkUpdateCommand {
    /// Variant to update
    #[arg(long)]
    pub variant: VariantId,

    /// Date to update (repeat for several)
    #[arg(long = "date", value_name = "DATE", conflicts_with_all = ["from", "to"])]
    pub dates: Vec<NaiveDate>,

    /// First date of the window
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last date of the window (inclusive)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Only touch this supplier's buckets
    #[arg(long)]
    pub supplier: Option<SupplierId>,

    /// Stop selling
    #[arg(long)]
    pub close: bool,

    /// Resume selling
    #[arg(long)]
    pub open: bool,

    /// Change quantity by a signed amount
    #[arg(long, value_name = "DELTA", allow_hyphen_values = true)]
    pub adjust: Option<i64>,

    /// Set quantity to an absolute value
    #[arg(long, value_name = "QUANTITY")]
    pub set: Option<u32>,

    /// Replace the notes
    #[arg(long, value_name = "NOTES")]
    pub annotate: Option<String>,

    /// Fail dates a negative adjustment would push below zero instead of clamping
    #[arg(long)]
    pub no_floor: bool,

    /// Preview actions without executing
    #[arg(long)]
    pub dry_run: bool,
}

impl BulkUpdateCommand {
    /// Execute the bulk-update command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Load configuration
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;

        // 2. Resolve the action and dates
        let action = self.action(config.floor_at_zero())?;
        let options = if self.dates.is_empty() {
            let window = resolve_window(None, self.from, self.to)?;
            BulkUpdateOptions::for_range(org, self.variant, window, action)
        } else {
            BulkUpdateOptions::new(org, self.variant, self.dates, action)
        }
        .with_supplier(self.supplier);

        // 3. Plan
        let plan = BulkUpdatePlan::new(options).build_plan()?;

        // 4. Open database and execute
        let mut db = open_database(global, &config)?;
        let mut executor = PlanExecutor::new(&mut db).with_batch_size(config.batch_size());
        if self.dry_run {
            executor = executor.dry_run();
        }
        let result = executor.execute(&plan)?;

        report_execution(&result, global);
        Ok(())
    }

    fn action(&self, config_floor: bool) -> Result<BulkAction, CliError> {
        if self.close {
            Ok(BulkAction::Close)
        } else if self.open {
            Ok(BulkAction::Open)
        } else if let Some(delta) = self.adjust {
            Ok(BulkAction::Adjust {
                delta,
                floor_at_zero: config_floor && !self.no_floor,
            })
        } else if let Some(quantity) = self.set {
            Ok(BulkAction::Set { quantity })
        } else if let Some(ref notes) = self.annotate {
            Ok(BulkAction::Annotate {
                notes: notes.clone(),
            })
        } else {
            Err(CliError::InvalidArguments(
                "one of --close, --open, --adjust, --set or --annotate is required".to_string(),
            ))
        }
    }
}

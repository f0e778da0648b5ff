//! Generate command implementation.
//!
//! Seeds one default bucket per day for each variant, filling only the
//! days that have none, then reports per-variant counts.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, resolve_org, resolve_window, GlobalOptions};
use allot::operations::{generate_availability, GenerateOptions};
use allot::{AllocationType, Currency, SupplierId, VariantId};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;

/// Seed default daily availability.
#[derive(Args)]
pub struct GenerateCommand {
    /// Variant to generate for (repeat for several)
    #[arg(long = "variant", required = true, value_name = "VARIANT")]
    pub variants: Vec<VariantId>,

    /// Single date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// First date of the window
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last date of the window (inclusive)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Owning supplier
    #[arg(long)]
    pub supplier: Option<SupplierId>,

    /// Units per day (overrides generation.default_quantity)
    #[arg(long)]
    pub quantity: Option<u32>,

    /// Commitment model (overrides generation.allocation_type)
    #[arg(long)]
    pub allocation_type: Option<AllocationType>,

    /// Cost currency (overrides generation.currency)
    #[arg(long)]
    pub currency: Option<Currency>,

    /// Cost per unit (overrides generation.unit_cost)
    #[arg(long)]
    pub unit_cost: Option<Decimal>,
}

impl GenerateCommand {
    /// Execute the generate command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let window = resolve_window(self.date, self.from, self.to)?;
        let generation = config.generation.clone().unwrap_or_default();

        let currency = self.currency.or(generation.currency).ok_or_else(|| {
            CliError::InvalidArguments(
                "no currency given (use --currency or generation.currency)".to_string(),
            )
        })?;

        let mut options = GenerateOptions::new(org, self.variants, window, currency)
            .with_config(&generation)
            .with_supplier(self.supplier);
        options.currency = currency;
        if let Some(quantity) = self.quantity {
            options.quantity = quantity;
        }
        if let Some(allocation_type) = self.allocation_type {
            options.allocation_type = allocation_type;
        }
        if let Some(cost) = self.unit_cost {
            options.unit_cost = cost;
        }

        let mut db = open_database(global, &config)?;
        let report = generate_availability(&mut db, &options, config.batch_size(), None)?;

        println!("VARIANT\tCREATED\tSKIPPED\tFAILED\tUNCOVERED");
        for variant in &report.variants {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                variant.variant,
                variant.created,
                variant.skipped,
                variant.failed,
                variant.uncovered_days
            );
        }

        if !global.quiet {
            for warning in &report.execution.warnings {
                eprintln!("Warning: {warning}");
            }
        }

        Ok(())
    }
}

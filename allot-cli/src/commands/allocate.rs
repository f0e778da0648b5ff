//! Allocate command implementation.
//!
//! Creates buckets for one variant over a single date or a date window.
//! Dates that already carry a bucket for the same supplier and scope are
//! skipped, so re-running a command only fills gaps.

use crate::error::CliError;
use crate::utils::{
    load_configuration, open_database, report_execution, resolve_org, resolve_window,
    GlobalOptions,
};
use allot::bucket::Bounds;
use allot::operations::{BulkCreateOptions, BulkCreatePlan};
use allot::{
    AllocationType, BucketSpec, Currency, DateRange, PlanExecutor, PoolId, SlotId, SupplierId,
    TimeScope, VariantId, WeekdayMask,
};
use chrono::{NaiveDate, Weekday};
use clap::Args;
use rust_decimal::Decimal;

/// Create allocation buckets.
#[derive(Args)]
pub struct AllocateCommand {
    /// Variant to allocate
    #[arg(long)]
    pub variant: VariantId,

    /// Single date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// First date of the window
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last date of the window (inclusive)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Only create buckets on these weekdays (e.g. mon,fri)
    #[arg(long, value_delimiter = ',', value_name = "DAYS")]
    pub weekdays: Vec<Weekday>,

    /// Create one event bucket spanning the whole window
    #[arg(long, conflicts_with_all = ["slot", "weekdays"])]
    pub event: bool,

    /// Bind every bucket to this time slot
    #[arg(long, value_name = "SLOT")]
    pub slot: Option<SlotId>,

    /// Owning supplier (house inventory when absent)
    #[arg(long)]
    pub supplier: Option<SupplierId>,

    /// Units per bucket (ignored for freesale)
    #[arg(long)]
    pub quantity: Option<u32>,

    /// Commitment model: committed, freesale or on_request
    #[arg(long, default_value = "committed")]
    pub allocation_type: AllocationType,

    /// Cost currency (defaults to the configured generation currency)
    #[arg(long)]
    pub currency: Option<Currency>,

    /// Cost per unit
    #[arg(long, default_value = "0")]
    pub unit_cost: Decimal,

    /// Allow selling this many units beyond the quantity
    #[arg(long, value_name = "UNITS")]
    pub overbooking: Option<u32>,

    /// Hours a hold stays valid before expiry
    #[arg(long, default_value_t = 0)]
    pub release_period_hours: u32,

    /// Minimum length of stay
    #[arg(long, requires = "max_stay")]
    pub min_stay: Option<u32>,

    /// Maximum length of stay
    #[arg(long, requires = "min_stay")]
    pub max_stay: Option<u32>,

    /// Minimum occupancy
    #[arg(long, requires = "max_pax")]
    pub min_pax: Option<u32>,

    /// Maximum occupancy
    #[arg(long, requires = "min_pax")]
    pub max_pax: Option<u32>,

    /// Count against a shared pool
    #[arg(long)]
    pub pool: Option<PoolId>,

    /// Create the buckets closed for sale
    #[arg(long)]
    pub stop_sell: bool,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Preview actions without executing
    #[arg(long)]
    pub dry_run: bool,
}

impl AllocateCommand {
    /// Execute the allocate command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Load configuration
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;

        // 2. Resolve the window and currency
        let window = resolve_window(self.date, self.from, self.to)?;
        let currency = self
            .currency
            .or_else(|| config.generation.as_ref().and_then(|g| g.currency))
            .ok_or_else(|| {
                CliError::InvalidArguments(
                    "no currency given (use --currency or generation.currency)".to_string(),
                )
            })?;

        let quantity = match self.allocation_type {
            AllocationType::Freesale => None,
            AllocationType::Committed | AllocationType::OnRequest => {
                Some(self.quantity.ok_or_else(|| {
                    CliError::InvalidArguments(format!(
                        "--quantity is required for {} buckets",
                        self.allocation_type
                    ))
                })?)
            }
        };

        // 3. Build the template and scopes
        let scopes = self.scopes(window);
        let template = self.template(org, currency, quantity, window)?;
        let plan = BulkCreatePlan::new(BulkCreateOptions::new(template, scopes)).build_plan()?;

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

    fn scopes(&self, window: DateRange) -> Vec<TimeScope> {
        if self.event {
            return vec![TimeScope::Range { range: window }];
        }

        let mask = if self.weekdays.is_empty() {
            WeekdayMask::ALL
        } else {
            WeekdayMask::from_days(&self.weekdays)
        };
        window
            .days()
            .filter(|day| mask.includes(*day))
            .map(|date| match self.slot {
                Some(slot) => TimeScope::Slot { date, slot },
                None => TimeScope::date(date),
            })
            .collect()
    }

    fn template(
        &self,
        org: allot::OrgId,
        currency: Currency,
        quantity: Option<u32>,
        window: DateRange,
    ) -> Result<BucketSpec, CliError> {
        let stay = match (self.min_stay, self.max_stay) {
            (Some(min), Some(max)) => {
                Some(Bounds::new("stay", min, max).map_err(allot::Error::from)?)
            }
            _ => None,
        };
        let occupancy = match (self.min_pax, self.max_pax) {
            (Some(min), Some(max)) => {
                Some(Bounds::new("occupancy", min, max).map_err(allot::Error::from)?)
            }
            _ => None,
        };

        let mut builder = BucketSpec::builder(
            org,
            self.variant.clone(),
            TimeScope::date(window.start()),
            currency,
        )
        .supplier(self.supplier)
        .quantity(quantity)
        .allocation_type(self.allocation_type)
        .unit_cost(self.unit_cost)
        .release_period_hours(self.release_period_hours)
        .stop_sell(self.stop_sell)
        .stay(stay)
        .occupancy(occupancy)
        .pool(self.pool)
        .notes(self.notes.clone());
        if let Some(limit) = self.overbooking {
            builder = builder.overbooking(limit);
        }

        builder
            .build()
            .map_err(|e| CliError::from(allot::Error::from(e)))
    }
}

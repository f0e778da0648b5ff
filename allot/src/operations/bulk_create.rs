//! Bucket creation over a list of scopes, and availability generation.
//!
//! Single-date and range creation share this entry point: a template
//! [`BucketSpec`] is stamped onto every scope and each copy becomes one
//! [`PlanAction::CreateBucket`]. A scope that already has a bucket is
//! skipped, so running the same creation twice adds nothing the second time.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::bucket::{AllocationType, BucketSpec};
use crate::config::GenerationConfig;
use crate::database::Database;
use crate::error::{Result, ValidationError};
use crate::ids::{OrgId, SupplierId, VariantId};
use crate::money::Currency;
use crate::scope::{DateRange, TimeScope};

use super::availability::AvailabilityQuery;
use super::cancel::CancellationToken;
use super::executor::{ExecutionResult, PlanExecutor};
use super::outcome::ItemStatus;
use super::plan::{OperationPlan, PlanAction};

/// Per-day quantity used when neither the caller nor the config sets one.
pub const DEFAULT_GENERATED_QUANTITY: u32 = 10;

/// Options for bulk bucket creation.
#[derive(Debug, Clone)]
pub struct BulkCreateOptions {
    /// Definition copied onto every scope; its own scope is ignored.
    pub template: BucketSpec,
    /// Scopes to create buckets on.
    pub scopes: Vec<TimeScope>,
}

impl BulkCreateOptions {
    /// Options over an explicit scope list.
    #[must_use]
    pub fn new(template: BucketSpec, scopes: Vec<TimeScope>) -> Self {
        Self { template, scopes }
    }

    /// One single-date bucket per day of `range`.
    #[must_use]
    pub fn daily(template: BucketSpec, range: DateRange) -> Self {
        Self::new(template, range.days().map(TimeScope::date).collect())
    }
}

/// Plans bulk bucket creation.
///
/// # Examples
///
/// ```
/// use allot::operations::{BulkCreateOptions, BulkCreatePlan};
/// use allot::{BucketSpec, Currency, DateRange, OrgId, TimeScope, VariantId};
/// use chrono::NaiveDate;
///
/// let first = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
/// let template = BucketSpec::builder(
///     OrgId::new("acme").unwrap(),
///     VariantId::new("dbl").unwrap(),
///     TimeScope::date(first),
///     Currency::try_from("EUR").unwrap(),
/// )
/// .quantity(Some(8))
/// .build()
/// .unwrap();
/// let range = DateRange::new(first, NaiveDate::from_ymd_opt(2025, 7, 10).unwrap()).unwrap();
///
/// let plan = BulkCreatePlan::new(BulkCreateOptions::daily(template, range))
///     .build_plan()
///     .unwrap();
/// assert_eq!(plan.len(), 10);
/// ```
pub struct BulkCreatePlan {
    options: BulkCreateOptions,
}

impl BulkCreatePlan {
    /// Creates a planner.
    #[must_use]
    pub const fn new(options: BulkCreateOptions) -> Self {
        Self { options }
    }

    /// Builds one create action per scope, in the given order.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the template is invalid.
    pub fn build_plan(&self) -> Result<OperationPlan> {
        let BulkCreateOptions { template, scopes } = &self.options;
        template.validate()?;

        let mut plan = OperationPlan::new(format!(
            "Create {} {} bucket(s) for {}",
            scopes.len(),
            template.allocation_type,
            template.variant
        ));
        if scopes.is_empty() {
            plan = plan.add_warning("no scopes selected");
        }
        for scope in scopes {
            plan = plan.add_action(PlanAction::CreateBucket(template.with_scope(*scope)));
        }
        Ok(plan)
    }
}

/// Options for generating availability across variants.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Owning tenant.
    pub org: OrgId,
    /// Variants to seed.
    pub variants: Vec<VariantId>,
    /// Inclusive date window.
    pub range: DateRange,
    /// Supplier owning the buckets; house inventory when `None`.
    pub supplier: Option<SupplierId>,
    /// Per-day quantity; ignored for freesale.
    pub quantity: u32,
    /// Commitment model of the new buckets.
    pub allocation_type: AllocationType,
    /// Cost currency.
    pub currency: Currency,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// Hold release period.
    pub release_period_hours: u32,
}

impl GenerateOptions {
    /// Committed house inventory at the default quantity and zero cost.
    #[must_use]
    pub fn new(org: OrgId, variants: Vec<VariantId>, range: DateRange, currency: Currency) -> Self {
        Self {
            org,
            variants,
            range,
            supplier: None,
            quantity: DEFAULT_GENERATED_QUANTITY,
            allocation_type: AllocationType::Committed,
            currency,
            unit_cost: Decimal::ZERO,
            release_period_hours: 0,
        }
    }

    /// Fills every field the configuration sets.
    #[must_use]
    pub fn with_config(mut self, config: &GenerationConfig) -> Self {
        if let Some(q) = config.default_quantity {
            self.quantity = q;
        }
        if let Some(t) = config.allocation_type {
            self.allocation_type = t;
        }
        if let Some(c) = config.currency {
            self.currency = c;
        }
        if let Some(cost) = config.unit_cost {
            self.unit_cost = cost;
        }
        if let Some(hours) = config.release_period_hours {
            self.release_period_hours = hours;
        }
        self
    }

    /// Sets the owning supplier.
    #[must_use]
    pub fn with_supplier(mut self, supplier: Option<SupplierId>) -> Self {
        self.supplier = supplier;
        self
    }

    fn template(&self, variant: &VariantId) -> Result<BucketSpec> {
        let quantity = match self.allocation_type {
            AllocationType::Freesale => None,
            AllocationType::Committed | AllocationType::OnRequest => Some(self.quantity),
        };
        Ok(BucketSpec::builder(
            self.org.clone(),
            variant.clone(),
            TimeScope::date(self.range.start()),
            self.currency,
        )
        .supplier(self.supplier)
        .quantity(quantity)
        .allocation_type(self.allocation_type)
        .unit_cost(self.unit_cost)
        .release_period_hours(self.release_period_hours)
        .build()?)
    }
}

/// Per-variant outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantReport {
    /// The variant.
    pub variant: VariantId,
    /// Buckets created.
    pub created: usize,
    /// Dates that already had a bucket or were cancelled.
    pub skipped: usize,
    /// Dates that failed.
    pub failed: usize,
    /// Dates the verification pass found without any bucket.
    pub uncovered_days: usize,
}

/// Outcome of a generation run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    /// One entry per requested variant, in request order.
    pub variants: Vec<VariantReport>,
    /// The underlying execution.
    pub execution: ExecutionResult,
}

/// Seeds one bucket per day and variant, then re-derives availability over
/// the window to confirm every day is covered.
///
/// # Errors
///
/// Returns a validation error if no variant is given or the template is
/// invalid, and database errors from the verification pass. Per-date
/// failures are reported, not returned.
pub fn generate_availability(
    db: &mut Database,
    options: &GenerateOptions,
    batch_size: usize,
    cancel: Option<CancellationToken>,
) -> Result<GenerateReport> {
    if options.variants.is_empty() {
        return Err(ValidationError::new("variants", "at least one variant is required").into());
    }

    let mut plan = OperationPlan::new(format!(
        "Generate availability for {} variant(s) over {}",
        options.variants.len(),
        options.range
    ));
    for variant in &options.variants {
        let daily = BulkCreatePlan::new(BulkCreateOptions::daily(
            options.template(variant)?,
            options.range,
        ))
        .build_plan()?;
        for action in daily.actions {
            plan = plan.add_action(action);
        }
    }

    let mut executor = PlanExecutor::new(db).with_batch_size(batch_size);
    if let Some(token) = cancel {
        executor = executor.with_cancellation(token);
    }
    let execution = executor.execute(&plan)?;

    let mut variants = Vec::with_capacity(options.variants.len());
    for variant in &options.variants {
        let mine = || execution.outcomes.iter().filter(|o| &o.variant == variant);
        let count = |pred: fn(&ItemStatus) -> bool| mine().filter(|o| pred(&o.status)).count();

        let query = AvailabilityQuery::new(options.org.clone(), variant.clone(), options.range)
            .with_supplier(options.supplier);
        let mut uncovered_days = 0;
        for day in query.generate(db.connection()) {
            if day?.buckets == 0 {
                uncovered_days += 1;
            }
        }
        if uncovered_days > 0 {
            log::warn!("{variant}: {uncovered_days} day(s) in {} have no bucket", options.range);
        }

        variants.push(VariantReport {
            variant: variant.clone(),
            created: count(|s| *s == ItemStatus::Applied),
            skipped: count(|s| matches!(s, ItemStatus::Skipped(_))),
            failed: count(|s| matches!(s, ItemStatus::Failed(_))),
            uncovered_days,
        });
    }

    Ok(GenerateReport {
        variants,
        execution,
    })
}

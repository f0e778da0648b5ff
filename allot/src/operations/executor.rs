//! Plan execution engine.
//!
//! Actions run in bounded batches. Each batch is one `IMMEDIATE`
//! transaction with a savepoint per action, so a failing action is rolled
//! back alone and a failing batch never undoes batches committed before it.
//! Cancellation is checked between batches.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::bucket::CounterAuthority;
use crate::database::Database;
use crate::error::{Error, Result};

use super::bulk_update::apply_to_date;
use super::cancel::CancellationToken;
use super::outcome::{ItemOutcome, ItemStatus, SkipReason};
use super::plan::{OperationPlan, PlanAction};

/// Default number of actions per transaction.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Result of executing a plan.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Description of the executed plan.
    pub description: String,

    /// Whether this was a dry-run (no actual changes made).
    pub dry_run: bool,

    /// One outcome per action, in plan order.
    pub outcomes: Vec<ItemOutcome>,

    /// Warnings from the plan.
    pub warnings: Vec<String>,
}

impl ExecutionResult {
    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    /// Number of applied items.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.count(|s| *s == ItemStatus::Applied)
    }

    /// Number of skipped items.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Skipped(_)))
    }

    /// Number of failed items.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed(_)))
    }

    /// Whether any item was skipped because of cancellation.
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.status == ItemStatus::Skipped(SkipReason::Cancelled))
    }
}

/// Executes operation plans against the database.
///
/// # Examples
///
/// ```no_run
/// use allot::operations::{BulkAction, BulkUpdateOptions, BulkUpdatePlan, PlanExecutor};
/// use allot::{Database, DatabaseConfig, DateRange, OrgId, VariantId};
/// use chrono::NaiveDate;
///
/// let mut db = Database::open(DatabaseConfig::new("/tmp/allot.db")).unwrap();
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
/// )
/// .unwrap();
/// let options = BulkUpdateOptions::for_range(
///     OrgId::new("acme").unwrap(),
///     VariantId::new("dbl").unwrap(),
///     range,
///     BulkAction::Close,
/// );
/// let plan = BulkUpdatePlan::new(options).build_plan().unwrap();
///
/// // Preview first
/// let preview = PlanExecutor::new(&mut db).dry_run().execute(&plan).unwrap();
/// println!("would close {} date(s)", preview.applied());
///
/// let result = PlanExecutor::new(&mut db).execute(&plan).unwrap();
/// assert!(!result.dry_run);
/// ```
pub struct PlanExecutor<'a> {
    db: &'a mut Database,
    dry_run: bool,
    batch_size: usize,
    cancel: Option<CancellationToken>,
}

impl<'a> PlanExecutor<'a> {
    /// Creates a new plan executor.
    #[must_use]
    pub fn new(db: &'a mut Database) -> Self {
        Self {
            db,
            dry_run: false,
            batch_size: DEFAULT_BATCH_SIZE,
            cancel: None,
        }
    }

    /// Sets the executor to dry-run mode.
    ///
    /// Every batch is rolled back after it runs, so outcomes report what
    /// would happen without changing anything.
    #[must_use]
    pub const fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Sets the number of actions per transaction; zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Checks `token` before every batch.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Executes the given plan.
    ///
    /// Item failures are reported in the result; a batch whose transaction
    /// cannot start or commit reports every item in it as failed and the
    /// next batch still runs.
    ///
    /// # Errors
    ///
    /// This currently always returns `Ok`; the signature leaves room for
    /// failures that abort the whole plan.
    pub fn execute(&mut self, plan: &OperationPlan) -> Result<ExecutionResult> {
        let mut outcomes = Vec::with_capacity(plan.len());
        let mut mutated = HashSet::new();

        for (index, batch) in plan.actions.chunks(self.batch_size).enumerate() {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                log::info!("cancelled before batch {index}, skipping {} item(s)", batch.len());
                outcomes.extend(batch.iter().map(|action| {
                    let (variant, date) = action.target();
                    ItemOutcome::skipped(variant.clone(), date, SkipReason::Cancelled)
                }));
                continue;
            }

            // Authorities count as mutated only once their batch has gone through
            let mut pending = mutated.clone();
            let now = Utc::now();
            let apply =
                |conn: &Connection, action: &PlanAction| apply_action(conn, action, now, &mut pending);
            let results = if self.dry_run {
                self.db.preview_batch(batch, apply)
            } else {
                self.db.run_batch(batch, apply)
            };

            match results {
                Ok(results) => {
                    mutated = pending;
                    for (action, result) in batch.iter().zip(results) {
                        outcomes.push(match result {
                            Ok(outcome) => outcome,
                            Err(e) => failure_outcome(action, &e),
                        });
                    }
                }
                Err(e) => {
                    log::warn!("batch {index} failed as a whole: {e}");
                    outcomes.extend(batch.iter().map(|action| failure_outcome(action, &e)));
                }
            }
            log::debug!("batch {index} done ({} item(s))", batch.len());
        }

        Ok(ExecutionResult {
            description: plan.description.clone(),
            dry_run: self.dry_run,
            outcomes,
            warnings: plan.warnings.clone(),
        })
    }
}

fn apply_action(
    conn: &Connection,
    action: &PlanAction,
    now: DateTime<Utc>,
    mutated: &mut HashSet<CounterAuthority>,
) -> Result<ItemOutcome> {
    match action {
        PlanAction::CreateBucket(spec) => {
            let bucket = Database::insert_bucket(conn, spec, now)?;
            Ok(ItemOutcome::applied(
                spec.variant.clone(),
                spec.scope.start_date(),
                vec![bucket.id],
            ))
        }
        PlanAction::MutateDate {
            org,
            variant,
            supplier,
            date,
            action,
        } => apply_to_date(conn, org, variant, *supplier, *date, action, mutated),
    }
}

fn failure_outcome(action: &PlanAction, err: &Error) -> ItemOutcome {
    let (variant, date) = action.target();
    match err {
        Error::DuplicateScope { .. } => {
            ItemOutcome::skipped(variant.clone(), date, SkipReason::DuplicateScope)
        }
        other => ItemOutcome::failed(variant.clone(), date, other.to_string()),
    }
}

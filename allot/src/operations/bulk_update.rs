//! Uniform edits across an explicit set of dates.
//!
//! Each date is one item: its edits run in their own savepoint and the date
//! reports `applied`, `skipped` or `failed` on its own. Within one call a
//! bucket (for flag edits) or counter authority (for quantity edits) is
//! changed at most once, so a range bucket or a pool spanning several dates
//! is not adjusted repeatedly.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::bucket::CounterAuthority;
use crate::database::Database;
use crate::error::{Result, ValidationError};
use crate::ids::{OrgId, SupplierId, VariantId};
use crate::scope::DateRange;

use super::outcome::{ItemOutcome, SkipReason};
use super::plan::{OperationPlan, PlanAction};

/// Longest note accepted by `annotate`.
const MAX_NOTES_LEN: usize = 1000;

/// An edit applied to every bucket covering a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BulkAction {
    /// Stop sales.
    Close,
    /// Resume sales and lift any blackout.
    Open,
    /// Add `delta` to the quantity.
    Adjust {
        /// Signed change.
        delta: i64,
        /// Clamp a negative result to zero instead of failing the date.
        #[serde(default = "default_floor")]
        floor_at_zero: bool,
    },
    /// Replace the quantity.
    Set {
        /// New quantity.
        quantity: u32,
    },
    /// Replace the notes.
    Annotate {
        /// New notes.
        notes: String,
    },
}

const fn default_floor() -> bool {
    true
}

impl BulkAction {
    /// Whether the edit changes a quantity rather than flags or notes.
    #[must_use]
    pub const fn edits_quantity(&self) -> bool {
        matches!(self, Self::Adjust { .. } | Self::Set { .. })
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Close => f.write_str("close"),
            Self::Open => f.write_str("open"),
            Self::Adjust { delta, .. } => write!(f, "adjust {delta:+}"),
            Self::Set { quantity } => write!(f, "set {quantity}"),
            Self::Annotate { .. } => f.write_str("annotate"),
        }
    }
}

/// Options for a bulk update.
#[derive(Debug, Clone)]
pub struct BulkUpdateOptions {
    /// Owning tenant.
    pub org: OrgId,
    /// Variant to edit.
    pub variant: VariantId,
    /// Only edit this supplier's buckets; all buckets when `None`.
    pub supplier: Option<SupplierId>,
    /// Dates to edit.
    pub dates: Vec<NaiveDate>,
    /// The edit.
    pub action: BulkAction,
}

impl BulkUpdateOptions {
    /// Options over an explicit date list.
    #[must_use]
    pub fn new(org: OrgId, variant: VariantId, dates: Vec<NaiveDate>, action: BulkAction) -> Self {
        Self {
            org,
            variant,
            supplier: None,
            dates,
            action,
        }
    }

    /// Options over every date of a range.
    #[must_use]
    pub fn for_range(org: OrgId, variant: VariantId, range: DateRange, action: BulkAction) -> Self {
        Self::new(org, variant, range.days().collect(), action)
    }

    /// Restricts the edit to one supplier.
    #[must_use]
    pub fn with_supplier(mut self, supplier: Option<SupplierId>) -> Self {
        self.supplier = supplier;
        self
    }
}

/// Plans a bulk update.
///
/// # Examples
///
/// ```
/// use allot::operations::{BulkAction, BulkUpdateOptions, BulkUpdatePlan};
/// use allot::{DateRange, OrgId, VariantId};
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 7, 7).unwrap(),
/// )
/// .unwrap();
/// let options = BulkUpdateOptions::for_range(
///     OrgId::new("acme").unwrap(),
///     VariantId::new("dbl").unwrap(),
///     range,
///     BulkAction::Close,
/// );
/// let plan = BulkUpdatePlan::new(options).build_plan().unwrap();
/// assert_eq!(plan.len(), 7);
/// ```
pub struct BulkUpdatePlan {
    options: BulkUpdateOptions,
}

impl BulkUpdatePlan {
    /// Creates a planner.
    #[must_use]
    pub const fn new(options: BulkUpdateOptions) -> Self {
        Self { options }
    }

    /// Builds one action per distinct date, in date order.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the notes are too long.
    pub fn build_plan(&self) -> Result<OperationPlan> {
        let opts = &self.options;
        if let BulkAction::Annotate { notes } = &opts.action {
            if notes.len() > MAX_NOTES_LEN {
                return Err(ValidationError::new(
                    "notes",
                    format!("must be at most {MAX_NOTES_LEN} characters"),
                )
                .into());
            }
        }

        let mut dates = opts.dates.clone();
        dates.sort_unstable();
        dates.dedup();

        let mut plan = OperationPlan::new(format!(
            "{} {} across {} date(s)",
            opts.action,
            opts.variant,
            dates.len()
        ));
        if dates.is_empty() {
            plan = plan.add_warning("no dates selected");
        }
        if matches!(opts.action, BulkAction::Adjust { delta: 0, .. }) {
            plan = plan.add_warning("adjusting by 0 changes nothing");
        }

        for date in dates {
            plan = plan.add_action(PlanAction::MutateDate {
                org: opts.org.clone(),
                variant: opts.variant.clone(),
                supplier: opts.supplier,
                date,
                action: opts.action.clone(),
            });
        }
        Ok(plan)
    }
}

fn new_quantity(current: u32, action: &BulkAction) -> Result<u32> {
    match action {
        BulkAction::Set { quantity } => Ok(*quantity),
        BulkAction::Adjust {
            delta,
            floor_at_zero,
        } => {
            let target = i64::from(current).checked_add(*delta).ok_or_else(|| {
                ValidationError::new(
                    "quantity",
                    format!("adjusting {current} by {delta} overflows"),
                )
            })?;
            if target < 0 {
                if *floor_at_zero {
                    Ok(0)
                } else {
                    Err(ValidationError::new(
                        "quantity",
                        format!("adjusting {current} by {delta} would go negative"),
                    )
                    .into())
                }
            } else {
                u32::try_from(target).map_err(|_| {
                    ValidationError::new("quantity", format!("{target} is too large")).into()
                })
            }
        }
        _ => Ok(current),
    }
}

/// Applies `action` to every matching bucket on `date`.
///
/// `mutated` tracks what this call already changed and is only extended when
/// the whole date succeeds.
pub(crate) fn apply_to_date(
    conn: &Connection,
    org: &OrgId,
    variant: &VariantId,
    supplier: Option<SupplierId>,
    date: NaiveDate,
    action: &BulkAction,
    mutated: &mut HashSet<CounterAuthority>,
) -> Result<ItemOutcome> {
    let buckets = Database::buckets_on_date(conn, org, variant, supplier, date)?;
    if buckets.is_empty() {
        return Ok(ItemOutcome::skipped(variant.clone(), date, SkipReason::NoBucket));
    }

    let mut touched = Vec::new();
    let mut changed = Vec::new();
    let mut skip = None;

    for bucket in &buckets {
        let key = if action.edits_quantity() {
            bucket.authority()
        } else {
            CounterAuthority::Bucket(bucket.id)
        };
        if mutated.contains(&key) || touched.contains(&key) {
            skip.get_or_insert(SkipReason::AlreadyMutated);
            continue;
        }

        match action {
            BulkAction::Close => {
                Database::update_bucket_flags(conn, bucket.id, Some(true), None, None)?;
            }
            BulkAction::Open => {
                Database::update_bucket_flags(conn, bucket.id, Some(false), Some(false), None)?;
            }
            BulkAction::Annotate { notes } => {
                Database::update_bucket_flags(conn, bucket.id, None, None, Some(notes.as_str()))?;
            }
            BulkAction::Adjust { .. } | BulkAction::Set { .. } => {
                if bucket.spec.quantity.is_none() && bucket.spec.pool.is_none() {
                    skip.get_or_insert(SkipReason::Unconstrained);
                    continue;
                }
                let (counters, version) = Database::authority_counters(conn, bucket)?;
                let quantity = new_quantity(counters.quantity.unwrap_or(0), action)?;
                if !counters.admits_quantity(quantity) {
                    return Err(ValidationError::new(
                        "quantity",
                        format!(
                            "{quantity} would leave {key} below its {} booked and held units",
                            counters.committed()
                        ),
                    )
                    .into());
                }
                Database::set_authority_quantity(conn, key, quantity, version)?;
            }
        }
        touched.push(key);
        changed.push(bucket.id);
    }

    if changed.is_empty() {
        let reason = skip.unwrap_or(SkipReason::NoBucket);
        return Ok(ItemOutcome::skipped(variant.clone(), date, reason));
    }
    mutated.extend(touched);
    log::debug!("{action} applied to {} bucket(s) on {date}", changed.len());
    Ok(ItemOutcome::applied(variant.clone(), date, changed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_floors_or_fails() {
        let floor = BulkAction::Adjust {
            delta: -10,
            floor_at_zero: true,
        };
        assert_eq!(new_quantity(4, &floor).unwrap(), 0);

        let strict = BulkAction::Adjust {
            delta: -10,
            floor_at_zero: false,
        };
        assert!(new_quantity(4, &strict).is_err());
        assert_eq!(new_quantity(14, &strict).unwrap(), 4);
    }

    #[test]
    fn test_adjust_overflow_fails_instead_of_flooring() {
        let huge = BulkAction::Adjust {
            delta: i64::MAX,
            floor_at_zero: true,
        };
        let err = new_quantity(10, &huge).unwrap_err();
        assert!(err.to_string().contains("overflows"));

        // Past u32 but inside i64 is still rejected
        let large = BulkAction::Adjust {
            delta: i64::from(u32::MAX),
            floor_at_zero: true,
        };
        assert!(new_quantity(10, &large).is_err());

        let lowest = BulkAction::Adjust {
            delta: i64::MIN,
            floor_at_zero: true,
        };
        assert_eq!(new_quantity(10, &lowest).unwrap(), 0);
    }

    #[test]
    fn test_set_replaces() {
        assert_eq!(new_quantity(4, &BulkAction::Set { quantity: 9 }).unwrap(), 9);
    }

    #[test]
    fn test_plan_dedups_and_sorts_dates() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 7, day).unwrap();
        let options = BulkUpdateOptions::new(
            OrgId::new("acme").unwrap(),
            VariantId::new("dbl").unwrap(),
            vec![d(3), d(1), d(3)],
            BulkAction::Open,
        );
        let plan = BulkUpdatePlan::new(options).build_plan().unwrap();
        let dates: Vec<_> = plan.actions.iter().map(|a| a.target().1).collect();
        assert_eq!(dates, vec![d(1), d(3)]);
    }

    #[test]
    fn test_long_notes_rejected() {
        let options = BulkUpdateOptions::new(
            OrgId::new("acme").unwrap(),
            VariantId::new("dbl").unwrap(),
            vec![NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()],
            BulkAction::Annotate {
                notes: "x".repeat(1001),
            },
        );
        assert!(BulkUpdatePlan::new(options).build_plan().is_err());
    }

    #[test]
    fn test_action_yaml() {
        let action: BulkAction = serde_yaml::from_str("action: adjust\ndelta: -3\n").unwrap();
        assert_eq!(
            action,
            BulkAction::Adjust {
                delta: -3,
                floor_at_zero: true
            }
        );
        assert_eq!(action.to_string(), "adjust -3");
    }
}

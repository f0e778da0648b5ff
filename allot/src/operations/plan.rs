//! Plan types for bulk operations.
//!
//! A plan lists the per-date work a bulk call will do without touching the
//! database, so it can be inspected, previewed or executed.

use chrono::NaiveDate;

use crate::bucket::BucketSpec;
use crate::ids::{OrgId, SupplierId, VariantId};

use super::bulk_update::BulkAction;

/// A single unit of work; each one resolves to one
/// [`ItemOutcome`](super::ItemOutcome).
#[derive(Debug, Clone, PartialEq)]
pub enum PlanAction {
    /// Insert a bucket; an existing bucket on the same scope is skipped.
    CreateBucket(BucketSpec),

    /// Apply an edit to the buckets covering one date.
    MutateDate {
        /// Owning tenant.
        org: OrgId,
        /// Variant whose buckets are edited.
        variant: VariantId,
        /// Restricts the edit to one supplier's buckets.
        supplier: Option<SupplierId>,
        /// Date to edit.
        date: NaiveDate,
        /// The edit.
        action: BulkAction,
    },
}

impl PlanAction {
    /// Returns a human-readable description of this action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateBucket(spec) => {
                let base = format!(
                    "Create {} bucket for {} on {}",
                    spec.allocation_type, spec.variant, spec.scope
                );
                match spec.quantity {
                    Some(q) => format!("{base} ({q})"),
                    None => base,
                }
            }
            Self::MutateDate {
                variant,
                date,
                action,
                ..
            } => format!("{action} {variant} on {date}"),
        }
    }

    /// Variant and date the action reports under.
    #[must_use]
    pub fn target(&self) -> (&VariantId, NaiveDate) {
        match self {
            Self::CreateBucket(spec) => (&spec.variant, spec.scope.start_date()),
            Self::MutateDate { variant, date, .. } => (variant, *date),
        }
    }
}

/// A complete operation plan describing all actions to be taken.
#[derive(Debug, Clone)]
pub struct OperationPlan {
    /// A human-readable description of the operation.
    pub description: String,

    /// The sequence of actions to perform.
    pub actions: Vec<PlanAction>,

    /// Warnings to communicate to the user.
    pub warnings: Vec<String>,
}

impl OperationPlan {
    /// Creates a new operation plan with the given description.
    ///
    /// # Examples
    ///
    /// ```
    /// use allot::operations::OperationPlan;
    ///
    /// let plan = OperationPlan::new("Close July");
    /// assert_eq!(plan.description, "Close July");
    /// assert!(plan.is_empty());
    /// ```
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            actions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an action to the plan.
    #[must_use]
    pub fn add_action(mut self, action: PlanAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Adds a warning to the plan.
    ///
    /// # Examples
    ///
    /// ```
    /// use allot::operations::OperationPlan;
    ///
    /// let plan = OperationPlan::new("Test").add_warning("range is empty");
    /// assert_eq!(plan.warnings.len(), 1);
    /// ```
    #[must_use]
    pub fn add_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Checks if the plan has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the number of actions in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

//! Per-item results of bulk operations.
//!
//! Every unit of work in a bulk call ends in exactly one [`ItemStatus`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{BucketId, VariantId};

/// Why an item was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A bucket already exists for the scope.
    DuplicateScope,
    /// No bucket covers the date.
    NoBucket,
    /// Quantity edit on an unconstrained bucket.
    Unconstrained,
    /// The bucket or its counter authority was already changed by this call.
    AlreadyMutated,
    /// The call was cancelled before the item's batch ran.
    Cancelled,
}

impl SkipReason {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateScope => "duplicate_scope",
            Self::NoBucket => "no_bucket",
            Self::Unconstrained => "unconstrained",
            Self::AlreadyMutated => "already_mutated",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ItemStatus {
    /// The change was made.
    Applied,
    /// Nothing was changed.
    Skipped(SkipReason),
    /// The item failed and was rolled back on its own.
    Failed(String),
}

impl ItemStatus {
    /// Lower-case label without the reason.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    /// The skip or failure reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Applied => None,
            Self::Skipped(reason) => Some(reason.to_string()),
            Self::Failed(message) => Some(message.clone()),
        }
    }
}

/// Result for one date of a bulk call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// Variant the item belongs to.
    pub variant: VariantId,
    /// Date the item covers (the start date for ranges).
    pub date: NaiveDate,
    /// Buckets created or changed.
    pub buckets: Vec<BucketId>,
    /// What happened.
    pub status: ItemStatus,
}

impl ItemOutcome {
    /// Outcome that touched the given buckets.
    #[must_use]
    pub fn applied(variant: VariantId, date: NaiveDate, buckets: Vec<BucketId>) -> Self {
        Self {
            variant,
            date,
            buckets,
            status: ItemStatus::Applied,
        }
    }

    /// Outcome that changed nothing.
    #[must_use]
    pub fn skipped(variant: VariantId, date: NaiveDate, reason: SkipReason) -> Self {
        Self {
            variant,
            date,
            buckets: Vec::new(),
            status: ItemStatus::Skipped(reason),
        }
    }

    /// Outcome for a rolled-back item.
    #[must_use]
    pub fn failed(variant: VariantId, date: NaiveDate, message: impl Into<String>) -> Self {
        Self {
            variant,
            date,
            buckets: Vec::new(),
            status: ItemStatus::Failed(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ItemStatus::Skipped(SkipReason::NoBucket)).unwrap();
        assert_eq!(json, r#"{"status":"skipped","reason":"no_bucket"}"#);

        let json = serde_json::to_string(&ItemStatus::Applied).unwrap();
        assert_eq!(json, r#"{"status":"applied"}"#);
    }

    #[test]
    fn test_reason_text() {
        assert_eq!(ItemStatus::Applied.reason(), None);
        assert_eq!(
            ItemStatus::Skipped(SkipReason::Cancelled).reason().as_deref(),
            Some("cancelled")
        );
        assert_eq!(ItemStatus::Failed("boom".into()).label(), "failed");
    }
}

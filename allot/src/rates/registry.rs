//! Rate resolution: which plan sells a date and which plans cost it.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::{Error, Result};
use crate::ids::{OrgId, VariantId};

use super::plan::{RatePlan, RatePlanSpec};

/// A YAML document holding several rate plans.
///
/// # Examples
///
/// ```
/// use allot::rates::RatePlanDocument;
///
/// let yaml = r"
/// plans:
///   - variant: dbl
///     kind: { type: master }
///     currency: EUR
///     validity: { start: 2025-01-01, end: 2025-12-31 }
///     inventory_model: freesale
///     preferred: true
///     occupancies:
///       - { min_occupancy: 1, max_occupancy: 2, pricing_model: fixed, base_amount: '120' }
/// ";
/// let doc = RatePlanDocument::from_yaml(yaml).unwrap();
/// assert_eq!(doc.plans.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatePlanDocument {
    /// Plans in file order.
    pub plans: Vec<RatePlanSpec>,
}

impl RatePlanDocument {
    /// Parses and validates every plan in the document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the YAML is malformed, or the first
    /// plan validation failure.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let doc: Self = serde_yaml::from_str(yaml)?;
        for plan in &doc.plans {
            plan.validate()?;
        }
        Ok(doc)
    }
}

/// Picks the master rate valid on `date`.
///
/// Highest priority wins, then the most recently created plan, then the
/// highest id.
#[must_use]
pub fn select_master<I>(plans: I, date: NaiveDate) -> Option<RatePlan>
where
    I: IntoIterator<Item = RatePlan>,
{
    plans
        .into_iter()
        .filter(|p| p.is_master() && p.spec.preferred && p.is_valid_on(date))
        .max_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        })
}

/// Supplier plans valid on `date`, best first: priority descending, then
/// cheapest base amount, then id.
#[must_use]
pub fn order_supplier_rates<I>(plans: I, date: NaiveDate) -> Vec<RatePlan>
where
    I: IntoIterator<Item = RatePlan>,
{
    let mut valid: Vec<RatePlan> = plans
        .into_iter()
        .filter(|p| !p.is_master() && p.is_valid_on(date))
        .collect();
    valid.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.cheapest_base().cmp(&b.cheapest_base()))
            .then(a.id.cmp(&b.id))
    });
    valid
}

/// Registry operations over the rate plan tables.
pub struct RateRegistry;

impl RateRegistry {
    /// Validates and stores a plan.
    ///
    /// # Errors
    ///
    /// See [`Database::insert_rate_plan`].
    pub fn register(db: &mut Database, org: &OrgId, spec: &RatePlanSpec) -> Result<RatePlan> {
        db.insert_rate_plan(org, spec)
    }

    /// Stores every plan of a document in one transaction.
    ///
    /// Either every plan is stored or none is.
    ///
    /// # Errors
    ///
    /// Returns the first validation or write failure.
    pub fn register_document(
        db: &mut Database,
        org: &OrgId,
        doc: &RatePlanDocument,
    ) -> Result<Vec<RatePlan>> {
        for plan in &doc.plans {
            plan.validate()?;
        }
        let tx = db.immediate_transaction()?;
        let stored = doc
            .plans
            .iter()
            .map(|plan| Database::store_rate_plan(&tx, org, plan))
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;
        Ok(stored)
    }

    /// The master rate selling `variant` on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no master plan is valid on `date`.
    pub fn resolve_master_rate(
        conn: &Connection,
        org: &OrgId,
        variant: &VariantId,
        date: NaiveDate,
    ) -> Result<RatePlan> {
        let plans = Database::rate_plans_on(conn, org, variant, date)?;
        select_master(plans, date).ok_or_else(|| Error::NotFound {
            resource: format!("master rate for {variant} on {date}"),
        })
    }

    /// Supplier rates costing `variant` on `date`, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if the plans cannot be loaded.
    pub fn resolve_supplier_rates(
        conn: &Connection,
        org: &OrgId,
        variant: &VariantId,
        date: NaiveDate,
    ) -> Result<Vec<RatePlan>> {
        let plans = Database::rate_plans_on(conn, org, variant, date)?;
        Ok(order_supplier_rates(plans, date))
    }
}

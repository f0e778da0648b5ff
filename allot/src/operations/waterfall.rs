//! Supplier selection for a booking request.
//!
//! The master rate fixes the sell price. Supplier rates are then tried in
//! waterfall order and their buckets are held until the demand is covered.
//! Everything happens in one `IMMEDIATE` transaction: either the whole
//! demand is held or nothing is.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::bucket::Availability;
use crate::database::Database;
use crate::error::{Error, Result, ValidationError};
use crate::ids::{BucketId, OrgId, RatePlanId, ReservationId, SupplierId, VariantId};
use crate::money::Currency;
use crate::rates::{price_for_occupancy, RateKind, RatePlan, RateRegistry};

/// A booking request to fulfil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequest {
    /// Owning tenant.
    pub org: OrgId,
    /// Variant being sold.
    pub variant: VariantId,
    /// Service date.
    pub date: NaiveDate,
    /// Occupancy used for pricing.
    pub pax: u32,
    /// Units wanted.
    pub demand: u32,
}

/// Units held from one supplier bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierAllocation {
    /// Supplier the units come from.
    pub supplier_id: SupplierId,
    /// Rate plan that priced them.
    pub rate_plan: RatePlanId,
    /// Bucket the hold was taken on.
    pub bucket: BucketId,
    /// The hold.
    pub reservation: ReservationId,
    /// Units held.
    pub quantity: u32,
    /// Supplier cost per unit at the requested occupancy.
    pub unit_cost: Decimal,
    /// `(sell_price - unit_cost) * quantity`.
    pub margin: Decimal,
}

/// Outcome of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionResult {
    /// Holds created, in waterfall order.
    pub reservation_ids: Vec<ReservationId>,
    /// Per-bucket breakdown, in waterfall order.
    pub supplier_breakdown: Vec<SupplierAllocation>,
    /// Master price per unit at the requested occupancy.
    pub sell_price: Decimal,
    /// Currency of every amount.
    pub currency: Currency,
    /// Sum of the breakdown margins.
    pub total_margin: Decimal,
}

impl SelectionResult {
    /// Units held in total.
    #[must_use]
    pub fn reserved(&self) -> u32 {
        self.supplier_breakdown.iter().map(|a| a.quantity).sum()
    }
}

/// A supplier rate that survived filtering, with its price.
#[derive(Debug, Clone)]
struct Candidate {
    supplier_id: SupplierId,
    plan: RatePlan,
    unit_cost: Decimal,
}

enum Attempt {
    Selected(SelectionResult),
    ReserveFailed(Error),
}

/// Filters and orders supplier rates for a request.
///
/// Rates in another currency than the master, or without a band or season
/// admitting `pax`, are dropped with a warning. Each supplier keeps its
/// first surviving rate. The result is ordered by priority descending,
/// price ascending and supplier id ascending.
fn rank_candidates(
    rates: Vec<RatePlan>,
    currency: &Currency,
    date: NaiveDate,
    pax: u32,
) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for plan in rates {
        let RateKind::Supplier { supplier_id, .. } = plan.spec.kind else {
            continue;
        };
        if seen.contains(&supplier_id) {
            continue;
        }
        if plan.spec.currency != *currency {
            log::warn!(
                "skipping {} of {supplier_id}: priced in {}, master sells in {currency}",
                plan.id,
                plan.spec.currency
            );
            continue;
        }
        if !plan.admits_pax(date, pax) {
            log::warn!("skipping {} of {supplier_id}: season excludes {pax} pax", plan.id);
            continue;
        }
        let unit_cost = match price_for_occupancy(&plan.spec, pax) {
            Ok(cost) => cost,
            Err(e) => {
                log::warn!("skipping {} of {supplier_id}: {e}", plan.id);
                continue;
            }
        };
        seen.insert(supplier_id);
        candidates.push(Candidate {
            supplier_id,
            plan,
            unit_cost,
        });
    }

    candidates.sort_by(|a, b| {
        b.plan
            .priority
            .cmp(&a.plan.priority)
            .then(a.unit_cost.cmp(&b.unit_cost))
            .then(a.supplier_id.cmp(&b.supplier_id))
    });
    candidates
}

/// Waterfall supplier selection.
///
/// # Examples
///
/// ```no_run
/// use allot::operations::{SelectionRequest, SupplierSelector};
/// use allot::{Database, DatabaseConfig, OrgId, VariantId};
/// use chrono::NaiveDate;
///
/// let mut db = Database::open(DatabaseConfig::new("/tmp/allot.db")).unwrap();
/// let request = SelectionRequest {
///     org: OrgId::new("acme").unwrap(),
///     variant: VariantId::new("dbl").unwrap(),
///     date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
///     pax: 2,
///     demand: 3,
/// };
/// let result = SupplierSelector::select(&mut db, &request).unwrap();
/// println!("margin {} {}", result.total_margin, result.currency);
/// ```
pub struct SupplierSelector;

impl SupplierSelector {
    /// Holds `demand` units across suppliers.
    ///
    /// A failure while taking a hold rolls back every hold of the attempt
    /// and the selection is run once more from scratch.
    ///
    /// # Errors
    ///
    /// - [`Error::NoMasterRate`] if no master rate sells the date
    /// - [`Error::NoMatchingOccupancyBand`] if the master rate cannot price `pax`
    /// - [`Error::InsufficientSupplierInventory`] if suppliers cannot cover the demand
    /// - [`Error::RetryExhausted`] if both attempts failed to take their holds
    pub fn select(db: &mut Database, request: &SelectionRequest) -> Result<SelectionResult> {
        if request.pax == 0 {
            return Err(ValidationError::new("pax", "must be at least 1").into());
        }
        if request.demand == 0 {
            return Err(ValidationError::new("demand", "must be at least 1").into());
        }

        for attempt in 1..=2 {
            match Self::attempt(db, request) {
                Ok(Attempt::Selected(result)) => return Ok(result),
                Ok(Attempt::ReserveFailed(e)) => {
                    log::warn!("selection attempt {attempt} for {} failed: {e}", request.variant);
                }
                Err(e) if e.is_retryable() => {
                    log::warn!("selection attempt {attempt} for {} hit contention: {e}", request.variant);
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::RetryExhausted {
            operation: format!("supplier selection for {} on {}", request.variant, request.date),
        })
    }

    fn attempt(db: &mut Database, request: &SelectionRequest) -> Result<Attempt> {
        let SelectionRequest {
            org,
            variant,
            date,
            pax,
            demand,
        } = request;
        let tx = db.immediate_transaction()?;

        let master = match RateRegistry::resolve_master_rate(&tx, org, variant, *date) {
            Ok(plan) => plan,
            Err(Error::NotFound { .. }) => {
                return Err(Error::NoMasterRate {
                    variant: variant.clone(),
                    date: *date,
                });
            }
            Err(e) => return Err(e),
        };
        let sell_price = price_for_occupancy(&master.spec, *pax)?;
        let currency = master.spec.currency;

        let rates = RateRegistry::resolve_supplier_rates(&tx, org, variant, *date)?;
        let candidates = rank_candidates(rates, &currency, *date, *pax);
        log::debug!(
            "{} candidate supplier(s) for {variant} on {date}, sell price {sell_price} {currency}",
            candidates.len()
        );

        let now = Utc::now();
        let mut remaining = *demand;
        let mut breakdown = Vec::new();

        'suppliers: for candidate in &candidates {
            let buckets =
                Database::buckets_on_date(&tx, org, variant, Some(candidate.supplier_id), *date)?;
            for bucket in buckets {
                if remaining == 0 {
                    break 'suppliers;
                }
                let (counters, _) = Database::authority_counters(&tx, &bucket)?;
                let take = match bucket.automated_available_from(&counters) {
                    Availability::Unbounded => remaining,
                    Availability::Limited(n) => n.min(remaining),
                };
                if take == 0 {
                    continue;
                }

                let reservation = match Database::reserve_in(&tx, org, bucket.id, take, true, now) {
                    Ok(r) => r,
                    Err(e) => return Ok(Attempt::ReserveFailed(e)),
                };
                remaining -= take;
                breakdown.push(SupplierAllocation {
                    supplier_id: candidate.supplier_id,
                    rate_plan: candidate.plan.id,
                    bucket: bucket.id,
                    reservation: reservation.id,
                    quantity: take,
                    unit_cost: candidate.unit_cost,
                    margin: (sell_price - candidate.unit_cost) * Decimal::from(take),
                });
            }
        }

        if remaining > 0 {
            // dropping the transaction rolls back the holds taken so far
            return Err(Error::InsufficientSupplierInventory {
                requested: *demand,
                reserved: demand - remaining,
                shortfall: remaining,
            });
        }
        tx.commit()?;

        let total_margin: Decimal = breakdown.iter().map(|a| a.margin).sum();
        log::info!(
            "held {demand} x {variant} on {date} across {} bucket(s), margin {total_margin} {currency}",
            breakdown.len()
        );
        Ok(Attempt::Selected(SelectionResult {
            reservation_ids: breakdown.iter().map(|a| a.reservation).collect(),
            supplier_breakdown: breakdown,
            sell_price,
            currency,
            total_margin,
        }))
    }
}

//! Allocation buckets, shared pools and the counter arithmetic behind them.
//!
//! A bucket is the atomic inventory record for one (variant, supplier, time
//! scope). Its counters may live on the bucket itself or on an
//! [`InventoryPool`] it is attached to; whichever holds them is the bucket's
//! counter authority. All availability maths goes through [`Counters`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{BucketId, OrgId, PoolId, SupplierId, VariantId};
use crate::money::Currency;
use crate::scope::TimeScope;

#[cfg(test)]
mod proptests;

/// How a bucket's inventory is committed by its supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllocationType {
    /// A fixed allotment with a numeric quantity.
    #[default]
    Committed,
    /// Unconstrained; sold without counting down a quantity.
    Freesale,
    /// Confirmed manually by the supplier; never sold automatically.
    OnRequest,
}

impl AllocationType {
    /// Column value used in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::Freesale => "freesale",
            Self::OnRequest => "on_request",
        }
    }
}

impl fmt::Display for AllocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "committed" => Ok(Self::Committed),
            "freesale" => Ok(Self::Freesale),
            "on_request" => Ok(Self::OnRequest),
            other => Err(ValidationError::new(
                "allocation_type",
                format!("unknown allocation type '{other}'"),
            )),
        }
    }
}

/// Units left for sale on a counter authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// A finite number of units.
    Limited(u32),
    /// No quantity constraint applies.
    Unbounded,
}

impl Availability {
    /// Whether at least `qty` units can be taken.
    #[must_use]
    pub const fn covers(self, qty: u32) -> bool {
        match self {
            Self::Limited(n) => n >= qty,
            Self::Unbounded => true,
        }
    }

    /// The finite count, `None` when unbounded.
    #[must_use]
    pub const fn limited(self) -> Option<u32> {
        match self {
            Self::Limited(n) => Some(n),
            Self::Unbounded => None,
        }
    }

    /// Whether nothing is left.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Limited(0))
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Sellability ladder derived from counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sellability {
    /// Plenty left.
    Open,
    /// Strictly below the low-availability threshold.
    Low,
    /// Nothing left.
    SoldOut,
    /// Stop-sell or blackout in force.
    Closed,
}

impl Sellability {
    /// Classifies availability against total inventory.
    ///
    /// `threshold_percent` is compared strictly: a day at exactly the
    /// threshold is still open.
    ///
    /// # Examples
    ///
    /// ```
    /// use allot::{Availability, Sellability};
    ///
    /// let at = |n| Sellability::classify(Availability::Limited(n), 50, false, 10.0);
    /// assert_eq!(at(0), Sellability::SoldOut);
    /// assert_eq!(at(5), Sellability::Open);
    /// assert_eq!(at(4), Sellability::Low);
    /// ```
    #[must_use]
    pub fn classify(
        available: Availability,
        inventory: u32,
        closed: bool,
        threshold_percent: f64,
    ) -> Self {
        if closed {
            return Self::Closed;
        }
        match available {
            Availability::Unbounded => Self::Open,
            Availability::Limited(0) => Self::SoldOut,
            Availability::Limited(n) => {
                if inventory > 0
                    && f64::from(n) / f64::from(inventory) * 100.0 < threshold_percent
                {
                    Self::Low
                } else {
                    Self::Open
                }
            }
        }
    }

    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Low => "low",
            Self::SoldOut => "sold_out",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Sellability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The counter fields shared by buckets and pools.
///
/// # Examples
///
/// ```
/// use allot::{Availability, Counters};
///
/// let counters = Counters {
///     quantity: Some(100),
///     booked: 40,
///     held: 0,
///     allow_overbooking: true,
///     overbooking_limit: 10,
/// };
/// assert_eq!(counters.available(), Availability::Limited(70));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counters {
    /// Contracted quantity; `None` means unconstrained.
    pub quantity: Option<u32>,
    /// Confirmed units.
    pub booked: u32,
    /// Provisionally held units.
    pub held: u32,
    /// Whether the overbooking limit applies.
    pub allow_overbooking: bool,
    /// Extra units sellable beyond quantity.
    pub overbooking_limit: u32,
}

impl Counters {
    /// Overbooking headroom in force.
    #[must_use]
    pub const fn allowance(&self) -> u32 {
        if self.allow_overbooking {
            self.overbooking_limit
        } else {
            0
        }
    }

    /// Quantity plus allowance, `None` when unconstrained.
    #[must_use]
    pub fn capacity(&self) -> Option<u64> {
        self.quantity
            .map(|q| u64::from(q) + u64::from(self.allowance()))
    }

    /// Booked plus held.
    #[must_use]
    pub fn committed(&self) -> u64 {
        u64::from(self.booked) + u64::from(self.held)
    }

    /// `quantity - booked - held + allowance`, floored at zero.
    #[must_use]
    pub fn available(&self) -> Availability {
        match self.capacity() {
            None => Availability::Unbounded,
            Some(cap) => {
                let left = cap.saturating_sub(self.committed());
                Availability::Limited(u32::try_from(left).unwrap_or(u32::MAX))
            }
        }
    }

    /// Whether the counters satisfy `booked + held <= quantity + allowance`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.capacity().map_or(true, |cap| self.committed() <= cap)
    }

    /// Whether a quantity change to `quantity` keeps the counters consistent.
    #[must_use]
    pub fn admits_quantity(&self, quantity: u32) -> bool {
        Self {
            quantity: Some(quantity),
            ..*self
        }
        .is_consistent()
    }
}

/// Inclusive `[min, max]` bound, used for stay length and pax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound.
    pub min: u32,
    /// Upper bound.
    pub max: u32,
}

impl Bounds {
    /// Validated bound.
    ///
    /// # Errors
    ///
    /// Returns an error if `min > max`.
    pub fn new(field: &str, min: u32, max: u32) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::new(
                field,
                format!("minimum {min} exceeds maximum {max}"),
            ));
        }
        Ok(Self { min, max })
    }

    /// Whether `value` is inside the bound.
    #[must_use]
    pub const fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Where a bucket's counters live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CounterAuthority {
    /// The bucket's own row.
    Bucket(BucketId),
    /// The shared pool row.
    Pool(PoolId),
}

impl fmt::Display for CounterAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucket(id) => write!(f, "{id}"),
            Self::Pool(id) => write!(f, "{id}"),
        }
    }
}

/// Shared capacity authority referenced by several buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryPool {
    /// Row id.
    pub id: PoolId,
    /// Owning tenant.
    pub org: OrgId,
    /// Display name.
    pub name: String,
    /// Shared counters.
    pub counters: Counters,
    /// Optimistic concurrency guard.
    pub version: i64,
}

/// A stored allocation bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationBucket {
    /// Row id.
    pub id: BucketId,
    /// The bucket's definition.
    pub spec: BucketSpec,
    /// Confirmed units held on the bucket itself.
    pub booked: u32,
    /// Held units on the bucket itself.
    pub held: u32,
    /// Optimistic concurrency guard.
    pub version: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl AllocationBucket {
    /// Whether stop-sell or blackout is set.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.spec.stop_sell || self.spec.blackout
    }

    /// The bucket's own counter fields.
    #[must_use]
    pub const fn own_counters(&self) -> Counters {
        Counters {
            quantity: self.spec.quantity,
            booked: self.booked,
            held: self.held,
            allow_overbooking: self.spec.allow_overbooking,
            overbooking_limit: self.spec.overbooking_limit,
        }
    }

    /// Where this bucket's counters live.
    #[must_use]
    pub const fn authority(&self) -> CounterAuthority {
        match self.spec.pool {
            Some(pool) => CounterAuthority::Pool(pool),
            None => CounterAuthority::Bucket(self.id),
        }
    }

    /// Availability given the authority's counters; closure always wins.
    #[must_use]
    pub fn available_from(&self, authority: &Counters) -> Availability {
        if self.is_closed() {
            Availability::Limited(0)
        } else {
            authority.available()
        }
    }

    /// Availability as seen by automated consumers such as the waterfall;
    /// on-request buckets never offer inventory.
    #[must_use]
    pub fn automated_available_from(&self, authority: &Counters) -> Availability {
        if self.spec.allocation_type == AllocationType::OnRequest {
            Availability::Limited(0)
        } else {
            self.available_from(authority)
        }
    }
}

/// Validated definition of a bucket, the input to bucket creation.
///
/// # Examples
///
/// ```
/// use allot::{BucketSpec, Currency, OrgId, TimeScope, VariantId};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
/// let spec = BucketSpec::builder(
///     OrgId::new("acme").unwrap(),
///     VariantId::new("dbl").unwrap(),
///     TimeScope::date(date),
///     Currency::try_from("EUR").unwrap(),
/// )
/// .quantity(Some(20))
/// .overbooking(2)
/// .build()
/// .unwrap();
///
/// assert_eq!(spec.quantity, Some(20));
/// assert!(spec.allow_overbooking);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSpec {
    /// Owning tenant.
    pub org: OrgId,
    /// Sellable variant.
    pub variant: VariantId,
    /// Supplier, `None` for house inventory.
    pub supplier: Option<SupplierId>,
    /// Time the inventory applies to.
    pub scope: TimeScope,
    /// Contracted quantity; `None` for freesale.
    pub quantity: Option<u32>,
    /// Commitment model.
    pub allocation_type: AllocationType,
    /// Sales stopped.
    pub stop_sell: bool,
    /// Date blacked out.
    pub blackout: bool,
    /// Whether the overbooking limit applies.
    pub allow_overbooking: bool,
    /// Extra sellable units.
    pub overbooking_limit: u32,
    /// Supplier cost per unit.
    pub unit_cost: Decimal,
    /// Currency of `unit_cost`.
    pub currency: Currency,
    /// Hours a hold survives before expiry; zero disables expiry.
    pub release_period_hours: u32,
    /// Stay length bounds in nights.
    pub stay: Option<Bounds>,
    /// Occupancy bounds in pax.
    pub occupancy: Option<Bounds>,
    /// Shared pool holding the counters.
    pub pool: Option<PoolId>,
    /// Free-form annotation.
    pub notes: Option<String>,
    /// Substitute variants, in display order.
    pub alternates: Vec<VariantId>,
}

impl BucketSpec {
    /// Starts a builder with the required fields.
    #[must_use]
    pub fn builder(
        org: OrgId,
        variant: VariantId,
        scope: TimeScope,
        currency: Currency,
    ) -> BucketBuilder {
        BucketBuilder {
            spec: Self {
                org,
                variant,
                supplier: None,
                scope,
                quantity: None,
                allocation_type: AllocationType::Committed,
                stop_sell: false,
                blackout: false,
                allow_overbooking: false,
                overbooking_limit: 0,
                unit_cost: Decimal::ZERO,
                currency,
                release_period_hours: 0,
                stay: None,
                occupancy: None,
                pool: None,
                notes: None,
                alternates: Vec::new(),
            },
        }
    }

    /// Same definition over a different scope.
    #[must_use]
    pub fn with_scope(&self, scope: TimeScope) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    /// Checks the field combinations a stored bucket must satisfy.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.allocation_type, self.quantity, self.pool) {
            (AllocationType::Freesale, Some(_), _) => {
                return Err(ValidationError::new(
                    "quantity",
                    "freesale buckets are unconstrained and take no quantity",
                ));
            }
            (AllocationType::Freesale, None, Some(_)) => {
                return Err(ValidationError::new(
                    "pool",
                    "freesale buckets cannot draw from a pool",
                ));
            }
            (AllocationType::Committed | AllocationType::OnRequest, None, None) => {
                return Err(ValidationError::new(
                    "quantity",
                    "a quantity is required unless the bucket is freesale or pooled",
                ));
            }
            _ => {}
        }
        if self.unit_cost.is_sign_negative() {
            return Err(ValidationError::new("unit_cost", "must not be negative"));
        }
        if !self.allow_overbooking && self.overbooking_limit > 0 {
            return Err(ValidationError::new(
                "overbooking_limit",
                "set without allow_overbooking",
            ));
        }
        if let Some(pax) = self.occupancy {
            if pax.min == 0 {
                return Err(ValidationError::new("occupancy", "minimum pax must be at least 1"));
            }
        }
        if self.alternates.contains(&self.variant) {
            return Err(ValidationError::new(
                "alternates",
                "a variant cannot be its own alternate",
            ));
        }
        if let Some(notes) = &self.notes {
            if notes.len() > 1000 {
                return Err(ValidationError::new("notes", "must be at most 1000 characters"));
            }
        }
        Ok(())
    }
}

/// Builder for [`BucketSpec`].
#[derive(Debug, Clone)]
#[must_use]
pub struct BucketBuilder {
    spec: BucketSpec,
}

impl BucketBuilder {
    /// Sets the supplier.
    pub fn supplier(mut self, supplier: Option<SupplierId>) -> Self {
        self.spec.supplier = supplier;
        self
    }

    /// Sets the quantity; `None` makes the bucket unconstrained.
    pub fn quantity(mut self, quantity: Option<u32>) -> Self {
        self.spec.quantity = quantity;
        self
    }

    /// Sets the allocation type.
    pub fn allocation_type(mut self, allocation_type: AllocationType) -> Self {
        self.spec.allocation_type = allocation_type;
        self
    }

    /// Sets stop-sell.
    pub fn stop_sell(mut self, stop_sell: bool) -> Self {
        self.spec.stop_sell = stop_sell;
        self
    }

    /// Sets blackout.
    pub fn blackout(mut self, blackout: bool) -> Self {
        self.spec.blackout = blackout;
        self
    }

    /// Enables overbooking up to `limit` extra units.
    pub fn overbooking(mut self, limit: u32) -> Self {
        self.spec.allow_overbooking = true;
        self.spec.overbooking_limit = limit;
        self
    }

    /// Sets the unit cost.
    pub fn unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.spec.unit_cost = unit_cost;
        self
    }

    /// Sets the hold release period.
    pub fn release_period_hours(mut self, hours: u32) -> Self {
        self.spec.release_period_hours = hours;
        self
    }

    /// Sets stay bounds in nights.
    pub fn stay(mut self, stay: Option<Bounds>) -> Self {
        self.spec.stay = stay;
        self
    }

    /// Sets occupancy bounds in pax.
    pub fn occupancy(mut self, occupancy: Option<Bounds>) -> Self {
        self.spec.occupancy = occupancy;
        self
    }

    /// Attaches the bucket to a pool.
    pub fn pool(mut self, pool: Option<PoolId>) -> Self {
        self.spec.pool = pool;
        self
    }

    /// Sets the notes.
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.spec.notes = notes;
        self
    }

    /// Sets the ordered alternates.
    pub fn alternates(mut self, alternates: Vec<VariantId>) -> Self {
        self.spec.alternates = alternates;
        self
    }

    /// Validates and returns the spec.
    ///
    /// # Errors
    ///
    /// Returns an error if the combination of fields is invalid.
    pub fn build(self) -> Result<BucketSpec, ValidationError> {
        self.spec.validate()?;
        Ok(self.spec)
    }
}

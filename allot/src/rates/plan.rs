//! Rate plan definitions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bucket::{AllocationType, Bounds};
use crate::error::{Error, Result, ValidationError};
use crate::ids::{OrgId, RatePlanId, SupplierId, VariantId};
use crate::money::Currency;
use crate::scope::{DateRange, WeekdayMask};

/// Selling price definition versus supplier cost definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RateKind {
    /// House selling rate; no supplier or contract.
    Master,
    /// Cost rate negotiated with a supplier.
    Supplier {
        /// The supplier.
        supplier_id: SupplierId,
        /// Contract the rate was taken from.
        #[serde(default)]
        contract_ref: Option<String>,
    },
}

impl RateKind {
    /// The supplier for supplier rates.
    #[must_use]
    pub const fn supplier(&self) -> Option<SupplierId> {
        match self {
            Self::Master => None,
            Self::Supplier { supplier_id, .. } => Some(*supplier_id),
        }
    }
}

/// How an occupancy band turns pax into a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    /// `base_amount` regardless of pax.
    Fixed,
    /// `per_person_amount * pax`.
    PerPerson,
    /// `base_amount + per_person_amount * (pax - min_occupancy)`.
    BasePlusPax,
}

impl PricingModel {
    /// Column value used in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::PerPerson => "per_person",
            Self::BasePlusPax => "base_plus_pax",
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingModel {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "per_person" => Ok(Self::PerPerson),
            "base_plus_pax" => Ok(Self::BasePlusPax),
            other => Err(ValidationError::new(
                "pricing_model",
                format!("unknown pricing model '{other}'"),
            )),
        }
    }
}

/// Pricing rule over an inclusive occupancy range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateOccupancy {
    /// Smallest pax count priced by this band.
    pub min_occupancy: u32,
    /// Largest pax count priced by this band.
    pub max_occupancy: u32,
    /// Pricing formula.
    pub pricing_model: PricingModel,
    /// Fixed component.
    #[serde(default)]
    pub base_amount: Decimal,
    /// Per-person component.
    #[serde(default)]
    pub per_person_amount: Decimal,
}

impl RateOccupancy {
    /// Whether the band prices `pax`.
    #[must_use]
    pub const fn covers(&self, pax: u32) -> bool {
        self.min_occupancy <= pax && pax <= self.max_occupancy
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.min_occupancy == 0 {
            return Err(ValidationError::new(
                "occupancies",
                "minimum occupancy must be at least 1",
            ));
        }
        Bounds::new("occupancies", self.min_occupancy, self.max_occupancy)?;
        if self.base_amount.is_sign_negative() || self.per_person_amount.is_sign_negative() {
            return Err(ValidationError::new(
                "occupancies",
                "amounts must not be negative",
            ));
        }
        Ok(())
    }
}

/// Date sub-window of a plan restricted to some weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateSeason {
    /// Dates covered.
    pub range: DateRange,
    /// Weekdays covered inside the range.
    #[serde(default)]
    pub days: WeekdayMask,
    /// Pax admitted during the season.
    #[serde(default)]
    pub pax: Option<Bounds>,
}

impl RateSeason {
    /// Whether the season applies on `date`.
    #[must_use]
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.range.contains(date) && self.days.includes(date)
    }
}

/// A rate plan as written by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatePlanSpec {
    /// Variant the plan prices.
    pub variant: VariantId,
    /// Master or supplier.
    pub kind: RateKind,
    /// Currency of all amounts.
    pub currency: Currency,
    /// Dates the plan is valid for.
    pub validity: DateRange,
    /// Inventory model the plan sells against.
    #[serde(default)]
    pub inventory_model: AllocationType,
    /// Ranking, higher first; supplier plans default to the supplier's
    /// default priority.
    #[serde(default)]
    pub priority: Option<i32>,
    /// Preferred plan flag.
    #[serde(default)]
    pub preferred: bool,
    /// Optional seasonal restrictions.
    #[serde(default)]
    pub seasons: Vec<RateSeason>,
    /// Occupancy bands.
    pub occupancies: Vec<RateOccupancy>,
}

impl RatePlanSpec {
    /// Checks the plan before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMasterRateConfiguration`] when a master plan is
    /// not preferred freesale, or [`Error::Validation`] for malformed bands
    /// and seasons.
    pub fn validate(&self) -> Result<()> {
        if self.kind == RateKind::Master {
            if !self.preferred {
                return Err(Error::InvalidMasterRateConfiguration {
                    reason: "a master rate must be marked preferred".into(),
                });
            }
            if self.inventory_model != AllocationType::Freesale {
                return Err(Error::InvalidMasterRateConfiguration {
                    reason: format!(
                        "a master rate must use the freesale inventory model, not {}",
                        self.inventory_model
                    ),
                });
            }
        }
        if self.occupancies.is_empty() {
            return Err(ValidationError::new("occupancies", "at least one band is required").into());
        }
        for band in &self.occupancies {
            band.validate()?;
        }
        for season in &self.seasons {
            if season.days.bits() == 0 {
                return Err(ValidationError::new("seasons", "weekday mask is empty").into());
            }
            if let Some(pax) = season.pax {
                Bounds::new("seasons", pax.min, pax.max)?;
                if pax.min == 0 {
                    return Err(
                        ValidationError::new("seasons", "minimum pax must be at least 1").into(),
                    );
                }
            }
        }
        if let RateKind::Supplier {
            contract_ref: Some(contract),
            ..
        } = &self.kind
        {
            if contract.trim().is_empty() {
                return Err(ValidationError::new("contract_ref", "must not be blank").into());
            }
        }
        Ok(())
    }
}

/// A stored rate plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePlan {
    /// Row id.
    pub id: RatePlanId,
    /// Owning tenant.
    pub org: OrgId,
    /// Resolved ranking.
    pub priority: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// The plan as written.
    pub spec: RatePlanSpec,
}

impl RatePlan {
    /// Whether the plan prices `date`.
    ///
    /// A plan with seasons is only valid on dates some season covers.
    #[must_use]
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.spec.validity.contains(date)
            && (self.spec.seasons.is_empty()
                || self.spec.seasons.iter().any(|s| s.applies_on(date)))
    }

    /// Whether the seasons applying on `date` admit `pax`.
    #[must_use]
    pub fn admits_pax(&self, date: NaiveDate, pax: u32) -> bool {
        self.spec
            .seasons
            .iter()
            .filter(|s| s.applies_on(date))
            .all(|s| s.pax.map_or(true, |b| b.contains(pax)))
    }

    /// Whether this is the master (selling) kind.
    #[must_use]
    pub fn is_master(&self) -> bool {
        self.spec.kind == RateKind::Master
    }

    /// Cheapest base amount across bands, used to order supplier rates.
    #[must_use]
    pub fn cheapest_base(&self) -> Decimal {
        self.spec
            .occupancies
            .iter()
            .map(|o| o.base_amount)
            .min()
            .unwrap_or(Decimal::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_spec(kind: RateKind) -> RatePlanSpec {
        RatePlanSpec {
            variant: VariantId::new("dbl").unwrap(),
            kind,
            currency: Currency::try_from("EUR").unwrap(),
            validity: DateRange::new(
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            )
            .unwrap(),
            inventory_model: AllocationType::Freesale,
            priority: None,
            preferred: true,
            seasons: Vec::new(),
            occupancies: vec![RateOccupancy {
                min_occupancy: 1,
                max_occupancy: 2,
                pricing_model: PricingModel::Fixed,
                base_amount: Decimal::new(100, 0),
                per_person_amount: Decimal::ZERO,
            }],
        }
    }

    #[test]
    fn test_master_must_be_preferred_freesale() {
        let mut spec = sample_spec(RateKind::Master);
        assert!(spec.validate().is_ok());

        spec.preferred = false;
        assert!(matches!(
            spec.validate(),
            Err(Error::InvalidMasterRateConfiguration { .. })
        ));

        spec.preferred = true;
        spec.inventory_model = AllocationType::Committed;
        assert!(matches!(
            spec.validate(),
            Err(Error::InvalidMasterRateConfiguration { .. })
        ));
    }

    #[test]
    fn test_supplier_rate_has_no_master_constraint() {
        let mut spec = sample_spec(RateKind::Supplier {
            supplier_id: SupplierId::new(1),
            contract_ref: Some("C-2025".into()),
        });
        spec.preferred = false;
        spec.inventory_model = AllocationType::Committed;
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_band_validation() {
        let mut spec = sample_spec(RateKind::Master);
        spec.occupancies[0].min_occupancy = 3;
        assert!(matches!(spec.validate(), Err(Error::Validation { .. })));

        spec.occupancies[0].min_occupancy = 0;
        assert!(matches!(spec.validate(), Err(Error::Validation { .. })));

        spec.occupancies.clear();
        assert!(matches!(spec.validate(), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_yaml_kind_tagging() {
        let yaml = r"
variant: dbl
kind:
  type: supplier
  supplier_id: 4
  contract_ref: HB-2025
currency: EUR
validity: { start: 2025-01-01, end: 2025-03-31 }
inventory_model: committed
occupancies:
  - { min_occupancy: 1, max_occupancy: 2, pricing_model: fixed, base_amount: '80.00' }
";
        let spec: RatePlanSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.kind.supplier(), Some(SupplierId::new(4)));
        assert_eq!(spec.occupancies[0].base_amount, Decimal::new(8000, 2));
        assert_eq!(spec.priority, None);
    }

    #[test]
    fn test_season_filters_validity() {
        use chrono::Weekday;

        let mut spec = sample_spec(RateKind::Master);
        spec.seasons.push(RateSeason {
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
            )
            .unwrap(),
            days: WeekdayMask::from_days(&[Weekday::Sat, Weekday::Sun]),
            pax: Some(Bounds { min: 2, max: 4 }),
        });
        let plan = RatePlan {
            id: RatePlanId::new(1),
            org: OrgId::new("acme").unwrap(),
            priority: 0,
            created_at: Utc::now(),
            spec,
        };
        // 2025-06-07 is a Saturday, 2025-06-09 a Monday
        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        assert!(plan.is_valid_on(saturday));
        assert!(!plan.is_valid_on(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()));
        assert!(!plan.is_valid_on(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
        assert!(plan.admits_pax(saturday, 2));
        assert!(!plan.admits_pax(saturday, 1));
    }
}

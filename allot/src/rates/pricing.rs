//! Occupancy-based pricing.

use rust_decimal::Decimal;

use crate::error::{Error, Result};

use super::plan::{PricingModel, RateOccupancy, RatePlanSpec};

impl RateOccupancy {
    /// Price of this band for `pax` people.
    ///
    /// The band is not checked to cover `pax`; use [`price_for_occupancy`]
    /// to pick the band first.
    #[must_use]
    pub fn price(&self, pax: u32) -> Decimal {
        match self.pricing_model {
            PricingModel::Fixed => self.base_amount,
            PricingModel::PerPerson => self.per_person_amount * Decimal::from(pax),
            PricingModel::BasePlusPax => {
                let extra = pax.saturating_sub(self.min_occupancy);
                self.base_amount + self.per_person_amount * Decimal::from(extra)
            }
        }
    }
}

/// Prices `pax` people under a plan.
///
/// When bands overlap the band with the lowest minimum occupancy wins, then
/// the one listed first.
///
/// # Errors
///
/// Returns [`Error::NoMatchingOccupancyBand`] if no band covers `pax`.
///
/// # Examples
///
/// ```
/// use allot::rates::{price_for_occupancy, PricingModel, RateOccupancy};
/// # use allot::rates::{RateKind, RatePlanSpec};
/// # use allot::{AllocationType, Currency, DateRange, VariantId};
/// use rust_decimal::Decimal;
/// # let d = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// # let mut plan = RatePlanSpec {
/// #     variant: VariantId::new("dbl").unwrap(),
/// #     kind: RateKind::Master,
/// #     currency: Currency::try_from("EUR").unwrap(),
/// #     validity: DateRange::single(d),
/// #     inventory_model: AllocationType::Freesale,
/// #     priority: None,
/// #     preferred: true,
/// #     seasons: vec![],
/// #     occupancies: vec![],
/// # };
///
/// plan.occupancies = vec![
///     RateOccupancy {
///         min_occupancy: 1,
///         max_occupancy: 1,
///         pricing_model: PricingModel::Fixed,
///         base_amount: Decimal::from(100),
///         per_person_amount: Decimal::ZERO,
///     },
///     RateOccupancy {
///         min_occupancy: 2,
///         max_occupancy: 4,
///         pricing_model: PricingModel::BasePlusPax,
///         base_amount: Decimal::from(120),
///         per_person_amount: Decimal::from(30),
///     },
/// ];
/// assert_eq!(price_for_occupancy(&plan, 3).unwrap(), Decimal::from(150));
/// assert!(price_for_occupancy(&plan, 5).is_err());
/// ```
pub fn price_for_occupancy(plan: &RatePlanSpec, pax: u32) -> Result<Decimal> {
    plan.occupancies
        .iter()
        .filter(|band| band.covers(pax))
        .min_by_key(|band| band.min_occupancy)
        .map(|band| band.price(pax))
        .ok_or(Error::NoMatchingOccupancyBand { pax })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(min: u32, max: u32, model: PricingModel, base: i64, per: i64) -> RateOccupancy {
        RateOccupancy {
            min_occupancy: min,
            max_occupancy: max,
            pricing_model: model,
            base_amount: Decimal::from(base),
            per_person_amount: Decimal::from(per),
        }
    }

    #[test]
    fn test_fixed_ignores_pax() {
        let b = band(1, 4, PricingModel::Fixed, 90, 10);
        assert_eq!(b.price(1), Decimal::from(90));
        assert_eq!(b.price(4), Decimal::from(90));
    }

    #[test]
    fn test_per_person() {
        let b = band(1, 6, PricingModel::PerPerson, 0, 45);
        assert_eq!(b.price(3), Decimal::from(135));
    }

    #[test]
    fn test_base_plus_pax_counts_from_band_minimum() {
        let b = band(2, 4, PricingModel::BasePlusPax, 120, 30);
        assert_eq!(b.price(2), Decimal::from(120));
        assert_eq!(b.price(3), Decimal::from(150));
        assert_eq!(b.price(4), Decimal::from(180));
    }

    #[test]
    fn test_fractional_amounts_keep_precision() {
        let mut b = band(1, 3, PricingModel::PerPerson, 0, 0);
        b.per_person_amount = Decimal::new(3333, 2);
        assert_eq!(b.price(3), Decimal::new(9999, 2));
    }
}

//! Property-based tests for occupancy pricing.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::plan::{PricingModel, RateOccupancy};

fn band(min: u32, max: u32, model: PricingModel, base: i64, per: i64) -> RateOccupancy {
    RateOccupancy {
        min_occupancy: min,
        max_occupancy: max,
        pricing_model: model,
        base_amount: Decimal::new(base, 2),
        per_person_amount: Decimal::new(per, 2),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn fixed_price_is_constant(
        min in 1u32..5,
        span in 0u32..10,
        base in 0i64..100_000,
        pax in 1u32..20,
    ) {
        let b = band(min, min + span, PricingModel::Fixed, base, 999);
        prop_assert_eq!(b.price(pax), Decimal::new(base, 2));
    }

    #[test]
    fn per_person_scales_linearly(per in 0i64..100_000, pax in 1u32..50) {
        let b = band(1, 50, PricingModel::PerPerson, 0, per);
        prop_assert_eq!(b.price(pax), Decimal::new(per, 2) * Decimal::from(pax));
    }

    #[test]
    fn base_plus_pax_never_below_base(
        min in 1u32..5,
        base in 0i64..100_000,
        per in 0i64..10_000,
        pax in 1u32..20,
    ) {
        let b = band(min, 20, PricingModel::BasePlusPax, base, per);
        prop_assert!(b.price(pax) >= Decimal::new(base, 2));
    }

    #[test]
    fn base_plus_pax_is_monotonic(
        base in 0i64..100_000,
        per in 0i64..10_000,
        pax in 1u32..19,
    ) {
        let b = band(1, 20, PricingModel::BasePlusPax, base, per);
        prop_assert!(b.price(pax) <= b.price(pax + 1));
    }
}

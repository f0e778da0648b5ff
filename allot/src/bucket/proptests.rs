//! Property-based tests for counter arithmetic.

use super::{Availability, Counters, Sellability};
use proptest::prelude::*;

fn counters_strategy() -> impl Strategy<Value = Counters> {
    (
        prop::option::of(0u32..10_000),
        0u32..10_000,
        0u32..10_000,
        any::<bool>(),
        0u32..500,
    )
        .prop_map(
            |(quantity, booked, held, allow_overbooking, overbooking_limit)| Counters {
                quantity,
                booked,
                held,
                allow_overbooking,
                overbooking_limit,
            },
        )
}

/// Counters whose committed units never exceed capacity.
fn consistent_counters_strategy() -> impl Strategy<Value = Counters> {
    (
        prop::option::of(0u32..10_000),
        any::<bool>(),
        0u32..500,
    )
        .prop_flat_map(|(quantity, allow_overbooking, overbooking_limit)| {
            let allowance = if allow_overbooking { overbooking_limit } else { 0 };
            let cap = quantity.map_or(10_000, |q| q + allowance);
            (0..=cap).prop_flat_map(move |booked| {
                (0..=cap - booked).prop_map(move |held| Counters {
                    quantity,
                    booked,
                    held,
                    allow_overbooking,
                    overbooking_limit,
                })
            })
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Availability is always the floored capacity minus committed units.
    #[test]
    fn available_matches_formula(c in counters_strategy()) {
        match (c.quantity, c.available()) {
            (None, Availability::Unbounded) => {}
            (Some(q), Availability::Limited(n)) => {
                let expected = (i64::from(q) + i64::from(c.allowance())
                    - i64::from(c.booked) - i64::from(c.held)).max(0);
                prop_assert_eq!(i64::from(n), expected);
            }
            (q, a) => prop_assert!(false, "quantity {:?} gave {:?}", q, a),
        }
    }

    // Taking exactly what is available keeps the counters consistent, and
    // one more unit would not be covered.
    #[test]
    fn taking_available_stays_consistent(c in consistent_counters_strategy(), hold in any::<bool>()) {
        prop_assert!(c.is_consistent());
        if let Availability::Limited(n) = c.available() {
            let mut after = c;
            if hold { after.held += n } else { after.booked += n }
            prop_assert!(after.is_consistent());
            prop_assert!(!c.available().covers(n + 1));
        }
    }

    // Overbooking never reduces availability.
    #[test]
    fn overbooking_is_monotonic(c in counters_strategy()) {
        let without = Counters { allow_overbooking: false, ..c };
        let with = Counters { allow_overbooking: true, ..c };
        match (without.available(), with.available()) {
            (Availability::Limited(a), Availability::Limited(b)) => prop_assert!(b >= a),
            (Availability::Unbounded, Availability::Unbounded) => {}
            other => prop_assert!(false, "mismatched availability {:?}", other),
        }
    }

    // Sold out only ever means zero available.
    #[test]
    fn sold_out_iff_zero(available in 0u32..1000, extra in 0u32..1000, threshold in 0.0f64..100.0) {
        let inventory = available + extra;
        let s = Sellability::classify(Availability::Limited(available), inventory, false, threshold);
        prop_assert_eq!(s == Sellability::SoldOut, available == 0);
        if s == Sellability::Low {
            prop_assert!(available > 0);
        }
    }
}

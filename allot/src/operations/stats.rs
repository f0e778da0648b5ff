//! Summary metrics over generated availability days.

use serde::Serialize;

use crate::bucket::Sellability;

use super::availability::{utilization, AvailabilityDay, DEFAULT_LOW_THRESHOLD_PERCENT};

/// Totals and day counts over a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailabilityStats {
    /// Number of days aggregated.
    pub days: usize,
    /// Sum of per-day inventory.
    pub total_inventory: u64,
    /// Sum of per-day available units.
    pub total_available: u64,
    /// Sum of per-day booked units.
    pub total_booked: u64,
    /// Sum of per-day held units.
    pub total_held: u64,
    /// Window-wide `booked / (booked + available) * 100`.
    pub utilization_percentage: f64,
    /// Open days with nothing left.
    pub sold_out_days: usize,
    /// Open days strictly below the threshold with something left.
    pub low_availability_days: usize,
    /// Days where every bucket is closed.
    pub closed_days: usize,
    /// Days with an unconstrained bucket.
    pub unbounded_days: usize,
}

/// Rolls generator output up into [`AvailabilityStats`].
///
/// # Examples
///
/// ```
/// use allot::operations::StatsAggregator;
///
/// let stats = StatsAggregator::default().aggregate(&[]);
/// assert_eq!(stats.days, 0);
/// assert_eq!(stats.sold_out_days, 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StatsAggregator {
    threshold_percent: f64,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_THRESHOLD_PERCENT)
    }
}

impl StatsAggregator {
    /// Aggregator with a low-availability threshold in percent.
    #[must_use]
    pub const fn new(threshold_percent: f64) -> Self {
        Self { threshold_percent }
    }

    /// Aggregates `days`.
    ///
    /// Days no bucket covers add to `days` but to no other counter.
    #[must_use]
    pub fn aggregate(&self, days: &[AvailabilityDay]) -> AvailabilityStats {
        let mut stats = AvailabilityStats {
            days: days.len(),
            ..AvailabilityStats::default()
        };

        for day in days {
            stats.total_inventory += day.total_inventory;
            stats.total_available += day.total_available;
            stats.total_booked += day.total_booked;
            stats.total_held += day.total_held;
            if day.buckets == 0 {
                continue;
            }
            if day.unbounded {
                stats.unbounded_days += 1;
            }

            let ladder = Sellability::classify(
                day.availability(),
                u32::try_from(day.total_inventory).unwrap_or(u32::MAX),
                day.closed,
                self.threshold_percent,
            );
            match ladder {
                Sellability::Closed => stats.closed_days += 1,
                Sellability::SoldOut => stats.sold_out_days += 1,
                Sellability::Low => stats.low_availability_days += 1,
                Sellability::Open => {}
            }
        }

        stats.utilization_percentage = utilization(stats.total_booked, stats.total_available);
        stats
    }
}

//! Rate plans, occupancy pricing and rate resolution.

mod plan;
mod pricing;
#[cfg(test)]
mod proptests;
mod registry;

pub use plan::{PricingModel, RateKind, RateOccupancy, RatePlan, RatePlanSpec, RateSeason};
pub use pricing::price_for_occupancy;
pub use registry::{order_supplier_rates, select_master, RatePlanDocument, RateRegistry};

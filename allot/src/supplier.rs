//! Registered suppliers.

use serde::{Deserialize, Serialize};

use crate::ids::{OrgId, SupplierId};

/// External provider of inventory.
///
/// `default_priority` seeds the priority of the supplier's rate plans when
/// a plan does not set its own; higher is preferred by the waterfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    /// Row id.
    pub id: SupplierId,
    /// Owning tenant.
    pub org: OrgId,
    /// Display name, unique per tenant.
    pub name: String,
    /// Default ranking, higher first.
    pub default_priority: i32,
}

//! Rate plan persistence.
//!
//! A plan is written together with its seasons and occupancy bands in one
//! transaction and read back as a whole.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::bucket::{AllocationType, Bounds};
use crate::error::{Error, Result};
use crate::ids::{OrgId, RatePlanId, SupplierId, VariantId};
use crate::money::row_decimal;
use crate::rates::{PricingModel, RateKind, RateOccupancy, RatePlan, RatePlanSpec, RateSeason};
use crate::scope::{DateRange, WeekdayMask};

use super::connection::Database;
use super::operations::conversion_error;

const PLAN_COLUMNS: &str = "id, org, variant, supplier_id, contract_ref, currency, \
     valid_from, valid_to, inventory_model, priority, preferred, created_at";

/// Plan row before seasons and bands are attached.
fn row_to_plan(row: &rusqlite::Row<'_>) -> rusqlite::Result<RatePlan> {
    let supplier: Option<SupplierId> = row.get(3)?;
    let kind = match supplier {
        Some(supplier_id) => RateKind::Supplier {
            supplier_id,
            contract_ref: row.get(4)?,
        },
        None => RateKind::Master,
    };
    let validity = DateRange::new(row.get(6)?, row.get(7)?).map_err(|e| conversion_error(6, e))?;
    let model: String = row.get(8)?;
    let inventory_model = model
        .parse::<AllocationType>()
        .map_err(|e| conversion_error(8, e))?;
    let priority: i32 = row.get(9)?;

    Ok(RatePlan {
        id: row.get(0)?,
        org: row.get(1)?,
        priority,
        created_at: row.get(11)?,
        spec: RatePlanSpec {
            variant: row.get(2)?,
            kind,
            currency: row.get(5)?,
            validity,
            inventory_model,
            priority: Some(priority),
            preferred: row.get(10)?,
            seasons: Vec::new(),
            occupancies: Vec::new(),
        },
    })
}

fn load_children(conn: &Connection, plan: &mut RatePlan) -> Result<()> {
    let mut seasons = conn.prepare_cached(
        "SELECT start_date, end_date, dow_mask, min_pax, max_pax
         FROM rate_seasons WHERE rate_plan_id = ?1 ORDER BY id",
    )?;
    plan.spec.seasons = seasons
        .query_map(params![plan.id], |row| {
            let range =
                DateRange::new(row.get(0)?, row.get(1)?).map_err(|e| conversion_error(0, e))?;
            let pax = match (row.get::<_, Option<u32>>(3)?, row.get::<_, Option<u32>>(4)?) {
                (Some(min), Some(max)) => Some(Bounds { min, max }),
                _ => None,
            };
            Ok(RateSeason {
                range,
                days: WeekdayMask::from_bits(row.get(2)?),
                pax,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut bands = conn.prepare_cached(
        "SELECT min_occupancy, max_occupancy, pricing_model, base_amount, per_person_amount
         FROM rate_occupancies WHERE rate_plan_id = ?1 ORDER BY id",
    )?;
    plan.spec.occupancies = bands
        .query_map(params![plan.id], |row| {
            let model: String = row.get(2)?;
            Ok(RateOccupancy {
                min_occupancy: row.get(0)?,
                max_occupancy: row.get(1)?,
                pricing_model: model
                    .parse::<PricingModel>()
                    .map_err(|e| conversion_error(2, e))?,
                base_amount: row_decimal(row, 3)?,
                per_person_amount: row_decimal(row, 4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(())
}

impl Database {
    /// Stores a rate plan with its seasons and bands.
    ///
    /// A supplier plan without an explicit priority takes the supplier's
    /// default priority; a master plan defaults to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMasterRateConfiguration`] or a validation
    /// error if the plan is malformed, and [`Error::NotFound`] if the
    /// supplier is unknown.
    pub fn insert_rate_plan(&mut self, org: &OrgId, spec: &RatePlanSpec) -> Result<RatePlan> {
        spec.validate()?;

        let tx = self.immediate_transaction()?;
        let plan = Self::store_rate_plan(&tx, org, spec)?;
        tx.commit()?;
        Ok(plan)
    }

    /// Writes a validated plan inside the caller's transaction.
    pub(crate) fn store_rate_plan(
        tx: &Connection,
        org: &OrgId,
        spec: &RatePlanSpec,
    ) -> Result<RatePlan> {
        let priority = match &spec.kind {
            RateKind::Master => spec.priority.unwrap_or(0),
            RateKind::Supplier { supplier_id, .. } => {
                let supplier = Self::get_supplier(tx, org, *supplier_id)?.ok_or_else(|| {
                    Error::NotFound {
                        resource: supplier_id.to_string(),
                    }
                })?;
                spec.priority.unwrap_or(supplier.default_priority)
            }
        };
        let contract_ref = match &spec.kind {
            RateKind::Supplier { contract_ref, .. } => contract_ref.as_deref(),
            RateKind::Master => None,
        };
        let now = Utc::now();

        tx.execute(
            "INSERT INTO rate_plans (org, variant, supplier_id, contract_ref, currency,
                valid_from, valid_to, inventory_model, priority, preferred, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                org,
                spec.variant,
                spec.kind.supplier(),
                contract_ref,
                spec.currency,
                spec.validity.start(),
                spec.validity.end(),
                spec.inventory_model.as_str(),
                priority,
                spec.preferred,
                now,
            ],
        )?;
        let id = RatePlanId::new(tx.last_insert_rowid());

        for season in &spec.seasons {
            tx.execute(
                "INSERT INTO rate_seasons (rate_plan_id, start_date, end_date, dow_mask, min_pax, max_pax)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    season.range.start(),
                    season.range.end(),
                    season.days.bits(),
                    season.pax.map(|b| b.min),
                    season.pax.map(|b| b.max),
                ],
            )?;
        }
        for band in &spec.occupancies {
            tx.execute(
                "INSERT INTO rate_occupancies (rate_plan_id, min_occupancy, max_occupancy,
                    pricing_model, base_amount, per_person_amount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    band.min_occupancy,
                    band.max_occupancy,
                    band.pricing_model.as_str(),
                    band.base_amount.to_string(),
                    band.per_person_amount.to_string(),
                ],
            )?;
        }

        log::debug!("stored {id} for {} (priority {priority})", spec.variant);
        Ok(RatePlan {
            id,
            org: org.clone(),
            priority,
            created_at: now,
            spec: RatePlanSpec {
                priority: Some(priority),
                ..spec.clone()
            },
        })
    }

    /// Looks up a rate plan with its seasons and bands.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_rate_plan(conn: &Connection, org: &OrgId, id: RatePlanId) -> Result<Option<RatePlan>> {
        let plan = conn
            .query_row(
                &format!("SELECT {PLAN_COLUMNS} FROM rate_plans WHERE id = ?1 AND org = ?2"),
                params![id, org],
                row_to_plan,
            )
            .optional()?;
        match plan {
            Some(mut plan) => {
                load_children(conn, &mut plan)?;
                Ok(Some(plan))
            }
            None => Ok(None),
        }
    }

    /// Plans of a variant whose validity window contains `date`.
    ///
    /// Season filtering is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn rate_plans_on(
        conn: &Connection,
        org: &OrgId,
        variant: &VariantId,
        date: NaiveDate,
    ) -> Result<Vec<RatePlan>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {PLAN_COLUMNS} FROM rate_plans
             WHERE org = ?1 AND variant = ?2 AND valid_from <= ?3 AND valid_to >= ?3
             ORDER BY id"
        ))?;
        let mut plans = stmt
            .query_map(params![org, variant, date], row_to_plan)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for plan in &mut plans {
            load_children(conn, plan)?;
        }
        Ok(plans)
    }

    /// Every plan of a variant, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_rate_plans(
        conn: &Connection,
        org: &OrgId,
        variant: &VariantId,
    ) -> Result<Vec<RatePlan>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {PLAN_COLUMNS} FROM rate_plans WHERE org = ?1 AND variant = ?2 ORDER BY id"
        ))?;
        let mut plans = stmt
            .query_map(params![org, variant], row_to_plan)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for plan in &mut plans {
            load_children(conn, plan)?;
        }
        Ok(plans)
    }
}

//! Database CRUD operations for suppliers, time slots, pools and buckets.
//!
//! Mutating methods take `&mut self` and run in their own `IMMEDIATE`
//! transaction. Read helpers are associated functions over a `&Connection`
//! so they work equally on a plain connection, a transaction or a savepoint.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::bucket::{
    AllocationBucket, AllocationType, Bounds, BucketSpec, CounterAuthority, Counters,
    InventoryPool,
};
use crate::error::{Error, Result, ValidationError};
use crate::ids::{BucketId, OrgId, PoolId, SlotId, SupplierId, VariantId};
use crate::money::row_decimal;
use crate::scope::{ScopeKind, TimeScope, TimeSlot};
use crate::supplier::Supplier;

use super::connection::Database;
use super::schema::{BUCKET_COLUMNS, POOL_COLUMNS};

/// Wraps a domain conversion failure for a column.
pub(super) fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Whether the error is a UNIQUE constraint violation.
pub(super) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn optional_bounds(
    min: Option<u32>,
    max: Option<u32>,
    field: &str,
    idx: usize,
) -> rusqlite::Result<Option<Bounds>> {
    match (min, max) {
        (Some(min), Some(max)) => Bounds::new(field, min, max)
            .map(Some)
            .map_err(|e| conversion_error(idx, e)),
        (None, None) => Ok(None),
        _ => Err(conversion_error(
            idx,
            ValidationError::new(field, "only one side of the bound is stored"),
        )),
    }
}

/// Deserializes a bucket row selected with [`BUCKET_COLUMNS`].
pub(super) fn row_to_bucket(row: &rusqlite::Row<'_>) -> rusqlite::Result<AllocationBucket> {
    let kind_text: String = row.get(4)?;
    let kind = ScopeKind::parse(&kind_text).ok_or_else(|| {
        conversion_error(4, ValidationError::new("scope_kind", kind_text.clone()))
    })?;
    let start: NaiveDate = row.get(5)?;
    let end: Option<NaiveDate> = row.get(6)?;
    let slot: Option<SlotId> = row.get(7)?;
    let scope = TimeScope::from_columns(kind, start, end, slot).ok_or_else(|| {
        conversion_error(
            4,
            ValidationError::new("scope", format!("inconsistent {kind_text} scope columns")),
        )
    })?;

    let allocation_type: String = row.get(11)?;
    let allocation_type = allocation_type
        .parse::<AllocationType>()
        .map_err(|e| conversion_error(11, e))?;

    let alternates: String = row.get(25)?;
    let alternates: Vec<VariantId> =
        serde_json::from_str(&alternates).map_err(|e| conversion_error(25, e))?;

    let spec = BucketSpec {
        org: row.get(1)?,
        variant: row.get(2)?,
        supplier: row.get(3)?,
        scope,
        quantity: row.get(8)?,
        allocation_type,
        stop_sell: row.get(12)?,
        blackout: row.get(13)?,
        allow_overbooking: row.get(14)?,
        overbooking_limit: row.get(15)?,
        unit_cost: row_decimal(row, 16)?,
        currency: row.get(17)?,
        release_period_hours: row.get(18)?,
        stay: optional_bounds(row.get(19)?, row.get(20)?, "stay", 19)?,
        occupancy: optional_bounds(row.get(21)?, row.get(22)?, "occupancy", 21)?,
        pool: row.get(23)?,
        notes: row.get(24)?,
        alternates,
    };

    Ok(AllocationBucket {
        id: row.get(0)?,
        spec,
        booked: row.get(9)?,
        held: row.get(10)?,
        version: row.get(26)?,
        created_at: row.get(27)?,
    })
}

/// Deserializes a pool row selected with [`POOL_COLUMNS`].
pub(super) fn row_to_pool(row: &rusqlite::Row<'_>) -> rusqlite::Result<InventoryPool> {
    Ok(InventoryPool {
        id: row.get(0)?,
        org: row.get(1)?,
        name: row.get(2)?,
        counters: Counters {
            quantity: Some(row.get(3)?),
            booked: row.get(4)?,
            held: row.get(5)?,
            allow_overbooking: row.get(6)?,
            overbooking_limit: row.get(7)?,
        },
        version: row.get(8)?,
    })
}

fn row_to_supplier(row: &rusqlite::Row<'_>) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: row.get(0)?,
        org: row.get(1)?,
        name: row.get(2)?,
        default_priority: row.get(3)?,
    })
}

fn row_to_slot(row: &rusqlite::Row<'_>) -> rusqlite::Result<TimeSlot> {
    Ok(TimeSlot {
        id: row.get(0)?,
        org: row.get(1)?,
        variant: row.get(2)?,
        name: row.get(3)?,
        start: row.get(4)?,
        end: row.get(5)?,
    })
}

const INSERT_BUCKET: &str = r"
    INSERT INTO allocation_buckets (
        org, variant, supplier_id, scope_kind, start_date, end_date, slot_id,
        quantity, allocation_type, stop_sell, blackout, allow_overbooking,
        overbooking_limit, unit_cost, currency, release_period_hours,
        min_nights, max_nights, min_pax, max_pax, pool_id, notes, alternates, created_at
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
        ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
    )";

impl Database {
    /// Registers a supplier for a tenant.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is blank or already taken.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use allot::database::{Database, DatabaseConfig};
    /// use allot::OrgId;
    ///
    /// let mut db = Database::open(DatabaseConfig::new("/tmp/allot.db")).unwrap();
    /// let org = OrgId::new("acme").unwrap();
    /// let supplier = db.register_supplier(&org, "Hotelbeds", 10).unwrap();
    /// assert_eq!(supplier.default_priority, 10);
    /// ```
    pub fn register_supplier(
        &mut self,
        org: &OrgId,
        name: &str,
        default_priority: i32,
    ) -> Result<Supplier> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "supplier name must not be empty").into());
        }

        let tx = self.immediate_transaction()?;
        let inserted = tx.execute(
            "INSERT INTO suppliers (org, name, default_priority) VALUES (?1, ?2, ?3)",
            params![org, name, default_priority],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(Error::Validation {
                    field: "name".into(),
                    message: format!("supplier '{name}' already exists"),
                });
            }
            Err(e) => return Err(e.into()),
        }
        let id = SupplierId::new(tx.last_insert_rowid());
        tx.commit()?;

        log::debug!("registered {id} '{name}' for {org}");
        Ok(Supplier {
            id,
            org: org.clone(),
            name: name.to_string(),
            default_priority,
        })
    }

    /// Looks up a supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_supplier(conn: &Connection, org: &OrgId, id: SupplierId) -> Result<Option<Supplier>> {
        Ok(conn
            .query_row(
                "SELECT id, org, name, default_priority FROM suppliers WHERE id = ?1 AND org = ?2",
                params![id, org],
                row_to_supplier,
            )
            .optional()?)
    }

    /// Lists a tenant's suppliers by descending default priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_suppliers(conn: &Connection, org: &OrgId) -> Result<Vec<Supplier>> {
        let mut stmt = conn.prepare(
            "SELECT id, org, name, default_priority FROM suppliers
             WHERE org = ?1 ORDER BY default_priority DESC, id",
        )?;
        let rows = stmt.query_map(params![org], row_to_supplier)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Creates a named time slot on a variant.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the window is empty, or the name is
    /// blank or already used on the variant.
    pub fn create_time_slot(
        &mut self,
        org: &OrgId,
        variant: &VariantId,
        name: &str,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<TimeSlot> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "slot name must not be empty").into());
        }
        if end <= start {
            return Err(ValidationError::new(
                "end",
                format!("slot end {end} must be after start {start}"),
            )
            .into());
        }

        let tx = self.immediate_transaction()?;
        match tx.execute(
            "INSERT INTO time_slots (org, variant, name, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![org, variant, name, start, end],
        ) {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(Error::Validation {
                    field: "name".into(),
                    message: format!("slot '{name}' already exists on {variant}"),
                });
            }
            Err(e) => return Err(e.into()),
        }
        let id = SlotId::new(tx.last_insert_rowid());
        tx.commit()?;

        Ok(TimeSlot {
            id,
            org: org.clone(),
            variant: variant.clone(),
            name: name.to_string(),
            start,
            end,
        })
    }

    /// Looks up a time slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_time_slot(conn: &Connection, org: &OrgId, id: SlotId) -> Result<Option<TimeSlot>> {
        Ok(conn
            .query_row(
                "SELECT id, org, variant, name, start_time, end_time
                 FROM time_slots WHERE id = ?1 AND org = ?2",
                params![id, org],
                row_to_slot,
            )
            .optional()?)
    }

    /// Creates a shared inventory pool.
    ///
    /// `overbooking_limit` enables overbooking on the pool when set.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is blank.
    pub fn create_pool(
        &mut self,
        org: &OrgId,
        name: &str,
        quantity: u32,
        overbooking_limit: Option<u32>,
    ) -> Result<InventoryPool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "pool name must not be empty").into());
        }
        let counters = Counters {
            quantity: Some(quantity),
            booked: 0,
            held: 0,
            allow_overbooking: overbooking_limit.is_some(),
            overbooking_limit: overbooking_limit.unwrap_or(0),
        };

        let tx = self.immediate_transaction()?;
        tx.execute(
            "INSERT INTO inventory_pools
             (org, name, quantity, allow_overbooking, overbooking_limit, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                org,
                name,
                quantity,
                counters.allow_overbooking,
                counters.overbooking_limit,
                Utc::now()
            ],
        )?;
        let id = PoolId::new(tx.last_insert_rowid());
        tx.commit()?;

        log::debug!("created {id} '{name}' with quantity {quantity}");
        Ok(InventoryPool {
            id,
            org: org.clone(),
            name: name.to_string(),
            counters,
            version: 0,
        })
    }

    /// Looks up a pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_pool(conn: &Connection, org: &OrgId, id: PoolId) -> Result<Option<InventoryPool>> {
        Ok(conn
            .query_row(
                &format!("SELECT {POOL_COLUMNS} FROM inventory_pools WHERE id = ?1 AND org = ?2"),
                params![id, org],
                row_to_pool,
            )
            .optional()?)
    }

    /// Makes a bucket draw its counters from a pool.
    ///
    /// The bucket must not hold any inventory of its own, since those
    /// counters would be stranded once the pool takes over.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if either row is missing,
    /// [`Error::BucketInUse`] if the bucket has booked or held units, or a
    /// validation error for freesale buckets.
    pub fn attach_to_pool(
        &mut self,
        org: &OrgId,
        bucket: BucketId,
        pool: PoolId,
    ) -> Result<AllocationBucket> {
        let tx = self.immediate_transaction()?;

        let current = Self::get_bucket(&tx, org, bucket)?.ok_or_else(|| Error::NotFound {
            resource: bucket.to_string(),
        })?;
        if Self::get_pool(&tx, org, pool)?.is_none() {
            return Err(Error::NotFound {
                resource: pool.to_string(),
            });
        }
        if current.spec.allocation_type == AllocationType::Freesale {
            return Err(ValidationError::new("pool", "freesale buckets cannot draw from a pool").into());
        }
        if current.booked > 0 || current.held > 0 {
            return Err(Error::BucketInUse {
                bucket,
                booked: current.booked,
                held: current.held,
            });
        }

        let changed = tx.execute(
            "UPDATE allocation_buckets SET pool_id = ?1, version = version + 1
             WHERE id = ?2 AND version = ?3",
            params![pool, bucket, current.version],
        )?;
        if changed == 0 {
            return Err(Error::ConcurrentModification {
                resource: bucket.to_string(),
            });
        }
        let updated = Self::get_bucket(&tx, org, bucket)?.ok_or_else(|| Error::NotFound {
            resource: bucket.to_string(),
        })?;
        tx.commit()?;
        Ok(updated)
    }

    /// Creates a single bucket.
    ///
    /// Range creation goes through bulk create; both share
    /// [`Database::insert_bucket`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateScope`] if a bucket already exists for the
    /// same variant, supplier and scope, or a validation error for bad
    /// references.
    pub fn create_bucket(&mut self, spec: &BucketSpec) -> Result<AllocationBucket> {
        let tx = self.immediate_transaction()?;
        let bucket = Self::insert_bucket(&tx, spec, Utc::now())?;
        tx.commit()?;
        Ok(bucket)
    }

    /// Inserts a bucket on an existing connection or transaction.
    ///
    /// # Errors
    ///
    /// Same as [`Database::create_bucket`].
    pub fn insert_bucket(
        conn: &Connection,
        spec: &BucketSpec,
        now: DateTime<Utc>,
    ) -> Result<AllocationBucket> {
        spec.validate()?;
        Self::check_references(conn, spec)?;

        let alternates = serde_json::to_string(&spec.alternates).map_err(|e| Error::Validation {
            field: "alternates".into(),
            message: e.to_string(),
        })?;

        let inserted = conn.execute(
            INSERT_BUCKET,
            params![
                spec.org,
                spec.variant,
                spec.supplier,
                spec.scope.kind().as_str(),
                spec.scope.start_date(),
                spec.scope.end_date(),
                spec.scope.slot(),
                spec.quantity,
                spec.allocation_type.as_str(),
                spec.stop_sell,
                spec.blackout,
                spec.allow_overbooking,
                spec.overbooking_limit,
                spec.unit_cost.to_string(),
                spec.currency,
                spec.release_period_hours,
                spec.stay.map(|b| b.min),
                spec.stay.map(|b| b.max),
                spec.occupancy.map(|b| b.min),
                spec.occupancy.map(|b| b.max),
                spec.pool,
                spec.notes,
                alternates,
                now,
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(Error::DuplicateScope {
                    details: format!(
                        "{} / {} / {}",
                        spec.variant,
                        spec.supplier
                            .map_or_else(|| "house".to_string(), |s| s.to_string()),
                        spec.scope
                    ),
                });
            }
            Err(e) => return Err(e.into()),
        }

        Ok(AllocationBucket {
            id: BucketId::new(conn.last_insert_rowid()),
            spec: spec.clone(),
            booked: 0,
            held: 0,
            version: 0,
            created_at: now,
        })
    }

    fn check_references(conn: &Connection, spec: &BucketSpec) -> Result<()> {
        if let Some(supplier) = spec.supplier {
            if Self::get_supplier(conn, &spec.org, supplier)?.is_none() {
                return Err(Error::NotFound {
                    resource: supplier.to_string(),
                });
            }
        }
        if let Some(pool) = spec.pool {
            if Self::get_pool(conn, &spec.org, pool)?.is_none() {
                return Err(Error::NotFound {
                    resource: pool.to_string(),
                });
            }
        }
        if let Some(slot) = spec.scope.slot() {
            let found = Self::get_time_slot(conn, &spec.org, slot)?.ok_or_else(|| {
                Error::NotFound {
                    resource: slot.to_string(),
                }
            })?;
            if found.variant != spec.variant {
                return Err(ValidationError::new(
                    "slot",
                    format!("{slot} belongs to {}, not {}", found.variant, spec.variant),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Looks up a bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_bucket(
        conn: &Connection,
        org: &OrgId,
        id: BucketId,
    ) -> Result<Option<AllocationBucket>> {
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {BUCKET_COLUMNS} FROM allocation_buckets WHERE id = ?1 AND org = ?2"
                ),
                params![id, org],
                row_to_bucket,
            )
            .optional()?)
    }

    /// Looks up the bucket for an exact (variant, supplier, scope).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_bucket(
        conn: &Connection,
        org: &OrgId,
        variant: &VariantId,
        supplier: Option<SupplierId>,
        scope: &TimeScope,
    ) -> Result<Option<AllocationBucket>> {
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {BUCKET_COLUMNS} FROM allocation_buckets
                     WHERE org = ?1 AND variant = ?2 AND supplier_id IS ?3
                       AND scope_kind = ?4 AND start_date = ?5
                       AND end_date IS ?6 AND slot_id IS ?7"
                ),
                params![
                    org,
                    variant,
                    supplier,
                    scope.kind().as_str(),
                    scope.start_date(),
                    scope.end_date(),
                    scope.slot()
                ],
                row_to_bucket,
            )
            .optional()?)
    }

    /// Buckets of a variant whose scope covers `date`, in id order.
    ///
    /// With `supplier` set only that supplier's buckets are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn buckets_on_date(
        conn: &Connection,
        org: &OrgId,
        variant: &VariantId,
        supplier: Option<SupplierId>,
        date: NaiveDate,
    ) -> Result<Vec<AllocationBucket>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {BUCKET_COLUMNS} FROM allocation_buckets
             WHERE org = ?1 AND variant = ?2
               AND (?3 IS NULL OR supplier_id = ?3)
               AND start_date <= ?4 AND IFNULL(end_date, start_date) >= ?4
             ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![org, variant, supplier, date], row_to_bucket)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Buckets of a variant overlapping `[from, to]`, in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn buckets_in_window(
        conn: &Connection,
        org: &OrgId,
        variant: &VariantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AllocationBucket>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {BUCKET_COLUMNS} FROM allocation_buckets
             WHERE org = ?1 AND variant = ?2
               AND start_date <= ?4 AND IFNULL(end_date, start_date) >= ?3
             ORDER BY start_date, id"
        ))?;
        let rows = stmt.query_map(params![org, variant, from, to], row_to_bucket)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Counters of a bucket's authority, with the authority's version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the pool row is missing.
    pub fn authority_counters(
        conn: &Connection,
        bucket: &AllocationBucket,
    ) -> Result<(Counters, i64)> {
        match bucket.authority() {
            CounterAuthority::Bucket(_) => Ok((bucket.own_counters(), bucket.version)),
            CounterAuthority::Pool(pool) => {
                let found = Self::get_pool(conn, &bucket.spec.org, pool)?.ok_or_else(|| {
                    Error::NotFound {
                        resource: pool.to_string(),
                    }
                })?;
                Ok((found.counters, found.version))
            }
        }
    }

    /// Deletes a bucket that holds no inventory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketInUse`] if the bucket has booked or held units
    /// or any active reservation references it, and [`Error::NotFound`] if
    /// it does not exist.
    pub fn delete_bucket(&mut self, org: &OrgId, id: BucketId) -> Result<()> {
        let tx = self.immediate_transaction()?;

        let bucket = Self::get_bucket(&tx, org, id)?.ok_or_else(|| Error::NotFound {
            resource: id.to_string(),
        })?;
        let (active_booked, active_held): (u32, u32) = tx.query_row(
            "SELECT
                IFNULL(SUM(CASE WHEN status = 'booked' THEN quantity END), 0),
                IFNULL(SUM(CASE WHEN status = 'held' THEN quantity END), 0)
             FROM reservations WHERE bucket_id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let booked = bucket.booked.max(active_booked);
        let held = bucket.held.max(active_held);
        if booked > 0 || held > 0 {
            return Err(Error::BucketInUse {
                bucket: id,
                booked,
                held,
            });
        }

        tx.execute(
            "DELETE FROM reservations WHERE bucket_id = ?1 AND status = 'released'",
            params![id],
        )?;
        tx.execute("DELETE FROM allocation_buckets WHERE id = ?1", params![id])?;
        tx.commit()?;
        log::debug!("deleted {id}");
        Ok(())
    }

    /// Sets stop-sell, blackout and notes on a bucket.
    ///
    /// `None` leaves a field unchanged. Closure flags never touch counters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the bucket does not exist.
    pub fn update_bucket_flags(
        conn: &Connection,
        id: BucketId,
        stop_sell: Option<bool>,
        blackout: Option<bool>,
        notes: Option<&str>,
    ) -> Result<()> {
        let changed = conn.execute(
            "UPDATE allocation_buckets SET
                stop_sell = IFNULL(?2, stop_sell),
                blackout = IFNULL(?3, blackout),
                notes = IFNULL(?4, notes),
                version = version + 1
             WHERE id = ?1",
            params![id, stop_sell, blackout, notes],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                resource: id.to_string(),
            });
        }
        Ok(())
    }

    /// Replaces the quantity on a counter authority, guarded by version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConcurrentModification`] if the row's version moved.
    pub fn set_authority_quantity(
        conn: &Connection,
        authority: CounterAuthority,
        quantity: u32,
        expected_version: i64,
    ) -> Result<()> {
        let changed = match authority {
            CounterAuthority::Bucket(id) => conn.execute(
                "UPDATE allocation_buckets SET quantity = ?1, version = version + 1
                 WHERE id = ?2 AND version = ?3",
                params![quantity, id, expected_version],
            )?,
            CounterAuthority::Pool(id) => conn.execute(
                "UPDATE inventory_pools SET quantity = ?1, version = version + 1
                 WHERE id = ?2 AND version = ?3",
                params![quantity, id, expected_version],
            )?,
        };
        if changed == 0 {
            return Err(Error::ConcurrentModification {
                resource: authority.to_string(),
            });
        }
        Ok(())
    }
}

//! Counter mutations: reserve, release, confirm and hold expiry.
//!
//! Every counter write is an `UPDATE ... WHERE version = ?` against the
//! bucket's counter authority. Zero affected rows means another writer got
//! there first and surfaces as [`Error::ConcurrentModification`]; the public
//! entry points retry such failures once before giving up with
//! [`Error::RetryExhausted`].

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::bucket::{CounterAuthority, Counters};
use crate::error::{Error, Result, ValidationError};
use crate::ids::{BucketId, OrgId, ReservationId};
use crate::reservation::{hold_expiry, Reservation, ReservationStatus};

use super::connection::Database;
use super::operations::conversion_error;
use super::schema::RESERVATION_COLUMNS;

fn row_to_reservation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reservation> {
    let bucket: BucketId = row.get(2)?;
    let authority = match row.get(3)? {
        Some(pool) => CounterAuthority::Pool(pool),
        None => CounterAuthority::Bucket(bucket),
    };
    let status: String = row.get(5)?;
    Ok(Reservation {
        id: row.get(0)?,
        org: row.get(1)?,
        bucket,
        authority,
        quantity: row.get(4)?,
        status: status.parse().map_err(|e| conversion_error(5, e))?,
        created_at: row.get(6)?,
        expires_at: row.get(7)?,
    })
}

/// Applies signed deltas to an authority's counters, guarded by version.
fn move_counters(
    conn: &Connection,
    authority: CounterAuthority,
    booked_delta: i64,
    held_delta: i64,
    expected_version: i64,
) -> Result<()> {
    let changed = match authority {
        CounterAuthority::Bucket(id) => conn.execute(
            "UPDATE allocation_buckets
             SET booked = booked + ?1, held = held + ?2, version = version + 1
             WHERE id = ?3 AND version = ?4",
            params![booked_delta, held_delta, id, expected_version],
        )?,
        CounterAuthority::Pool(id) => conn.execute(
            "UPDATE inventory_pools
             SET booked = booked + ?1, held = held + ?2, version = version + 1
             WHERE id = ?3 AND version = ?4",
            params![booked_delta, held_delta, id, expected_version],
        )?,
    };
    if changed == 0 {
        return Err(Error::ConcurrentModification {
            resource: authority.to_string(),
        });
    }
    Ok(())
}

impl Database {
    /// Runs `op`, retrying once if it fails with a retryable error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetryExhausted`] if both attempts hit contention, or
    /// the first non-retryable error.
    pub fn retry_once<T>(
        &mut self,
        operation: &str,
        mut op: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<T> {
        match op(self) {
            Err(first) if first.is_retryable() => {
                log::warn!("{operation} hit contention ({first}), retrying once");
                match op(self) {
                    Err(second) if second.is_retryable() => Err(Error::RetryExhausted {
                        operation: operation.to_string(),
                    }),
                    other => other,
                }
            }
            other => other,
        }
    }

    /// Counters and version of an authority.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the row is missing.
    pub fn load_authority(
        conn: &Connection,
        org: &OrgId,
        authority: CounterAuthority,
    ) -> Result<(Counters, i64)> {
        match authority {
            CounterAuthority::Bucket(id) => {
                let bucket = Self::get_bucket(conn, org, id)?.ok_or_else(|| Error::NotFound {
                    resource: id.to_string(),
                })?;
                Ok((bucket.own_counters(), bucket.version))
            }
            CounterAuthority::Pool(id) => {
                let pool = Self::get_pool(conn, org, id)?.ok_or_else(|| Error::NotFound {
                    resource: id.to_string(),
                })?;
                Ok((pool.counters, pool.version))
            }
        }
    }

    /// Reserves `quantity` units from a bucket on an open connection or
    /// transaction. No retry happens here; see [`Database::reserve`].
    ///
    /// # Errors
    ///
    /// - [`Error::Closed`] if the bucket is stop-sold or blacked out
    /// - [`Error::InsufficientInventory`] if the authority cannot cover it
    /// - [`Error::ConcurrentModification`] if the authority changed under us
    pub fn reserve_in(
        conn: &Connection,
        org: &OrgId,
        bucket: BucketId,
        quantity: u32,
        as_hold: bool,
        now: DateTime<Utc>,
    ) -> Result<Reservation> {
        if quantity == 0 {
            return Err(ValidationError::new("quantity", "must be at least 1").into());
        }
        let found = Self::get_bucket(conn, org, bucket)?.ok_or_else(|| Error::NotFound {
            resource: bucket.to_string(),
        })?;
        if found.is_closed() {
            return Err(Error::Closed { bucket });
        }

        let authority = found.authority();
        let (counters, version) = Self::authority_counters(conn, &found)?;
        let available = found.available_from(&counters);
        if !available.covers(quantity) {
            return Err(Error::InsufficientInventory {
                requested: quantity,
                available: available.limited().unwrap_or(u32::MAX),
            });
        }

        let (booked, held) = if as_hold {
            (0, i64::from(quantity))
        } else {
            (i64::from(quantity), 0)
        };
        move_counters(conn, authority, booked, held, version)?;

        let status = if as_hold {
            ReservationStatus::Held
        } else {
            ReservationStatus::Booked
        };
        let expires_at = if as_hold {
            hold_expiry(now, found.spec.release_period_hours)
        } else {
            None
        };
        let pool = match authority {
            CounterAuthority::Pool(pool) => Some(pool),
            CounterAuthority::Bucket(_) => None,
        };
        conn.execute(
            "INSERT INTO reservations (org, bucket_id, pool_id, quantity, status, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![org, bucket, pool, quantity, status.as_str(), now, expires_at],
        )?;

        let reservation = Reservation {
            id: ReservationId::new(conn.last_insert_rowid()),
            org: org.clone(),
            bucket,
            authority,
            quantity,
            status,
            created_at: now,
            expires_at,
        };
        log::debug!(
            "{} {quantity} on {bucket} via {authority} as {}",
            reservation.id,
            reservation.status
        );
        Ok(reservation)
    }

    /// Atomically reserves units from a bucket.
    ///
    /// With `as_hold` the units count against `held` and lapse after the
    /// bucket's release period; otherwise they are booked outright.
    ///
    /// # Errors
    ///
    /// Same as [`Database::reserve_in`], except contention is retried once
    /// and then reported as [`Error::RetryExhausted`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use allot::database::{Database, DatabaseConfig};
    /// use allot::ids::BucketId;
    /// use allot::OrgId;
    ///
    /// let mut db = Database::open(DatabaseConfig::new("/tmp/allot.db")).unwrap();
    /// let org = OrgId::new("acme").unwrap();
    /// let reservation = db.reserve(&org, BucketId::new(1), 2, false).unwrap();
    /// println!("reserved {}", reservation.id);
    /// ```
    pub fn reserve(
        &mut self,
        org: &OrgId,
        bucket: BucketId,
        quantity: u32,
        as_hold: bool,
    ) -> Result<Reservation> {
        self.retry_once("reserve", |db| {
            let tx = db.immediate_transaction()?;
            let reservation = Self::reserve_in(&tx, org, bucket, quantity, as_hold, Utc::now())?;
            tx.commit()?;
            Ok(reservation)
        })
    }

    /// Looks up a reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_reservation(
        conn: &Connection,
        org: &OrgId,
        id: ReservationId,
    ) -> Result<Option<Reservation>> {
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?1 AND org = ?2"
                ),
                params![id, org],
                row_to_reservation,
            )
            .optional()?)
    }

    /// Reservations on a bucket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn reservations_for_bucket(
        conn: &Connection,
        org: &OrgId,
        bucket: BucketId,
    ) -> Result<Vec<Reservation>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             WHERE org = ?1 AND bucket_id = ?2 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![org, bucket], row_to_reservation)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn transition_in(
        conn: &Connection,
        org: &OrgId,
        id: ReservationId,
        to: ReservationStatus,
    ) -> Result<Reservation> {
        let mut reservation =
            Self::get_reservation(conn, org, id)?.ok_or_else(|| Error::NotFound {
                resource: id.to_string(),
            })?;
        if reservation.status != ReservationStatus::Held {
            return Err(Error::InvalidReservationState {
                reservation: id,
                actual: reservation.status.to_string(),
                expected: ReservationStatus::Held.to_string(),
            });
        }

        let qty = i64::from(reservation.quantity);
        let booked = if to == ReservationStatus::Booked { qty } else { 0 };
        let (_, version) = Self::load_authority(conn, org, reservation.authority)?;
        move_counters(conn, reservation.authority, booked, -qty, version)?;

        conn.execute(
            "UPDATE reservations SET status = ?1, expires_at = NULL WHERE id = ?2",
            params![to.as_str(), id],
        )?;
        reservation.status = to;
        reservation.expires_at = None;
        Ok(reservation)
    }

    /// Returns a hold's units to inventory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReservationState`] unless the reservation is
    /// held, and [`Error::NotFound`] if it does not exist.
    pub fn release(&mut self, org: &OrgId, id: ReservationId) -> Result<Reservation> {
        self.retry_once("release", |db| {
            let tx = db.immediate_transaction()?;
            let released = Self::transition_in(&tx, org, id, ReservationStatus::Released)?;
            tx.commit()?;
            log::debug!("released {id}");
            Ok(released)
        })
    }

    /// Turns a hold into a booking.
    ///
    /// # Errors
    ///
    /// Same as [`Database::release`].
    pub fn confirm_hold(&mut self, org: &OrgId, id: ReservationId) -> Result<Reservation> {
        self.retry_once("confirm", |db| {
            let tx = db.immediate_transaction()?;
            let confirmed = Self::transition_in(&tx, org, id, ReservationStatus::Booked)?;
            tx.commit()?;
            log::debug!("confirmed {id}");
            Ok(confirmed)
        })
    }

    /// Holds of a tenant whose expiry is at or before `now`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn due_holds(conn: &Connection, org: &OrgId, now: DateTime<Utc>) -> Result<Vec<Reservation>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             WHERE org = ?1 AND status = 'held'
               AND expires_at IS NOT NULL AND expires_at <= ?2
             ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![org, now], row_to_reservation)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Releases every hold of a tenant whose expiry is at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep cannot complete; no hold is released
    /// in that case.
    pub fn expire_holds(&mut self, org: &OrgId, now: DateTime<Utc>) -> Result<Vec<Reservation>> {
        self.retry_once("expire", |db| {
            let tx = db.immediate_transaction()?;
            let due = Self::due_holds(&tx, org, now)?;

            let mut expired = Vec::with_capacity(due.len());
            for hold in due {
                expired.push(Self::transition_in(&tx, org, hold.id, ReservationStatus::Released)?);
            }
            tx.commit()?;
            if !expired.is_empty() {
                log::info!("expired {} hold(s) for {org}", expired.len());
            }
            Ok(expired)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::AllocationType;
    use crate::database::test_util::{create_test_database, date, org, spec_on};
    use chrono::Duration;

    fn bucket_with(db: &mut Database, quantity: u32) -> BucketId {
        db.create_bucket(&spec_on(date(2025, 7, 1)).quantity(Some(quantity)).build().unwrap())
            .unwrap()
            .id
    }

    #[test]
    fn test_reserve_books_units() {
        let mut db = create_test_database();
        let bucket = bucket_with(&mut db, 10);

        let r = db.reserve(&org(), bucket, 4, false).unwrap();
        assert_eq!(r.status, ReservationStatus::Booked);
        assert!(r.expires_at.is_none());

        let after = Database::get_bucket(db.connection(), &org(), bucket).unwrap().unwrap();
        assert_eq!(after.booked, 4);
        assert_eq!(after.version, 1);
    }

    #[test]
    fn test_reserve_beyond_available_fails() {
        let mut db = create_test_database();
        let bucket = bucket_with(&mut db, 3);
        db.reserve(&org(), bucket, 2, false).unwrap();

        let err = db.reserve(&org(), bucket, 2, false).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientInventory {
                requested: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn test_reserve_closed_bucket_fails() {
        let mut db = create_test_database();
        let bucket = db
            .create_bucket(
                &spec_on(date(2025, 7, 1))
                    .quantity(Some(5))
                    .stop_sell(true)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        assert!(matches!(
            db.reserve(&org(), bucket.id, 1, false),
            Err(Error::Closed { .. })
        ));
    }

    #[test]
    fn test_overbooking_allowance() {
        let mut db = create_test_database();
        let bucket = db
            .create_bucket(
                &spec_on(date(2025, 7, 1))
                    .quantity(Some(100))
                    .overbooking(10)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        db.reserve(&org(), bucket.id, 40, false).unwrap();

        assert!(db.reserve(&org(), bucket.id, 75, false).is_err());
        db.reserve(&org(), bucket.id, 70, false).unwrap();
        assert!(db.reserve(&org(), bucket.id, 1, false).is_err());
    }

    #[test]
    fn test_freesale_never_runs_out() {
        let mut db = create_test_database();
        let bucket = db
            .create_bucket(
                &spec_on(date(2025, 7, 1))
                    .allocation_type(AllocationType::Freesale)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        db.reserve(&org(), bucket.id, 10_000, false).unwrap();
        let after = Database::get_bucket(db.connection(), &org(), bucket.id)
            .unwrap()
            .unwrap();
        assert_eq!(after.booked, 10_000);
    }

    #[test]
    fn test_pooled_buckets_share_counters() {
        let mut db = create_test_database();
        let pool = db.create_pool(&org(), "shared", 5, None).unwrap();
        let a = db
            .create_bucket(&spec_on(date(2025, 7, 1)).pool(Some(pool.id)).build().unwrap())
            .unwrap();
        let b = db
            .create_bucket(&spec_on(date(2025, 7, 2)).pool(Some(pool.id)).build().unwrap())
            .unwrap();

        db.reserve(&org(), a.id, 3, false).unwrap();
        let err = db.reserve(&org(), b.id, 3, false).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientInventory { available: 2, .. }
        ));

        let shared = Database::get_pool(db.connection(), &org(), pool.id).unwrap().unwrap();
        assert_eq!(shared.counters.booked, 3);
        let own = Database::get_bucket(db.connection(), &org(), a.id).unwrap().unwrap();
        assert_eq!(own.booked, 0);
    }

    #[test]
    fn test_hold_release_and_confirm() {
        let mut db = create_test_database();
        let bucket = bucket_with(&mut db, 10);

        let hold = db.reserve(&org(), bucket, 3, true).unwrap();
        assert_eq!(hold.status, ReservationStatus::Held);
        let released = db.release(&org(), hold.id).unwrap();
        assert_eq!(released.status, ReservationStatus::Released);

        let again = db.release(&org(), hold.id).unwrap_err();
        assert!(matches!(again, Error::InvalidReservationState { .. }));

        let hold = db.reserve(&org(), bucket, 2, true).unwrap();
        db.confirm_hold(&org(), hold.id).unwrap();
        let after = Database::get_bucket(db.connection(), &org(), bucket).unwrap().unwrap();
        assert_eq!((after.booked, after.held), (2, 0));
    }

    #[test]
    fn test_release_booking_rejected() {
        let mut db = create_test_database();
        let bucket = bucket_with(&mut db, 10);
        let booking = db.reserve(&org(), bucket, 1, false).unwrap();
        assert!(matches!(
            db.release(&org(), booking.id),
            Err(Error::InvalidReservationState { .. })
        ));
    }

    #[test]
    fn test_expire_holds() {
        let mut db = create_test_database();
        let bucket = db
            .create_bucket(
                &spec_on(date(2025, 7, 1))
                    .quantity(Some(10))
                    .release_period_hours(24)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let hold = db.reserve(&org(), bucket.id, 4, true).unwrap();
        let expires_at = hold.expires_at.unwrap();

        let early = db.expire_holds(&org(), expires_at - Duration::minutes(1)).unwrap();
        assert!(early.is_empty());

        let expired = db.expire_holds(&org(), expires_at).unwrap();
        assert_eq!(expired.len(), 1);
        let after = Database::get_bucket(db.connection(), &org(), bucket.id)
            .unwrap()
            .unwrap();
        assert_eq!(after.held, 0);
    }

    #[test]
    fn test_retry_once_gives_up() {
        let mut db = create_test_database();
        let mut attempts = 0;
        let result: Result<()> = db.retry_once("probe", |_| {
            attempts += 1;
            Err(Error::ConcurrentModification {
                resource: "bucket#1".into(),
            })
        });
        assert_eq!(attempts, 2);
        assert!(matches!(result, Err(Error::RetryExhausted { .. })));
    }

    #[test]
    fn test_retry_once_passes_through_other_errors() {
        let mut db = create_test_database();
        let mut attempts = 0;
        let result: Result<()> = db.retry_once("probe", |_| {
            attempts += 1;
            Err(Error::NotFound {
                resource: "bucket#1".into(),
            })
        });
        assert_eq!(attempts, 1);
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }
}

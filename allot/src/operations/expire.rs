//! Release-period expiry of holds.
//!
//! The engine runs no scheduler. An external caller (cron, a job runner,
//! the `expire-holds` command) invokes the sweep with the current time.

use chrono::{DateTime, Utc};

use crate::database::Database;
use crate::ids::OrgId;
use crate::{Reservation, Result};

/// Result of an expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpireResult {
    /// Number of holds released (or that would be released in dry-run mode).
    pub expired_count: usize,
    /// The holds, as they were before release in dry-run mode and after
    /// release otherwise.
    pub expired: Vec<Reservation>,
}

/// Hold maintenance operations.
///
/// All operations are static methods that work on a database instance.
pub struct HoldOperations;

impl HoldOperations {
    /// Releases every hold of `org` whose expiry is at or before `now`.
    ///
    /// The sweep is one transaction: either every due hold is released or
    /// none is.
    ///
    /// # Arguments
    ///
    /// * `db` - Database to operate on
    /// * `org` - Tenant to sweep
    /// * `now` - Cut-off time
    /// * `dry_run` - If true, report what would be released without releasing
    ///
    /// # Errors
    ///
    /// Returns an error if database operations fail.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use allot::database::{Database, DatabaseConfig};
    /// use allot::operations::HoldOperations;
    /// use allot::OrgId;
    /// use chrono::Utc;
    ///
    /// let mut db = Database::open(DatabaseConfig::new("/tmp/allot.db")).unwrap();
    /// let org = OrgId::new("acme").unwrap();
    ///
    /// let preview = HoldOperations::expire(&mut db, &org, Utc::now(), true).unwrap();
    /// println!("Would release {} holds", preview.expired_count);
    /// ```
    pub fn expire(
        db: &mut Database,
        org: &OrgId,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> Result<ExpireResult> {
        let expired = if dry_run {
            Database::due_holds(db.connection(), org, now)?
        } else {
            db.expire_holds(org, now)?
        };

        Ok(ExpireResult {
            expired_count: expired.len(),
            expired,
        })
    }
}

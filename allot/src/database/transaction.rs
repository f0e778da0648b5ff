//! Batched writes with per-item isolation.
//!
//! A batch runs inside one `IMMEDIATE` transaction. Each item gets its own
//! savepoint, so a failing item is rolled back on its own while the rest of
//! the batch still commits.

use rusqlite::Connection;

use crate::error::Result;

use super::connection::Database;

impl Database {
    /// Applies `apply` to every item in one transaction.
    ///
    /// The outer `Result` fails only if the transaction itself cannot be
    /// started or committed; per-item failures are returned in order in the
    /// inner results and leave no trace in the database.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockTimeout`] if the write lock cannot be
    /// taken, or a database error if a savepoint or the commit fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use allot::database::{Database, DatabaseConfig};
    ///
    /// let mut db = Database::open(DatabaseConfig::new("/tmp/allot.db")).unwrap();
    /// let names = ["Hotelbeds", "Expedia"];
    /// let outcomes = db
    ///     .run_batch(&names, |conn, name| {
    ///         Ok(conn.execute(
    ///             "INSERT INTO suppliers (org, name) VALUES ('acme', ?1)",
    ///             [name],
    ///         )?)
    ///     })
    ///     .unwrap();
    /// assert_eq!(outcomes.len(), 2);
    /// ```
    pub fn run_batch<T, R>(
        &mut self,
        items: &[T],
        apply: impl FnMut(&Connection, &T) -> Result<R>,
    ) -> Result<Vec<Result<R>>> {
        self.batch(items, true, apply)
    }

    /// Like [`Database::run_batch`], but rolls the whole batch back at the
    /// end so the outcomes describe what would happen.
    ///
    /// # Errors
    ///
    /// Same as [`Database::run_batch`].
    pub fn preview_batch<T, R>(
        &mut self,
        items: &[T],
        apply: impl FnMut(&Connection, &T) -> Result<R>,
    ) -> Result<Vec<Result<R>>> {
        self.batch(items, false, apply)
    }

    fn batch<T, R>(
        &mut self,
        items: &[T],
        commit: bool,
        mut apply: impl FnMut(&Connection, &T) -> Result<R>,
    ) -> Result<Vec<Result<R>>> {
        let mut tx = self.immediate_transaction()?;
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            let savepoint = tx.savepoint()?;
            match apply(&savepoint, item) {
                Ok(value) => {
                    savepoint.commit()?;
                    outcomes.push(Ok(value));
                }
                // dropping the savepoint rolls it back
                Err(e) => outcomes.push(Err(e)),
            }
        }

        if commit {
            tx.commit()?;
        } else {
            tx.rollback()?;
        }
        Ok(outcomes)
    }
}

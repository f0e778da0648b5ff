//! Error types for the allot library.
//!
//! Every fallible engine operation returns [`Result`]. Variants are grouped
//! into validation, conflict, capacity, and concurrency failures so callers
//! can map them onto exit codes or HTTP statuses without string matching.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::ids::{BucketId, ReservationId, VariantId};

/// Result type alias for operations that may fail with an allot error.
///
/// # Examples
///
/// ```
/// use allot::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the allot library.
#[derive(Debug, Error)]
pub enum Error {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A configuration document could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// The requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// A bucket already exists for the same variant, supplier and time scope.
    #[error("duplicate scope: {details}")]
    DuplicateScope {
        /// Description of the conflicting scope.
        details: String,
    },

    /// A reservation asked for more units than the counter authority has left.
    #[error("insufficient inventory: requested {requested}, available {available}")]
    InsufficientInventory {
        /// Units requested.
        requested: u32,
        /// Units available at the time of the request.
        available: u32,
    },

    /// The bucket is closed by stop-sell or blackout.
    #[error("bucket {bucket} is closed for sale")]
    Closed {
        /// The closed bucket.
        bucket: BucketId,
    },

    /// The waterfall could not cover the full demand across all suppliers.
    #[error(
        "insufficient supplier inventory: requested {requested}, reserved {reserved}, shortfall {shortfall}"
    )]
    InsufficientSupplierInventory {
        /// Units requested.
        requested: u32,
        /// Units that could be reserved before giving up.
        reserved: u32,
        /// Units still missing.
        shortfall: u32,
    },

    /// No preferred master rate is valid for the variant on the date.
    #[error("no master rate for variant {variant} on {date}")]
    NoMasterRate {
        /// The variant that was priced.
        variant: VariantId,
        /// The date that was priced.
        date: NaiveDate,
    },

    /// No occupancy band of the rate plan covers the pax count.
    #[error("no occupancy band matches {pax} pax")]
    NoMatchingOccupancyBand {
        /// The pax count that was priced.
        pax: u32,
    },

    /// A master rate plan was written without `preferred` or `freesale`.
    #[error("invalid master rate configuration: {reason}")]
    InvalidMasterRateConfiguration {
        /// Why the plan was rejected.
        reason: String,
    },

    /// A bucket still has booked or held units.
    #[error("bucket {bucket} is in use: booked {booked}, held {held}")]
    BucketInUse {
        /// The bucket that could not be deleted.
        bucket: BucketId,
        /// Booked units on the bucket.
        booked: u32,
        /// Held units on the bucket.
        held: u32,
    },

    /// A reservation is not in the state required by the operation.
    #[error("reservation {reservation} is {actual}, expected {expected}")]
    InvalidReservationState {
        /// The reservation.
        reservation: ReservationId,
        /// The status the reservation actually has.
        actual: String,
        /// The status the operation requires.
        expected: String,
    },

    /// A counter row changed between read and write.
    #[error("concurrent modification of {resource}")]
    ConcurrentModification {
        /// The row whose version moved.
        resource: String,
    },

    /// A concurrent writer kept winning after the single internal retry.
    #[error("{operation} failed after retry: concurrent modification")]
    RetryExhausted {
        /// The operation that gave up.
        operation: String,
    },

    /// A database lock timeout occurred.
    #[error("database lock timeout after {seconds}s")]
    LockTimeout {
        /// The number of seconds waited before timing out.
        seconds: u64,
    },

    /// The data directory was not found and auto-initialization is disabled.
    #[error("data directory not found: {}", path.display())]
    DataDirectoryNotFound {
        /// The expected path to the data directory.
        path: PathBuf,
    },

    /// Database corruption was detected.
    #[error("database corruption detected: {details}")]
    DatabaseCorruption {
        /// Details about the corruption.
        details: String,
    },

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: u32,
        /// The schema version found in the database.
        found: u32,
    },
}

/// A field-level validation failure raised by the validated newtypes and
/// builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the failure.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<crate::money::InvalidCurrencyError> for Error {
    fn from(err: crate::money::InvalidCurrencyError) -> Self {
        Self::Validation {
            field: "currency".into(),
            message: err.to_string(),
        }
    }
}

impl From<crate::scope::InvalidDateRangeError> for Error {
    fn from(err: crate::scope::InvalidDateRangeError) -> Self {
        Self::Validation {
            field: "date_range".into(),
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Check if the error reports missing capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use allot::Error;
    ///
    /// let err = Error::InsufficientInventory { requested: 5, available: 2 };
    /// assert!(err.is_capacity());
    /// ```
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::InsufficientInventory { .. }
                | Self::InsufficientSupplierInventory { .. }
                | Self::Closed { .. }
        )
    }

    /// Check if the error is a conflict with existing state.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateScope { .. }
                | Self::InvalidMasterRateConfiguration { .. }
                | Self::BucketInUse { .. }
                | Self::InvalidReservationState { .. }
        )
    }

    /// Check if the error is transient lock contention that a single retry
    /// may resolve.
    ///
    /// # Examples
    ///
    /// ```
    /// use allot::Error;
    ///
    /// let err = Error::LockTimeout { seconds: 5 };
    /// assert!(err.is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::LockTimeout { .. } | Self::ConcurrentModification { .. } => true,
            Self::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

//! Reservations against a counter authority.
//!
//! A reservation records one successful `reserve` call: which bucket was
//! asked, which authority's counters moved, and whether the units are held
//! or booked.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bucket::CounterAuthority;
use crate::error::ValidationError;
use crate::ids::{BucketId, OrgId, ReservationId};

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Provisional; counts against `held`.
    Held,
    /// Confirmed; counts against `booked`.
    Booked,
    /// Hold returned to inventory.
    Released,
}

impl ReservationStatus {
    /// Column value used in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Held => "held",
            Self::Booked => "booked",
            Self::Released => "released",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "held" => Ok(Self::Held),
            "booked" => Ok(Self::Booked),
            "released" => Ok(Self::Released),
            other => Err(ValidationError::new(
                "status",
                format!("unknown reservation status '{other}'"),
            )),
        }
    }
}

/// A stored reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Row id.
    pub id: ReservationId,
    /// Owning tenant.
    pub org: OrgId,
    /// Bucket the caller reserved from.
    pub bucket: BucketId,
    /// Counters that were moved.
    pub authority: CounterAuthority,
    /// Units reserved.
    pub quantity: u32,
    /// Current state.
    pub status: ReservationStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// When a hold lapses, if the bucket has a release period.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Whether the reservation still consumes inventory.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, ReservationStatus::Held | ReservationStatus::Booked)
    }

    /// Whether this is a hold whose release period has passed at `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use allot::{CounterAuthority, Reservation, ReservationStatus};
    /// use allot::ids::{BucketId, OrgId, ReservationId};
    /// use chrono::{Duration, Utc};
    ///
    /// let now = Utc::now();
    /// let r = Reservation {
    ///     id: ReservationId::new(1),
    ///     org: OrgId::new("acme").unwrap(),
    ///     bucket: BucketId::new(1),
    ///     authority: CounterAuthority::Bucket(BucketId::new(1)),
    ///     quantity: 2,
    ///     status: ReservationStatus::Held,
    ///     created_at: now,
    ///     expires_at: Some(now + Duration::hours(24)),
    /// };
    /// assert!(!r.is_expired(now));
    /// assert!(r.is_expired(now + Duration::hours(24)));
    /// ```
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Held && self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Expiry time for a hold created at `created_at` on a bucket with the given
/// release period; zero means holds never lapse.
#[must_use]
pub fn hold_expiry(created_at: DateTime<Utc>, release_period_hours: u32) -> Option<DateTime<Utc>> {
    (release_period_hours > 0)
        .then(|| created_at + Duration::hours(i64::from(release_period_hours)))
}

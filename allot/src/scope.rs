//! Time scopes for allocation buckets.
//!
//! A bucket covers exactly one of: a single date, an inclusive event date
//! range, or a date plus a named time slot.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::ids::{OrgId, SlotId, VariantId};

/// Error returned when a date range is inverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateRangeError {
    /// First date of the rejected range.
    pub start: NaiveDate,
    /// Last date of the rejected range.
    pub end: NaiveDate,
}

impl fmt::Display for InvalidDateRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "range end {} is before range start {}",
            self.end, self.start
        )
    }
}

impl std::error::Error for InvalidDateRangeError {}

/// An inclusive range of calendar dates.
///
/// # Examples
///
/// ```
/// use allot::DateRange;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
/// let range = DateRange::new(start, end).unwrap();
/// assert_eq!(range.len(), 3);
/// assert_eq!(range.days().count(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = InvalidDateRangeError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Creates a new inclusive range.
    ///
    /// # Errors
    ///
    /// Returns an error if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateRangeError> {
        if end < start {
            return Err(InvalidDateRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day.
    #[must_use]
    pub const fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// First day of the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Always false; a range holds at least one day.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates every day in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            let next = *d + Duration::days(1);
            (next <= end).then_some(next)
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// Discriminant persisted for each [`TimeScope`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// One calendar date.
    Date,
    /// An inclusive event range.
    Range,
    /// A date with a time slot.
    Slot,
}

impl ScopeKind {
    /// Column value used in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Range => "range",
            Self::Slot => "slot",
        }
    }

    /// Parses the column value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date" => Some(Self::Date),
            "range" => Some(Self::Range),
            "slot" => Some(Self::Slot),
            _ => None,
        }
    }
}

/// The time a bucket's inventory applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeScope {
    /// A single calendar date.
    Date {
        /// The date.
        date: NaiveDate,
    },
    /// An event spanning an inclusive date range.
    Range {
        /// The dates covered.
        range: DateRange,
    },
    /// A date and one of the variant's time slots.
    Slot {
        /// The date.
        date: NaiveDate,
        /// The time slot.
        slot: SlotId,
    },
}

impl TimeScope {
    /// Scope for a single date.
    #[must_use]
    pub const fn date(date: NaiveDate) -> Self {
        Self::Date { date }
    }

    /// Persisted discriminant.
    #[must_use]
    pub const fn kind(&self) -> ScopeKind {
        match self {
            Self::Date { .. } => ScopeKind::Date,
            Self::Range { .. } => ScopeKind::Range,
            Self::Slot { .. } => ScopeKind::Slot,
        }
    }

    /// First date covered.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        match self {
            Self::Date { date } | Self::Slot { date, .. } => *date,
            Self::Range { range } => range.start(),
        }
    }

    /// Last date covered, only set for ranges.
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Range { range } => Some(range.end()),
            _ => None,
        }
    }

    /// The time slot, if any.
    #[must_use]
    pub const fn slot(&self) -> Option<SlotId> {
        match self {
            Self::Slot { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    /// Whether the scope applies to `date`.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        match self {
            Self::Date { date: d } | Self::Slot { date: d, .. } => *d == date,
            Self::Range { range } => range.contains(date),
        }
    }

    /// Rebuilds a scope from its persisted columns.
    #[must_use]
    pub fn from_columns(
        kind: ScopeKind,
        start: NaiveDate,
        end: Option<NaiveDate>,
        slot: Option<SlotId>,
    ) -> Option<Self> {
        match (kind, end, slot) {
            (ScopeKind::Date, None, None) => Some(Self::Date { date: start }),
            (ScopeKind::Range, Some(end), None) => DateRange::new(start, end)
                .ok()
                .map(|range| Self::Range { range }),
            (ScopeKind::Slot, None, Some(slot)) => Some(Self::Slot { date: start, slot }),
            _ => None,
        }
    }
}

impl fmt::Display for TimeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date { date } => write!(f, "{date}"),
            Self::Range { range } => write!(f, "{range}"),
            Self::Slot { date, slot } => write!(f, "{date}@{slot}"),
        }
    }
}

/// Day-of-week bit mask, Monday is bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdayMask(u8);

impl WeekdayMask {
    /// Every day of the week.
    pub const ALL: Self = Self(0b111_1111);

    /// Builds a mask from raw bits; bits above Sunday are dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b111_1111)
    }

    /// Builds a mask from a list of weekdays.
    #[must_use]
    pub fn from_days(days: &[Weekday]) -> Self {
        Self(
            days.iter()
                .fold(0u8, |acc, d| acc | (1 << d.num_days_from_monday())),
        )
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the mask includes the weekday of `date`.
    #[must_use]
    pub fn includes(self, date: NaiveDate) -> bool {
        self.0 & (1 << date.weekday().num_days_from_monday()) != 0
    }
}

impl Default for WeekdayMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// A named recurring time-of-day window on a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Row id.
    pub id: SlotId,
    /// Owning tenant.
    pub org: OrgId,
    /// Variant the slot belongs to.
    pub variant: VariantId,
    /// Display name, unique per variant.
    pub name: String,
    /// Start of the window.
    pub start: NaiveTime,
    /// End of the window.
    pub end: NaiveTime,
}

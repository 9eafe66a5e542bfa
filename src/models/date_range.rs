//! Calendar-day ranges.
//!
//! Assignments are booked in whole days. A [`DateRange`] has no time
//! component and is inclusive on **both** ends: `2024-01-01..=2024-01-05`
//! covers five days.
//!
//! # Overlap Policy
//! Two ranges overlap iff `start1 <= end2 && end1 >= start2`. Ranges that
//! share a single boundary day overlap: an assignment ending on day N
//! conflicts with one starting on day N. Only strictly adjacent ranges
//! (`..=N` and `N+1..`) are disjoint.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::{ValidationError, ValidationErrorKind};

/// An inclusive range of calendar days `[start, end]`.
///
/// Always non-empty: construction rejects `end < start`, and serde
/// deserialization goes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    /// First booked day (inclusive).
    pub start: NaiveDate,
    /// Last booked day (inclusive).
    pub end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ValidationError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Creates a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::new(
                ValidationErrorKind::EndBeforeStart,
                format!("End date {end} is before start date {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Parses a pair of ISO-8601 calendar dates (`YYYY-MM-DD`).
    pub fn parse(start: &str, end: &str) -> Result<Self, Vec<ValidationError>> {
        crate::validation::parse_range(start, end)
    }

    /// Number of days covered (inclusive, always >= 1).
    #[inline]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether `day` falls within the range (inclusive on both ends).
    #[inline]
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// Whether two ranges share at least one day.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        ranges_overlap(self.start, self.end, other.start, other.end)
    }

    /// Whether the range begins strictly after `day`.
    #[inline]
    pub fn starts_after(&self, day: NaiveDate) -> bool {
        self.start > day
    }

    /// The days shared with `other`, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end >= start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Moves both ends by `days` (negative moves earlier).
    ///
    /// Returns `None` if the result leaves chrono's supported date range.
    pub fn shifted(&self, days: i64) -> Option<Self> {
        let delta = Duration::try_days(days)?;
        Some(Self {
            start: self.start.checked_add_signed(delta)?,
            end: self.end.checked_add_signed(delta)?,
        })
    }

    /// Iterates every day in the range.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Inclusive overlap test over raw date pairs.
///
/// True iff `start1 <= end2 && end1 >= start2`. Touching on a shared
/// boundary day counts as overlap.
#[inline]
pub fn ranges_overlap(
    start1: NaiveDate,
    end1: NaiveDate,
    start2: NaiveDate,
    end2: NaiveDate,
) -> bool {
    start1 <= end2 && end1 >= start2
}

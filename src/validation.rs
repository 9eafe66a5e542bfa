//! Input validation for scheduling requests and roster data.
//!
//! Date input is checked before any conflict check runs. Detects:
//! - Malformed ISO-8601 dates
//! - End date before start date
//! - Blank training descriptions
//! - Ranges longer than the configured maximum
//!
//! [`audit_roster`] checks a whole data set and reports every problem it
//! finds, including double-bookings that reached storage without going
//! through the mutation gate (or through a concurrent writer race).

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::models::{AssignmentTarget, CrewId, DateRange, Roster};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A date string is not `YYYY-MM-DD`.
    MalformedDate,
    /// A range ends before it starts.
    EndBeforeStart,
    /// A range exceeds the configured maximum length.
    RangeTooLong,
    /// A training assignment has no description.
    BlankTrainingDescription,
    /// Two entities share the same ID.
    DuplicateId,
    /// An assignment references a crew member that doesn't exist.
    InvalidCrewReference,
    /// An assignment references a project that doesn't exist.
    InvalidProjectReference,
    /// A crew member holds two overlapping assignments.
    DoubleBooking,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Parses an ISO-8601 calendar date. `field` names the input in the message.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::new(
            ValidationErrorKind::MalformedDate,
            format!("Invalid {field} '{value}': expected YYYY-MM-DD"),
        )
    })
}

/// Parses a start/end pair into a [`DateRange`].
///
/// Both dates are parsed before reporting, so a request with two bad
/// dates gets two errors.
pub fn parse_range(start: &str, end: &str) -> Result<DateRange, Vec<ValidationError>> {
    let start = parse_date("start date", start);
    let end = parse_date("end date", end);

    match (start, end) {
        (Ok(s), Ok(e)) => DateRange::new(s, e).map_err(|err| vec![err]),
        (s, e) => Err([s.err(), e.err()].into_iter().flatten().collect()),
    }
}

/// Checks an assignment target for content errors.
pub fn validate_target(target: &AssignmentTarget) -> Result<(), ValidationError> {
    match target {
        AssignmentTarget::Training { description } if description.trim().is_empty() => {
            Err(ValidationError::new(
                ValidationErrorKind::BlankTrainingDescription,
                "Training assignments need a description",
            ))
        }
        _ => Ok(()),
    }
}

/// Checks a range against an optional maximum length in days.
pub fn validate_range_length(range: &DateRange, max_days: Option<u32>) -> Result<(), ValidationError> {
    match max_days {
        Some(max) if range.days() > i64::from(max) => Err(ValidationError::new(
            ValidationErrorKind::RangeTooLong,
            format!("Range {range} spans {} days; the maximum is {max}", range.days()),
        )),
        _ => Ok(()),
    }
}

/// Audits a roster for structural problems.
///
/// Checks:
/// 1. No duplicate assignment IDs
/// 2. Every assignment references an existing crew member
/// 3. Every vessel assignment references an existing project
/// 4. Every training assignment has a description
/// 5. No crew member holds overlapping assignments
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn audit_roster(roster: &Roster) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for a in &roster.assignments {
        if !ids.insert(a.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate assignment ID: {}", a.id),
            ));
        }

        if roster.crew_member(a.crew_member_id).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCrewReference,
                format!(
                    "Assignment '{}' references unknown crew member '{}'",
                    a.id, a.crew_member_id
                ),
            ));
        }

        if let Some(project_id) = a.target.project_id() {
            if roster.project(project_id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidProjectReference,
                    format!("Assignment '{}' references unknown project '{project_id}'", a.id),
                ));
            }
        }

        if let Err(err) = validate_target(&a.target) {
            errors.push(ValidationError::new(
                err.kind,
                format!("Assignment '{}': {}", a.id, err.message),
            ));
        }
    }

    errors.extend(detect_double_bookings(roster));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Finds overlapping assignment pairs per crew member.
///
/// # Algorithm
/// Sort each member's assignments by start date, then sweep: an
/// assignment overlaps an earlier one iff it starts on or before the
/// latest end seen so far. Every overlapping pair is reported once.
fn detect_double_bookings(roster: &Roster) -> Vec<ValidationError> {
    let mut by_crew: HashMap<CrewId, Vec<usize>> = HashMap::new();
    for (i, a) in roster.assignments.iter().enumerate() {
        by_crew.entry(a.crew_member_id).or_default().push(i);
    }

    let mut errors = Vec::new();
    let mut crew_ids: Vec<CrewId> = by_crew.keys().copied().collect();
    crew_ids.sort();

    for crew_id in crew_ids {
        let mut idx = by_crew.remove(&crew_id).unwrap_or_default();
        idx.sort_by_key(|&i| roster.assignments[i].range.start);

        // Assignments whose end is still >= the current start.
        let mut open: Vec<usize> = Vec::new();
        for i in idx {
            let current = &roster.assignments[i];
            open.retain(|&j| roster.assignments[j].range.end >= current.range.start);
            for &j in &open {
                let earlier = &roster.assignments[j];
                errors.push(ValidationError::new(
                    ValidationErrorKind::DoubleBooking,
                    format!(
                        "Crew member '{crew_id}' is double-booked: '{}' ({}) overlaps '{}' ({})",
                        roster.label_for(earlier),
                        earlier.range,
                        roster.label_for(current),
                        current.range
                    ),
                ));
            }
            open.push(i);
        }
    }

    errors
}

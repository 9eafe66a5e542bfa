//! Crew display status derivation.
//!
//! The dashboard shows a status computed from the stored status and the
//! member's assignments relative to today. Rules, in priority order:
//!
//! 1. Stored `on_leave` wins unconditionally.
//! 2. An assignment covering today (inclusive) gives `training` if any
//!    such assignment is a training, otherwise `on_project`.
//! 3. An assignment starting strictly after today gives `planned`.
//! 4. Otherwise the stored status is shown unchanged.
//!
//! Derivation is pure: it never writes the stored status back.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{Assignment, CrewId, CrewMember, CrewStatus, DisplayStatus};

/// Derives the display status of one crew member.
///
/// `assignments` should be that member's assignments; ownership is not
/// checked.
pub fn derive_status<'a>(
    stored: CrewStatus,
    assignments: impl IntoIterator<Item = &'a Assignment>,
    today: NaiveDate,
) -> DisplayStatus {
    if stored == CrewStatus::OnLeave {
        return DisplayStatus::OnLeave;
    }

    let mut current = false;
    let mut training = false;
    let mut upcoming = false;

    for a in assignments {
        if a.range.contains(today) {
            current = true;
            training |= a.is_training();
        } else if a.range.starts_after(today) {
            upcoming = true;
        }
    }

    if training {
        DisplayStatus::Training
    } else if current {
        DisplayStatus::OnProject
    } else if upcoming {
        DisplayStatus::Planned
    } else {
        stored.into()
    }
}

/// Derives the display status of every crew member in `crew`.
pub fn derive_roster<'a>(
    crew: impl IntoIterator<Item = &'a CrewMember>,
    assignments: &[Assignment],
    today: NaiveDate,
) -> HashMap<CrewId, DisplayStatus> {
    let mut by_crew: HashMap<CrewId, Vec<&Assignment>> = HashMap::new();
    for a in assignments {
        by_crew.entry(a.crew_member_id).or_default().push(a);
    }

    crew.into_iter()
        .map(|member| {
            let own = by_crew.get(&member.id).map(Vec::as_slice).unwrap_or(&[]);
            (member.id, derive_status(member.status, own.iter().copied(), today))
        })
        .collect()
}

/// Whether any assignment covers `today`.
pub fn has_current_assignment<'a>(
    assignments: impl IntoIterator<Item = &'a Assignment>,
    today: NaiveDate,
) -> bool {
    assignments.into_iter().any(|a| a.range.contains(today))
}

//! Assignment conflict detection.
//!
//! A candidate range conflicts with every assignment of the same crew
//! member whose range overlaps it (inclusive on both ends, see
//! [`DateRange::overlaps`]). When an existing assignment is being edited,
//! its own id is excluded so it never conflicts with itself.
//!
//! Two entry points:
//! - [`find_conflicts`] / [`preview_conflicts`]: pure, over assignments the
//!   caller already holds. The drag preview recomputes these on every
//!   pointer move; the result is advisory only.
//! - [`ConflictChecker`]: reads the crew member's assignments from a
//!   store and resolves display labels. A failed read is returned as an
//!   error, never as "no conflict".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::StoreError;
use crate::models::{label_for, Assignment, AssignmentId, CrewId, DateRange, ProjectId};
use crate::store::ScheduleStore;

/// An existing assignment that overlaps the candidate range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictingAssignment {
    /// Conflicting assignment.
    pub id: AssignmentId,
    /// Its first day.
    pub start_date: NaiveDate,
    /// Its last day.
    pub end_date: NaiveDate,
    /// Project name or training description.
    pub label: String,
}

/// Result of a conflict check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Overlapping assignments, ordered by start date.
    pub conflicting: Vec<ConflictingAssignment>,
}

impl ConflictReport {
    /// Whether any assignment overlaps.
    pub fn has_conflict(&self) -> bool {
        !self.conflicting.is_empty()
    }

    /// Labels of the conflicting assignments.
    pub fn labels(&self) -> Vec<&str> {
        self.conflicting.iter().map(|c| c.label.as_str()).collect()
    }
}

/// Assignments in `assignments` that overlap `range`, skipping `exclude`.
///
/// Does not filter by crew member; pass one member's assignments.
/// Results are ordered by start date.
pub fn find_conflicts<'a>(
    assignments: impl IntoIterator<Item = &'a Assignment>,
    range: &DateRange,
    exclude: Option<AssignmentId>,
) -> Vec<&'a Assignment> {
    let mut found: Vec<&Assignment> = assignments
        .into_iter()
        .filter(|a| Some(a.id) != exclude && a.range.overlaps(range))
        .collect();
    found.sort_by_key(|a| (a.range.start, a.range.end));
    found
}

/// Advisory conflict check for an in-progress drag.
///
/// Considers only `crew_member_id`'s assignments in `assignments`, and
/// resolves labels from `project_names`. Nothing is read from a store;
/// the authoritative check runs again when the drag is committed.
pub fn preview_conflicts(
    assignments: &[Assignment],
    project_names: &HashMap<ProjectId, String>,
    crew_member_id: CrewId,
    range: &DateRange,
    dragged: Option<AssignmentId>,
) -> ConflictReport {
    let own = assignments.iter().filter(|a| a.crew_member_id == crew_member_id);
    let conflicting = find_conflicts(own, range, dragged)
        .into_iter()
        .map(|a| ConflictingAssignment {
            id: a.id,
            start_date: a.range.start,
            end_date: a.range.end,
            label: label_for(&a.target, |id| project_names.get(&id).cloned()),
        })
        .collect();
    ConflictReport { conflicting }
}

/// Store-backed conflict checker.
#[derive(Debug)]
pub struct ConflictChecker<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: ScheduleStore + ?Sized> ConflictChecker<'s, S> {
    /// Creates a checker reading from `store`.
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Checks `range` against `crew_member_id`'s assignments.
    ///
    /// `exclude` skips one assignment (the one being edited). Read-only.
    ///
    /// # Errors
    /// Any store failure. The conflict state is then unknown and the
    /// caller must not write.
    pub fn check(
        &self,
        crew_member_id: CrewId,
        range: &DateRange,
        exclude: Option<AssignmentId>,
    ) -> Result<ConflictReport, StoreError> {
        let existing = self.store.assignments_for_crew(crew_member_id)?;
        let hits = find_conflicts(&existing, range, exclude);

        let mut conflicting = Vec::with_capacity(hits.len());
        for a in hits {
            conflicting.push(self.describe(a)?);
        }

        tracing::debug!(
            crew_member_id = %crew_member_id,
            range = %range,
            conflicts = conflicting.len(),
            "conflict check"
        );

        Ok(ConflictReport { conflicting })
    }

    /// Builds the report entry for one assignment, resolving its label.
    pub fn describe(&self, assignment: &Assignment) -> Result<ConflictingAssignment, StoreError> {
        let project_name = match assignment.target.project_id() {
            Some(id) => self.store.project(id)?.map(|p| p.name),
            None => None,
        };
        Ok(ConflictingAssignment {
            id: assignment.id,
            start_date: assignment.range.start,
            end_date: assignment.range.end,
            label: label_for(&assignment.target, |_| project_name),
        })
    }
}

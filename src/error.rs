//! Error types.
//!
//! [`StoreError`] covers the data-store seam; [`ScheduleError`] is what
//! the conflict checker and mutation gate return. A detected conflict is
//! a normal rejected outcome rather than a system failure, but it travels
//! through the same `Result` so callers cannot ignore it.

use thiserror::Error;

use crate::conflict::ConflictingAssignment;
use crate::models::{AssignmentId, CrewId, ProjectId, ProjectStatus};
use crate::validation::ValidationError;

/// Errors raised by a [`crate::store::ScheduleStore`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    /// A row targeted by an update or status write is missing.
    #[error("{entity} '{id}' not found in store")]
    NotFound {
        /// Entity kind ("crew member", "assignment").
        entity: &'static str,
        /// Missing id.
        id: String,
    },

    /// The store's exclusion constraint rejected an overlapping row.
    #[error("exclusion constraint: crew member '{crew_member_id}' already holds overlapping assignment '{existing}'")]
    ExclusionViolation {
        /// Crew member being double-booked.
        crew_member_id: CrewId,
        /// The assignment already holding the days.
        existing: AssignmentId,
    },
}

/// Errors returned by scheduling operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// Input rejected before any conflict check ran.
    #[error("invalid input: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// The requested range overlaps existing assignments.
    #[error("{}", conflict_message(.0))]
    Conflict(Vec<ConflictingAssignment>),

    /// The crew member does not exist.
    #[error("crew member '{0}' not found")]
    CrewMemberNotFound(CrewId),

    /// The project does not exist.
    #[error("project '{0}' not found")]
    ProjectNotFound(ProjectId),

    /// The project is completed or cancelled and takes no new bookings.
    #[error("project '{0}' is {1} and cannot be booked")]
    ProjectClosed(ProjectId, ProjectStatus),

    /// The assignment does not exist.
    #[error("assignment '{0}' not found")]
    AssignmentNotFound(AssignmentId),

    /// A drag move pushed the range outside the representable calendar.
    #[error("cannot move assignment by {0} days")]
    MoveOutOfRange(i64),

    /// The store failed; conflict state is unknown and nothing was written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ScheduleError {
    /// Whether the error is an ordinary conflict rejection.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Conflicting items, if this is a conflict rejection.
    pub fn conflicts(&self) -> &[ConflictingAssignment] {
        match self {
            Self::Conflict(items) => items,
            _ => &[],
        }
    }
}

impl From<ValidationError> for ScheduleError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(vec![err])
    }
}

impl From<Vec<ValidationError>> for ScheduleError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn conflict_message(conflicts: &[ConflictingAssignment]) -> String {
    let items = conflicts
        .iter()
        .map(|c| format!("{} ({} to {})", c.label, c.start_date, c.end_date))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Conflicts with existing assignments: {items}")
}

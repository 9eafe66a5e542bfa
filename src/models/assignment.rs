//! Assignment model.
//!
//! An assignment books one crew member for an inclusive range of days,
//! either aboard a project (vessel) or on a training event described by
//! free text. A crew member may never hold two assignments whose ranges
//! overlap; [`crate::gate::AssignmentGate`] is the only write path that
//! enforces this.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{CrewId, DateRange, ProjectId};

/// Assignment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(pub Uuid);

impl AssignmentId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssignmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a crew member is booked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "assignment_type", rename_all = "snake_case")]
pub enum AssignmentTarget {
    /// Service aboard a project.
    Vessel {
        /// Target project.
        project_id: ProjectId,
    },
    /// A training event.
    Training {
        /// Free-text description, shown as the label.
        description: String,
    },
}

/// Assignment discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    /// Aboard a project.
    Vessel,
    /// Training event.
    Training,
}

impl AssignmentTarget {
    /// Vessel target.
    pub fn vessel(project_id: ProjectId) -> Self {
        Self::Vessel { project_id }
    }

    /// Training target.
    pub fn training(description: impl Into<String>) -> Self {
        Self::Training {
            description: description.into(),
        }
    }

    /// The discriminator.
    pub fn assignment_type(&self) -> AssignmentType {
        match self {
            Self::Vessel { .. } => AssignmentType::Vessel,
            Self::Training { .. } => AssignmentType::Training,
        }
    }

    /// The target project, for vessel assignments.
    pub fn project_id(&self) -> Option<ProjectId> {
        match self {
            Self::Vessel { project_id } => Some(*project_id),
            Self::Training { .. } => None,
        }
    }
}

/// A crew member booked for a range of days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique identifier.
    pub id: AssignmentId,
    /// Booked crew member.
    pub crew_member_id: CrewId,
    /// Vessel or training.
    #[serde(flatten)]
    pub target: AssignmentTarget,
    /// Booked days (inclusive).
    pub range: DateRange,
    /// Role on this project, if it differs from the member's usual role.
    pub role_on_project: Option<String>,
}

impl Assignment {
    /// Creates an assignment with a fresh id.
    pub fn new(crew_member_id: CrewId, target: AssignmentTarget, range: DateRange) -> Self {
        Self {
            id: AssignmentId::new(),
            crew_member_id,
            target,
            range,
            role_on_project: None,
        }
    }

    /// Creates a vessel assignment.
    pub fn vessel(crew_member_id: CrewId, project_id: ProjectId, range: DateRange) -> Self {
        Self::new(crew_member_id, AssignmentTarget::vessel(project_id), range)
    }

    /// Creates a training assignment.
    pub fn training(
        crew_member_id: CrewId,
        description: impl Into<String>,
        range: DateRange,
    ) -> Self {
        Self::new(crew_member_id, AssignmentTarget::training(description), range)
    }

    /// Replaces the id.
    pub fn with_id(mut self, id: AssignmentId) -> Self {
        self.id = id;
        self
    }

    /// Sets the role on project.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role_on_project = Some(role.into());
        self
    }

    /// The discriminator.
    #[inline]
    pub fn assignment_type(&self) -> AssignmentType {
        self.target.assignment_type()
    }

    /// Whether this is a training assignment.
    #[inline]
    pub fn is_training(&self) -> bool {
        self.assignment_type() == AssignmentType::Training
    }

    /// Number of booked days.
    #[inline]
    pub fn days(&self) -> i64 {
        self.range.days()
    }
}

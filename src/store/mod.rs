//! Data-store seam.
//!
//! The scheduling core never talks to a database directly. Everything it
//! reads or writes goes through [`ScheduleStore`], so the hosted
//! database client, an in-process store, or a test double can sit
//! behind it.
//!
//! # Contract
//! - Reads return typed records, never raw rows.
//! - Writes are individually atomic; there is no multi-write transaction.
//! - A store may enforce an exclusion constraint on assignment writes
//!   and report it as [`StoreError::ExclusionViolation`].

mod memory;

pub use memory::{MemoryStore, StoreFaults};

use crate::error::StoreError;
use crate::models::{Assignment, AssignmentId, CrewId, CrewMember, CrewStatus, Project, ProjectId};

/// Typed access to crew, projects, and assignments.
pub trait ScheduleStore: Send + Sync {
    /// Fetches a crew member.
    fn crew_member(&self, id: CrewId) -> Result<Option<CrewMember>, StoreError>;

    /// Fetches a project.
    fn project(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;

    /// Fetches an assignment.
    fn assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, StoreError>;

    /// All assignments held by a crew member.
    fn assignments_for_crew(&self, crew_member_id: CrewId) -> Result<Vec<Assignment>, StoreError>;

    /// Inserts a new assignment.
    fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StoreError>;

    /// Replaces an existing assignment (matched by id).
    fn update_assignment(&self, assignment: &Assignment) -> Result<(), StoreError>;

    /// Deletes an assignment, returning the removed row if it existed.
    fn delete_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, StoreError>;

    /// Writes a crew member's stored status.
    fn set_crew_status(&self, crew_member_id: CrewId, status: CrewStatus) -> Result<(), StoreError>;
}

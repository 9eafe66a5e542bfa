//! In-process store.
//!
//! Holds a [`Roster`] behind a `parking_lot::RwLock`. Optionally enforces
//! an exclusion constraint: an insert or update whose range overlaps
//! another assignment of the same crew member is rejected under the
//! write lock, so concurrent writers cannot both succeed.
//!
//! Fault injection ([`StoreFaults`]) makes reads, assignment writes, or
//! status writes fail on demand.

use parking_lot::{Mutex, RwLock};

use super::ScheduleStore;
use crate::config::SchedulerConfig;
use crate::error::StoreError;
use crate::models::{
    Assignment, AssignmentId, CrewId, CrewMember, CrewStatus, Project, ProjectId, Roster,
};

/// Operations forced to fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreFaults {
    /// Every read fails.
    pub reads: bool,
    /// Assignment inserts, updates, and deletes fail.
    pub assignment_writes: bool,
    /// Crew status writes fail.
    pub status_writes: bool,
}

/// Thread-safe in-memory [`ScheduleStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    roster: RwLock<Roster>,
    enforce_exclusion: bool,
    faults: Mutex<StoreFaults>,
}

impl MemoryStore {
    /// Creates an empty store without the exclusion constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store configured from `config`.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new().with_exclusion(config.enforce_exclusion)
    }

    /// Creates a store seeded with `roster`.
    pub fn from_roster(roster: Roster) -> Self {
        Self {
            roster: RwLock::new(roster),
            ..Self::default()
        }
    }

    /// Enables or disables the exclusion constraint.
    pub fn with_exclusion(mut self, enforce: bool) -> Self {
        self.enforce_exclusion = enforce;
        self
    }

    /// Whether the exclusion constraint is enforced.
    pub fn enforces_exclusion(&self) -> bool {
        self.enforce_exclusion
    }

    /// Adds or replaces a crew member.
    pub fn add_crew_member(&self, member: CrewMember) {
        self.roster.write().add_crew_member(member);
    }

    /// Adds or replaces a project.
    pub fn add_project(&self, project: Project) {
        self.roster.write().add_project(project);
    }

    /// Appends an assignment directly, bypassing the exclusion constraint.
    ///
    /// Used to seed legacy data, which may already contain double-bookings.
    pub fn seed_assignment(&self, assignment: Assignment) {
        self.roster.write().add_assignment(assignment);
    }

    /// Copy of the current data set.
    pub fn snapshot(&self) -> Roster {
        self.roster.read().clone()
    }

    /// Replaces the active fault set.
    pub fn set_faults(&self, faults: StoreFaults) {
        *self.faults.lock() = faults;
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.faults.lock().reads {
            return Err(StoreError::Unavailable("read failed".into()));
        }
        Ok(())
    }

    fn check_assignment_write(&self) -> Result<(), StoreError> {
        if self.faults.lock().assignment_writes {
            return Err(StoreError::Unavailable("assignment write failed".into()));
        }
        Ok(())
    }

    fn check_exclusion(roster: &Roster, candidate: &Assignment) -> Result<(), StoreError> {
        let clash = roster.assignments.iter().find(|a| {
            a.id != candidate.id
                && a.crew_member_id == candidate.crew_member_id
                && a.range.overlaps(&candidate.range)
        });
        match clash {
            Some(existing) => Err(StoreError::ExclusionViolation {
                crew_member_id: candidate.crew_member_id,
                existing: existing.id,
            }),
            None => Ok(()),
        }
    }
}

impl ScheduleStore for MemoryStore {
    fn crew_member(&self, id: CrewId) -> Result<Option<CrewMember>, StoreError> {
        self.check_read()?;
        Ok(self.roster.read().crew_member(id).cloned())
    }

    fn project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        self.check_read()?;
        Ok(self.roster.read().project(id).cloned())
    }

    fn assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, StoreError> {
        self.check_read()?;
        Ok(self.roster.read().assignment(id).cloned())
    }

    fn assignments_for_crew(&self, crew_member_id: CrewId) -> Result<Vec<Assignment>, StoreError> {
        self.check_read()?;
        Ok(self
            .roster
            .read()
            .assignments_for_crew(crew_member_id)
            .into_iter()
            .cloned()
            .collect())
    }

    fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StoreError> {
        self.check_assignment_write()?;
        let mut roster = self.roster.write();
        if self.enforce_exclusion {
            Self::check_exclusion(&roster, assignment)?;
        }
        roster.add_assignment(assignment.clone());
        Ok(())
    }

    fn update_assignment(&self, assignment: &Assignment) -> Result<(), StoreError> {
        self.check_assignment_write()?;
        let mut roster = self.roster.write();
        if self.enforce_exclusion {
            Self::check_exclusion(&roster, assignment)?;
        }
        let slot = roster
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment.id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "assignment",
                id: assignment.id.to_string(),
            })?;
        *slot = assignment.clone();
        Ok(())
    }

    fn delete_assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, StoreError> {
        self.check_assignment_write()?;
        Ok(self.roster.write().remove_assignment(id))
    }

    fn set_crew_status(&self, crew_member_id: CrewId, status: CrewStatus) -> Result<(), StoreError> {
        if self.faults.lock().status_writes {
            return Err(StoreError::Unavailable("status write failed".into()));
        }
        let mut roster = self.roster.write();
        let member = roster
            .crew
            .get_mut(&crew_member_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "crew member",
                id: crew_member_id.to_string(),
            })?;
        member.status = status;
        Ok(())
    }
}

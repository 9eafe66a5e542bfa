//! Assignment mutation gate.
//!
//! The single write path for assignments. Every create, edit, drag move,
//! resize, and delete passes through [`AssignmentGate`], which:
//!
//! 1. Validates input (dates, training description, maximum length,
//!    referenced crew member, and a vessel that is still active or planned).
//! 2. Runs the conflict check for the crew member over the *new* range,
//!    excluding the assignment being edited.
//! 3. Writes the assignment.
//! 4. Updates the crew member's stored status:
//!    - create/update whose start is on or before today sets `on_project`
//!      (future-only assignments leave the status alone);
//!    - delete sets `available` unless another assignment still covers today;
//!    - a stored `on_leave` is never overwritten.
//!
//! # Consistency
//! Steps 3 and 4 are separate writes. If the status write fails, the
//! assignment write stays committed and the failure is reported in the
//! outcome as [`StatusUpdate::Failed`]. Status consistency is
//! best-effort, not transactional.
//!
//! # Concurrency
//! Between the conflict check (2) and the write (3) another session may
//! book the same days. A store with an exclusion constraint rejects the
//! second write; the gate reports that as an ordinary conflict.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::SchedulerConfig;
use crate::conflict::{ConflictChecker, ConflictReport};
use crate::error::{ScheduleError, StoreError};
use crate::models::{
    Assignment, AssignmentId, AssignmentTarget, CrewId, CrewStatus, DateRange, ProjectId,
};
use crate::status::has_current_assignment;
use crate::store::ScheduleStore;
use crate::validation::{validate_range_length, validate_target};

/// Who is writing, and what day it is for them.
///
/// Passed explicitly into every mutation; there is no ambient
/// "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationContext {
    /// User or service performing the write, for the audit trail.
    pub actor: Option<String>,
    /// The day status rules compare against.
    pub today: NaiveDate,
}

impl MutationContext {
    /// Anonymous context for `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self { actor: None, today }
    }

    /// Anonymous context with today's date from `clock`.
    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.today())
    }

    /// Sets the actor.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    fn actor(&self) -> &str {
        self.actor.as_deref().unwrap_or("anonymous")
    }
}

/// A new assignment to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    /// Crew member to book.
    pub crew_member_id: CrewId,
    /// Vessel or training.
    pub target: AssignmentTarget,
    /// Days to book.
    pub range: DateRange,
    /// Role on project.
    pub role_on_project: Option<String>,
}

impl AssignmentDraft {
    /// Draft of a vessel assignment.
    pub fn vessel(crew_member_id: CrewId, project_id: ProjectId, range: DateRange) -> Self {
        Self {
            crew_member_id,
            target: AssignmentTarget::vessel(project_id),
            range,
            role_on_project: None,
        }
    }

    /// Draft of a training assignment.
    pub fn training(crew_member_id: CrewId, description: impl Into<String>, range: DateRange) -> Self {
        Self {
            crew_member_id,
            target: AssignmentTarget::training(description),
            range,
            role_on_project: None,
        }
    }

    /// Sets the role on project.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role_on_project = Some(role.into());
        self
    }
}

/// Edits to an existing assignment. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentChanges {
    /// New days.
    pub range: Option<DateRange>,
    /// New role; `Some(None)` clears it.
    pub role_on_project: Option<Option<String>>,
    /// New target.
    pub target: Option<AssignmentTarget>,
}

impl AssignmentChanges {
    /// No changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes the range.
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Changes or clears the role.
    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role_on_project = Some(role);
        self
    }

    /// Changes the target.
    pub fn with_target(mut self, target: AssignmentTarget) -> Self {
        self.target = Some(target);
        self
    }

    fn apply_to(self, mut assignment: Assignment) -> Assignment {
        if let Some(range) = self.range {
            assignment.range = range;
        }
        if let Some(role) = self.role_on_project {
            assignment.role_on_project = role;
        }
        if let Some(target) = self.target {
            assignment.target = target;
        }
        assignment
    }
}

/// What happened to the crew member's stored status after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StatusUpdate {
    /// No status write was needed.
    Unchanged,
    /// The stored status was written.
    Set {
        /// Written status.
        status: CrewStatus,
    },
    /// The status write (or the read deciding it) failed; the assignment
    /// write was kept.
    Failed {
        /// Status that should have been written.
        intended: Option<CrewStatus>,
        /// Failure description.
        reason: String,
    },
}

/// Result of a successful create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// The assignment as stored.
    pub assignment: Assignment,
    /// Crew status side effect.
    pub status_update: StatusUpdate,
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// The removed assignment.
    pub removed: Assignment,
    /// Crew status side effect.
    pub status_update: StatusUpdate,
}

/// Validating, conflict-checking write path for assignments.
#[derive(Debug)]
pub struct AssignmentGate<S> {
    store: S,
    config: SchedulerConfig,
}

impl<S: ScheduleStore> AssignmentGate<S> {
    /// Creates a gate over `store`.
    pub fn new(store: S, config: SchedulerConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Read-only conflict check.
    pub fn check_conflicts(
        &self,
        crew_member_id: CrewId,
        range: &DateRange,
        exclude: Option<AssignmentId>,
    ) -> Result<ConflictReport, ScheduleError> {
        Ok(ConflictChecker::new(&self.store).check(crew_member_id, range, exclude)?)
    }

    /// Creates an assignment.
    ///
    /// # Errors
    /// - `Validation` for bad input (nothing else runs)
    /// - `CrewMemberNotFound` / `ProjectNotFound` for dangling references
    /// - `ProjectClosed` when the vessel is completed or cancelled
    /// - `Conflict` naming every overlapping assignment
    /// - `Store` if any read or the write fails; nothing is written
    pub fn create(
        &self,
        ctx: &MutationContext,
        draft: AssignmentDraft,
    ) -> Result<MutationOutcome, ScheduleError> {
        self.validate(&draft.target, &draft.range)?;
        self.require_crew_member(draft.crew_member_id)?;
        self.require_target(&draft.target)?;

        self.reject_conflicts(ctx, draft.crew_member_id, &draft.range, None)?;

        let mut assignment = Assignment::new(draft.crew_member_id, draft.target, draft.range);
        assignment.role_on_project = draft.role_on_project;

        self.store
            .insert_assignment(&assignment)
            .map_err(|err| self.write_error(ctx, err))?;

        tracing::info!(
            actor = ctx.actor(),
            assignment_id = %assignment.id,
            crew_member_id = %assignment.crew_member_id,
            range = %assignment.range,
            "assignment created"
        );

        let status_update = self.mark_busy_if_started(ctx, &assignment);
        Ok(MutationOutcome {
            assignment,
            status_update,
        })
    }

    /// Edits dates, role, or target of an assignment.
    ///
    /// The conflict check runs over the new range and ignores the
    /// assignment's own current row.
    pub fn update(
        &self,
        ctx: &MutationContext,
        id: AssignmentId,
        changes: AssignmentChanges,
    ) -> Result<MutationOutcome, ScheduleError> {
        let current = self
            .store
            .assignment(id)?
            .ok_or(ScheduleError::AssignmentNotFound(id))?;

        let target_changed = changes.target.is_some();
        let assignment = changes.apply_to(current);

        self.validate(&assignment.target, &assignment.range)?;
        if target_changed {
            self.require_target(&assignment.target)?;
        }

        self.reject_conflicts(ctx, assignment.crew_member_id, &assignment.range, Some(id))?;

        self.store
            .update_assignment(&assignment)
            .map_err(|err| match err {
                StoreError::NotFound { .. } => ScheduleError::AssignmentNotFound(id),
                other => self.write_error(ctx, other),
            })?;

        tracing::info!(
            actor = ctx.actor(),
            assignment_id = %assignment.id,
            crew_member_id = %assignment.crew_member_id,
            range = %assignment.range,
            "assignment updated"
        );

        let status_update = self.mark_busy_if_started(ctx, &assignment);
        Ok(MutationOutcome {
            assignment,
            status_update,
        })
    }

    /// Moves or resizes an assignment to `range` (drag commit).
    pub fn reschedule(
        &self,
        ctx: &MutationContext,
        id: AssignmentId,
        range: DateRange,
    ) -> Result<MutationOutcome, ScheduleError> {
        self.update(ctx, id, AssignmentChanges::new().with_range(range))
    }

    /// Shifts an assignment by `days`, keeping its length (drag move).
    pub fn move_by_days(
        &self,
        ctx: &MutationContext,
        id: AssignmentId,
        days: i64,
    ) -> Result<MutationOutcome, ScheduleError> {
        let current = self
            .store
            .assignment(id)?
            .ok_or(ScheduleError::AssignmentNotFound(id))?;
        let range = current
            .range
            .shifted(days)
            .ok_or(ScheduleError::MoveOutOfRange(days))?;
        self.reschedule(ctx, id, range)
    }

    /// Deletes an assignment.
    ///
    /// Afterwards, if none of the crew member's remaining assignments
    /// covers today, the stored status is reset to `available`. Crew on
    /// leave keep `on_leave`.
    pub fn delete(
        &self,
        ctx: &MutationContext,
        id: AssignmentId,
    ) -> Result<DeleteOutcome, ScheduleError> {
        let removed = self
            .store
            .delete_assignment(id)?
            .ok_or(ScheduleError::AssignmentNotFound(id))?;

        tracing::info!(
            actor = ctx.actor(),
            assignment_id = %removed.id,
            crew_member_id = %removed.crew_member_id,
            "assignment deleted"
        );

        let status_update = match self.store.assignments_for_crew(removed.crew_member_id) {
            Ok(remaining) if has_current_assignment(&remaining, ctx.today) => StatusUpdate::Unchanged,
            Ok(_) => self.write_status(ctx, removed.crew_member_id, CrewStatus::Available),
            Err(err) => {
                tracing::warn!(
                    actor = ctx.actor(),
                    crew_member_id = %removed.crew_member_id,
                    error = %err,
                    "could not re-derive crew status after delete"
                );
                StatusUpdate::Failed {
                    intended: None,
                    reason: err.to_string(),
                }
            }
        };

        Ok(DeleteOutcome {
            removed,
            status_update,
        })
    }

    fn validate(&self, target: &AssignmentTarget, range: &DateRange) -> Result<(), ScheduleError> {
        let errors: Vec<_> = [
            validate_target(target),
            validate_range_length(range, self.config.max_assignment_days),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScheduleError::Validation(errors))
        }
    }

    fn require_crew_member(&self, id: CrewId) -> Result<(), ScheduleError> {
        match self.store.crew_member(id)? {
            Some(_) => Ok(()),
            None => Err(ScheduleError::CrewMemberNotFound(id)),
        }
    }

    fn require_target(&self, target: &AssignmentTarget) -> Result<(), ScheduleError> {
        if let Some(project_id) = target.project_id() {
            match self.store.project(project_id)? {
                None => return Err(ScheduleError::ProjectNotFound(project_id)),
                Some(project) if !project.is_open() => {
                    return Err(ScheduleError::ProjectClosed(project_id, project.status));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn reject_conflicts(
        &self,
        ctx: &MutationContext,
        crew_member_id: CrewId,
        range: &DateRange,
        exclude: Option<AssignmentId>,
    ) -> Result<(), ScheduleError> {
        let report = self.check_conflicts(crew_member_id, range, exclude)?;
        if report.has_conflict() {
            tracing::warn!(
                actor = ctx.actor(),
                crew_member_id = %crew_member_id,
                range = %range,
                conflicts = ?report.labels(),
                "assignment rejected: conflict"
            );
            return Err(ScheduleError::Conflict(report.conflicting));
        }
        Ok(())
    }

    /// Maps a failed assignment write. Exclusion violations become conflicts.
    fn write_error(&self, ctx: &MutationContext, err: StoreError) -> ScheduleError {
        let StoreError::ExclusionViolation {
            crew_member_id,
            existing,
        } = err
        else {
            return ScheduleError::Store(err);
        };

        tracing::warn!(
            actor = ctx.actor(),
            crew_member_id = %crew_member_id,
            existing = %existing,
            "assignment rejected by exclusion constraint"
        );

        let checker = ConflictChecker::new(&self.store);
        match self.store.assignment(existing) {
            Ok(Some(found)) => match checker.describe(&found) {
                Ok(item) => ScheduleError::Conflict(vec![item]),
                Err(store_err) => ScheduleError::Store(store_err),
            },
            // The blocking row is gone again; the write can simply be retried.
            Ok(None) => ScheduleError::Store(err),
            Err(store_err) => ScheduleError::Store(store_err),
        }
    }

    fn mark_busy_if_started(&self, ctx: &MutationContext, assignment: &Assignment) -> StatusUpdate {
        if assignment.range.start <= ctx.today {
            self.write_status(ctx, assignment.crew_member_id, CrewStatus::OnProject)
        } else {
            StatusUpdate::Unchanged
        }
    }

    /// Best-effort status write. A stored `on_leave` is never overwritten.
    fn write_status(&self, ctx: &MutationContext, crew_member_id: CrewId, status: CrewStatus) -> StatusUpdate {
        let current = match self.store.crew_member(crew_member_id) {
            Ok(member) => member.map(|m| m.status),
            Err(err) => return Self::status_failed(ctx, crew_member_id, status, err),
        };
        if current == Some(CrewStatus::OnLeave) {
            tracing::debug!(
                actor = ctx.actor(),
                crew_member_id = %crew_member_id,
                "crew member on leave; stored status kept"
            );
            return StatusUpdate::Unchanged;
        }

        match self.store.set_crew_status(crew_member_id, status) {
            Ok(()) => {
                tracing::debug!(
                    actor = ctx.actor(),
                    crew_member_id = %crew_member_id,
                    status = %status,
                    "crew status updated"
                );
                StatusUpdate::Set { status }
            }
            Err(err) => Self::status_failed(ctx, crew_member_id, status, err),
        }
    }

    fn status_failed(
        ctx: &MutationContext,
        crew_member_id: CrewId,
        status: CrewStatus,
        err: StoreError,
    ) -> StatusUpdate {
        tracing::warn!(
            actor = ctx.actor(),
            crew_member_id = %crew_member_id,
            status = %status,
            error = %err,
            "crew status update failed; assignment write kept"
        );
        StatusUpdate::Failed {
            intended: Some(status),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CrewMember, Project, ProjectStatus};
    use crate::store::{MemoryStore, StoreFaults};
    use crate::validation::ValidationErrorKind;
    use rstest::rstest;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn range(a: NaiveDate, b: NaiveDate) -> DateRange {
        DateRange::new(a, b).unwrap()
    }

    struct Fixture {
        gate: AssignmentGate<MemoryStore>,
        crew: CrewId,
        project: ProjectId,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let crew = CrewMember::new("Lena Voss").with_role("Second Engineer");
        let project = Project::new("MV Aurora");
        let ids = (crew.id, project.id);
        store.add_crew_member(crew);
        store.add_project(project);
        Fixture {
            gate: AssignmentGate::new(store, SchedulerConfig::default()),
            crew: ids.0,
            project: ids.1,
        }
    }

    fn stored_status(f: &Fixture) -> CrewStatus {
        f.gate.store().crew_member(f.crew).unwrap().unwrap().status
    }

    #[test]
    fn test_create_current_assignment_marks_on_project() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 5)).with_actor("planner@fleet");
        let out = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(1, 1), d(1, 10))).with_role("Bosun"))
            .unwrap();

        assert_eq!(out.status_update, StatusUpdate::Set { status: CrewStatus::OnProject });
        assert_eq!(out.assignment.role_on_project.as_deref(), Some("Bosun"));
        assert_eq!(stored_status(&f), CrewStatus::OnProject);
    }

    #[test]
    fn test_create_starting_today_marks_on_project() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 1));
        let out = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(1, 1), d(1, 3))))
            .unwrap();
        assert_eq!(out.status_update, StatusUpdate::Set { status: CrewStatus::OnProject });
    }

    #[test]
    fn test_create_future_assignment_leaves_status() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 1));
        let out = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(3, 1), d(3, 10))))
            .unwrap();
        assert_eq!(out.status_update, StatusUpdate::Unchanged);
        assert_eq!(stored_status(&f), CrewStatus::Available);
    }

    #[test]
    fn test_create_conflict_names_existing() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 1));
        f.gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(2, 15), d(2, 25))))
            .unwrap();

        let err = f
            .gate
            .create(&ctx, AssignmentDraft::training(f.crew, "HUET", range(d(2, 10), d(2, 20))))
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.conflicts()[0].label, "MV Aurora");
        assert!(err.to_string().contains("MV Aurora"));
        assert_eq!(f.gate.store().snapshot().assignment_count(), 1);
    }

    #[test]
    fn test_create_validation_runs_first() {
        let f = fixture();
        f.gate.store().set_faults(StoreFaults {
            reads: true,
            ..StoreFaults::default()
        });
        let err = f
            .gate
            .create(
                &MutationContext::new(d(1, 1)),
                AssignmentDraft::training(f.crew, "  ", range(d(1, 1), d(1, 2))),
            )
            .unwrap_err();
        match err {
            ScheduleError::Validation(errors) => {
                assert_eq!(errors[0].kind, ValidationErrorKind::BlankTrainingDescription)
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_max_length() {
        let store = MemoryStore::new();
        let crew = CrewMember::new("Short Hitch");
        let crew_id = crew.id;
        store.add_crew_member(crew);
        let gate = AssignmentGate::new(store, SchedulerConfig::default().with_max_assignment_days(14));

        let err = gate
            .create(
                &MutationContext::new(d(1, 1)),
                AssignmentDraft::training(crew_id, "Long course", range(d(1, 1), d(1, 15))),
            )
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
    }

    #[test]
    fn test_create_unknown_references() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 1));
        let ghost = CrewId::new();
        assert_eq!(
            f.gate
                .create(&ctx, AssignmentDraft::training(ghost, "x", range(d(1, 1), d(1, 2))))
                .unwrap_err(),
            ScheduleError::CrewMemberNotFound(ghost)
        );

        let no_ship = ProjectId::new();
        assert_eq!(
            f.gate
                .create(&ctx, AssignmentDraft::vessel(f.crew, no_ship, range(d(1, 1), d(1, 2))))
                .unwrap_err(),
            ScheduleError::ProjectNotFound(no_ship)
        );
    }

    #[test]
    fn test_read_failure_blocks_write() {
        let f = fixture();
        f.gate.store().set_faults(StoreFaults {
            reads: true,
            ..StoreFaults::default()
        });
        let err = f
            .gate
            .create(
                &MutationContext::new(d(1, 1)),
                AssignmentDraft::vessel(f.crew, f.project, range(d(1, 1), d(1, 2))),
            )
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Store(StoreError::Unavailable(_))));
        assert_eq!(f.gate.store().snapshot().assignment_count(), 0);
    }

    #[test]
    fn test_update_excludes_self() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 1));
        let a = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(2, 1), d(2, 10))))
            .unwrap()
            .assignment;

        let out = f
            .gate
            .update(
                &ctx,
                a.id,
                AssignmentChanges::new()
                    .with_range(range(d(2, 5), d(2, 15)))
                    .with_role(Some("Master".into())),
            )
            .unwrap();
        assert_eq!(out.assignment.range, range(d(2, 5), d(2, 15)));
        assert_eq!(out.assignment.role_on_project.as_deref(), Some("Master"));
    }

    #[test]
    fn test_update_conflicts_with_other() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 1));
        let first = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(2, 1), d(2, 10))))
            .unwrap()
            .assignment;
        let second = f
            .gate
            .create(&ctx, AssignmentDraft::training(f.crew, "GMDSS", range(d(2, 20), d(2, 22))))
            .unwrap()
            .assignment;

        let err = f.gate.reschedule(&ctx, second.id, range(d(2, 10), d(2, 12))).unwrap_err();
        assert_eq!(err.conflicts()[0].id, first.id);

        // Stored row untouched.
        let stored = f.gate.store().assignment(second.id).unwrap().unwrap();
        assert_eq!(stored.range, range(d(2, 20), d(2, 22)));
    }

    #[test]
    fn test_update_into_present_marks_on_project() {
        let f = fixture();
        let ctx = MutationContext::new(d(2, 1));
        let a = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(3, 1), d(3, 10))))
            .unwrap()
            .assignment;
        assert_eq!(stored_status(&f), CrewStatus::Available);

        let out = f.gate.reschedule(&ctx, a.id, range(d(1, 25), d(2, 3))).unwrap();
        assert_eq!(out.status_update, StatusUpdate::Set { status: CrewStatus::OnProject });
    }

    #[test]
    fn test_update_target_to_missing_project() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 1));
        let a = f
            .gate
            .create(&ctx, AssignmentDraft::training(f.crew, "Basic safety", range(d(5, 1), d(5, 3))))
            .unwrap()
            .assignment;
        let ghost = ProjectId::new();
        let err = f
            .gate
            .update(&ctx, a.id, AssignmentChanges::new().with_target(AssignmentTarget::vessel(ghost)))
            .unwrap_err();
        assert_eq!(err, ScheduleError::ProjectNotFound(ghost));
    }

    #[test]
    fn test_update_missing_assignment() {
        let f = fixture();
        let id = AssignmentId::new();
        let err = f
            .gate
            .reschedule(&MutationContext::new(d(1, 1)), id, range(d(1, 1), d(1, 2)))
            .unwrap_err();
        assert_eq!(err, ScheduleError::AssignmentNotFound(id));
    }

    #[test]
    fn test_move_by_days() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 1));
        let a = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(4, 1), d(4, 10))))
            .unwrap()
            .assignment;

        let out = f.gate.move_by_days(&ctx, a.id, 7).unwrap();
        assert_eq!(out.assignment.range, range(d(4, 8), d(4, 17)));

        let err = f.gate.move_by_days(&ctx, a.id, i64::MAX).unwrap_err();
        assert_eq!(err, ScheduleError::MoveOutOfRange(i64::MAX));
    }

    #[test]
    fn test_delete_only_current_resets_available() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 5));
        let a = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(1, 1), d(1, 10))))
            .unwrap()
            .assignment;
        assert_eq!(stored_status(&f), CrewStatus::OnProject);

        let out = f.gate.delete(&ctx, a.id).unwrap();
        assert_eq!(out.removed.id, a.id);
        assert_eq!(out.status_update, StatusUpdate::Set { status: CrewStatus::Available });
        assert_eq!(stored_status(&f), CrewStatus::Available);
    }

    #[test]
    fn test_delete_keeps_status_when_another_covers_today() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 15));
        let past = f
            .gate
            .create(&ctx, AssignmentDraft::training(f.crew, "Refresher", range(d(1, 1), d(1, 5))))
            .unwrap()
            .assignment;
        f.gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(1, 10), d(1, 20))))
            .unwrap();

        let out = f.gate.delete(&ctx, past.id).unwrap();
        assert_eq!(out.status_update, StatusUpdate::Unchanged);
        assert_eq!(stored_status(&f), CrewStatus::OnProject);
    }

    #[test]
    fn test_delete_missing() {
        let f = fixture();
        let id = AssignmentId::new();
        assert_eq!(
            f.gate.delete(&MutationContext::new(d(1, 1)), id).unwrap_err(),
            ScheduleError::AssignmentNotFound(id)
        );
    }

    #[test]
    fn test_on_leave_survives_create_and_delete() {
        let f = fixture();
        f.gate.store().set_crew_status(f.crew, CrewStatus::OnLeave).unwrap();
        let ctx = MutationContext::new(d(1, 5));

        let future = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(2, 1), d(2, 10))))
            .unwrap();
        assert_eq!(stored_status(&f), CrewStatus::OnLeave);

        let current = f
            .gate
            .create(&ctx, AssignmentDraft::training(f.crew, "Medical care", range(d(1, 1), d(1, 6))))
            .unwrap();
        assert_eq!(current.status_update, StatusUpdate::Unchanged);
        assert_eq!(stored_status(&f), CrewStatus::OnLeave);

        let out = f.gate.delete(&ctx, future.assignment.id).unwrap();
        assert_eq!(out.status_update, StatusUpdate::Unchanged);
        f.gate.delete(&ctx, current.assignment.id).unwrap();
        assert_eq!(stored_status(&f), CrewStatus::OnLeave);

        let own = f.gate.store().assignments_for_crew(f.crew).unwrap();
        assert_eq!(
            crate::status::derive_status(stored_status(&f), &own, ctx.today),
            crate::models::DisplayStatus::OnLeave
        );
    }

    #[test]
    fn test_delete_status_write_failure_keeps_delete() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 5));
        let a = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(1, 1), d(1, 10))))
            .unwrap()
            .assignment;
        f.gate.store().set_faults(StoreFaults {
            status_writes: true,
            ..StoreFaults::default()
        });

        let out = f.gate.delete(&ctx, a.id).unwrap();
        assert!(matches!(
            out.status_update,
            StatusUpdate::Failed { intended: Some(CrewStatus::Available), .. }
        ));
        assert!(f.gate.store().assignment(a.id).unwrap().is_none());
        assert_eq!(stored_status(&f), CrewStatus::OnProject);
    }

    #[test]
    fn test_delete_read_failure_reports_unknown_status() {
        let f = fixture();
        let ctx = MutationContext::new(d(1, 5));
        let a = f
            .gate
            .create(&ctx, AssignmentDraft::vessel(f.crew, f.project, range(d(1, 1), d(1, 10))))
            .unwrap()
            .assignment;
        f.gate.store().set_faults(StoreFaults {
            reads: true,
            ..StoreFaults::default()
        });

        let out = f.gate.delete(&ctx, a.id).unwrap();
        assert!(matches!(out.status_update, StatusUpdate::Failed { intended: None, .. }));
        assert_eq!(out.removed.id, a.id);

        f.gate.store().set_faults(StoreFaults::default());
        assert!(f.gate.store().assignment(a.id).unwrap().is_none());
        assert_eq!(stored_status(&f), CrewStatus::OnProject);
    }

    #[rstest]
    #[case(ProjectStatus::Completed)]
    #[case(ProjectStatus::Cancelled)]
    fn test_closed_project_rejected(#[case] status: ProjectStatus) {
        let f = fixture();
        let closed = Project::new("MV Laid Up").with_status(status);
        let closed_id = closed.id;
        f.gate.store().add_project(closed);

        let err = f
            .gate
            .create(
                &MutationContext::new(d(1, 1)),
                AssignmentDraft::vessel(f.crew, closed_id, range(d(1, 1), d(1, 5))),
            )
            .unwrap_err();
        assert_eq!(err, ScheduleError::ProjectClosed(closed_id, status));
        assert_eq!(f.gate.store().snapshot().assignment_count(), 0);
    }

    #[test]
    fn test_planned_project_accepted() {
        let f = fixture();
        let planned = Project::new("MV Newbuild").with_status(ProjectStatus::Planned);
        let planned_id = planned.id;
        f.gate.store().add_project(planned);

        f.gate
            .create(
                &MutationContext::new(d(1, 1)),
                AssignmentDraft::vessel(f.crew, planned_id, range(d(3, 1), d(3, 5))),
            )
            .unwrap();
    }

    #[test]
    fn test_status_failure_keeps_assignment() {
        let f = fixture();
        f.gate.store().set_faults(StoreFaults {
            status_writes: true,
            ..StoreFaults::default()
        });
        let out = f
            .gate
            .create(
                &MutationContext::new(d(1, 5)),
                AssignmentDraft::vessel(f.crew, f.project, range(d(1, 1), d(1, 10))),
            )
            .unwrap();

        assert!(matches!(
            out.status_update,
            StatusUpdate::Failed { intended: Some(CrewStatus::OnProject), .. }
        ));
        // Not rolled back: the assignment is stored, the status is stale.
        assert!(f.gate.store().assignment(out.assignment.id).unwrap().is_some());
        assert_eq!(stored_status(&f), CrewStatus::Available);
    }

    #[test]
    fn test_exclusion_violation_reported_as_conflict() {
        let store = MemoryStore::new().with_exclusion(true);
        let crew = CrewMember::new("Raced");
        let project = Project::new("MV Aurora");
        let (crew_id, project_id) = (crew.id, project.id);
        store.add_crew_member(crew);
        store.add_project(project);
        let gate = AssignmentGate::new(store, SchedulerConfig::default());

        let earlier = Assignment::vessel(crew_id, project_id, range(d(1, 1), d(1, 10)));
        let err = gate.write_error(
            &MutationContext::new(d(1, 1)),
            StoreError::ExclusionViolation {
                crew_member_id: crew_id,
                existing: earlier.id,
            },
        );
        // Row not present: surfaced as the raw store error.
        assert!(matches!(err, ScheduleError::Store(StoreError::ExclusionViolation { .. })));

        gate.store().seed_assignment(earlier.clone());
        let err = gate.write_error(
            &MutationContext::new(d(1, 1)),
            StoreError::ExclusionViolation {
                crew_member_id: crew_id,
                existing: earlier.id,
            },
        );
        assert_eq!(err.conflicts()[0].label, "MV Aurora");
    }
}

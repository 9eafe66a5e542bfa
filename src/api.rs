//! Request handlers at the scheduling core's boundary.
//!
//! Each handler takes a typed request (ISO date strings as sent by the
//! dashboard), the gate, a [`Clock`], and the acting user, and returns a
//! typed `Result`. [`handle`] dispatches a tagged [`ApiRequest`] and
//! serializes the result as `{"ok": ...}` or `{"error": "...", ...}`.
//!
//! Store failures never leak their details to the caller: the response
//! carries a generic message and the cause is logged.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::clock::Clock;
use crate::conflict::ConflictingAssignment;
use crate::error::ScheduleError;
use crate::gate::{
    AssignmentChanges, AssignmentDraft, AssignmentGate, DeleteOutcome, MutationContext,
    MutationOutcome,
};
use crate::models::{
    Assignment, AssignmentId, AssignmentTarget, AssignmentType, CrewId, CrewStatus, DateRange,
    DisplayStatus, ProjectId,
};
use crate::status;
use crate::store::ScheduleStore;
use crate::validation::{parse_date, parse_range};

const GENERIC_FAILURE: &str = "The schedule could not be updated right now. Please try again.";

/// Conflict check input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    /// Crew member to check.
    pub crew_member_id: CrewId,
    /// Candidate first day (`YYYY-MM-DD`).
    pub start_date: String,
    /// Candidate last day (`YYYY-MM-DD`).
    pub end_date: String,
    /// Assignment being edited, ignored by the check.
    #[serde(default)]
    pub exclude_assignment_id: Option<AssignmentId>,
}

/// Conflict check output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    /// Whether anything overlaps.
    pub has_conflict: bool,
    /// Overlapping assignments.
    pub conflicting: Vec<ConflictingAssignment>,
}

/// Create input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    /// Crew member to book.
    pub crew_member_id: CrewId,
    /// `assignment_type` plus `project_id` or `description`.
    #[serde(flatten)]
    pub target: AssignmentTarget,
    /// First day.
    pub start_date: String,
    /// Last day.
    pub end_date: String,
    /// Role on project.
    #[serde(default)]
    pub role_on_project: Option<String>,
}

/// Date/role edit input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAssignmentRequest {
    /// Assignment to edit.
    pub assignment_id: AssignmentId,
    /// New first day.
    pub start_date: String,
    /// New last day.
    pub end_date: String,
    /// New role: absent keeps the current one, `null` clears it.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub role_on_project: Option<Option<String>>,
}

/// Drag move input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAssignmentRequest {
    /// Assignment being dragged.
    pub assignment_id: AssignmentId,
    /// Days to shift (negative = earlier).
    pub days: i64,
}

/// Delete input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAssignmentRequest {
    /// Assignment to remove.
    pub assignment_id: AssignmentId,
}

/// One assignment as seen by the status deriver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAssignment {
    /// First day.
    pub start_date: String,
    /// Last day.
    pub end_date: String,
    /// Vessel or training.
    pub assignment_type: AssignmentType,
}

/// Status derivation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveStatusRequest {
    /// Persisted status.
    pub stored_status: CrewStatus,
    /// The member's assignments.
    #[serde(default)]
    pub assignments: Vec<StatusAssignment>,
    /// Day to derive for; defaults to the clock's today.
    #[serde(default)]
    pub today: Option<String>,
}

/// Status derivation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveStatusResponse {
    /// Display status.
    pub status: DisplayStatus,
}

/// A boundary request, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ApiRequest {
    /// Read-only conflict check.
    CheckConflicts(ConflictCheckRequest),
    /// Create.
    CreateAssignment(CreateAssignmentRequest),
    /// Date/role edit.
    UpdateAssignment(UpdateAssignmentRequest),
    /// Drag move.
    MoveAssignment(MoveAssignmentRequest),
    /// Delete.
    DeleteAssignment(DeleteAssignmentRequest),
    /// Pure status derivation.
    DeriveStatus(DeriveStatusRequest),
}

/// Error category reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Rejected before any check ran.
    InvalidInput,
    /// Overlaps existing assignments.
    Conflict,
    /// Referenced entity missing.
    NotFound,
    /// Store failure; retry later.
    Unavailable,
}

/// Error returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Category.
    pub kind: ApiErrorKind,
    /// Human-readable message.
    pub error: String,
    /// Conflicting items, for `conflict` errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicting: Vec<ConflictingAssignment>,
}

impl ApiError {
    fn new(kind: ApiErrorKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            error: error.into(),
            conflicting: Vec::new(),
        }
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Validation(_)
            | ScheduleError::MoveOutOfRange(_)
            | ScheduleError::ProjectClosed(..) => {
                Self::new(ApiErrorKind::InvalidInput, err.to_string())
            }
            ScheduleError::Conflict(ref items) => Self {
                kind: ApiErrorKind::Conflict,
                error: err.to_string(),
                conflicting: items.clone(),
            },
            ScheduleError::CrewMemberNotFound(_)
            | ScheduleError::ProjectNotFound(_)
            | ScheduleError::AssignmentNotFound(_) => {
                Self::new(ApiErrorKind::NotFound, err.to_string())
            }
            ScheduleError::Store(ref cause) => {
                tracing::error!(error = %cause, "scheduling request failed in store");
                Self::new(ApiErrorKind::Unavailable, GENERIC_FAILURE)
            }
        }
    }
}

/// Maps a present field to `Some`, so `null` reads as `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn context(clock: &dyn Clock, actor: Option<&str>) -> MutationContext {
    let ctx = MutationContext::from_clock(clock);
    match actor {
        Some(actor) => ctx.with_actor(actor),
        None => ctx,
    }
}

fn range(start: &str, end: &str) -> Result<DateRange, ApiError> {
    parse_range(start, end).map_err(|errors| ScheduleError::Validation(errors).into())
}

/// Checks a candidate range for conflicts. Read-only.
pub fn check_conflicts<S: ScheduleStore>(
    gate: &AssignmentGate<S>,
    req: ConflictCheckRequest,
) -> Result<ConflictCheckResponse, ApiError> {
    let range = range(&req.start_date, &req.end_date)?;
    let report = gate.check_conflicts(req.crew_member_id, &range, req.exclude_assignment_id)?;
    Ok(ConflictCheckResponse {
        has_conflict: report.has_conflict(),
        conflicting: report.conflicting,
    })
}

/// Creates an assignment.
pub fn create_assignment<S: ScheduleStore>(
    gate: &AssignmentGate<S>,
    clock: &dyn Clock,
    actor: Option<&str>,
    req: CreateAssignmentRequest,
) -> Result<MutationOutcome, ApiError> {
    let range = range(&req.start_date, &req.end_date)?;
    let draft = AssignmentDraft {
        crew_member_id: req.crew_member_id,
        target: req.target,
        range,
        role_on_project: req.role_on_project,
    };
    Ok(gate.create(&context(clock, actor), draft)?)
}

/// Edits dates and role of an assignment.
pub fn update_assignment<S: ScheduleStore>(
    gate: &AssignmentGate<S>,
    clock: &dyn Clock,
    actor: Option<&str>,
    req: UpdateAssignmentRequest,
) -> Result<MutationOutcome, ApiError> {
    let range = range(&req.start_date, &req.end_date)?;
    let mut changes = AssignmentChanges::new().with_range(range);
    if let Some(role) = req.role_on_project {
        changes = changes.with_role(role);
    }
    Ok(gate.update(&context(clock, actor), req.assignment_id, changes)?)
}

/// Commits a drag move.
pub fn move_assignment<S: ScheduleStore>(
    gate: &AssignmentGate<S>,
    clock: &dyn Clock,
    actor: Option<&str>,
    req: MoveAssignmentRequest,
) -> Result<MutationOutcome, ApiError> {
    Ok(gate.move_by_days(&context(clock, actor), req.assignment_id, req.days)?)
}

/// Deletes an assignment.
pub fn delete_assignment<S: ScheduleStore>(
    gate: &AssignmentGate<S>,
    clock: &dyn Clock,
    actor: Option<&str>,
    req: DeleteAssignmentRequest,
) -> Result<DeleteOutcome, ApiError> {
    Ok(gate.delete(&context(clock, actor), req.assignment_id)?)
}

/// Derives a display status. No I/O.
pub fn derive_status(
    clock: &dyn Clock,
    req: DeriveStatusRequest,
) -> Result<DeriveStatusResponse, ApiError> {
    let today: NaiveDate = match req.today.as_deref() {
        Some(raw) => parse_date("today", raw).map_err(ScheduleError::from)?,
        None => clock.today(),
    };

    // The deriver only looks at ranges and types; ids and targets are placeholders.
    let crew = CrewId::new();
    let mut assignments = Vec::with_capacity(req.assignments.len());
    for item in req.assignments {
        let range = range(&item.start_date, &item.end_date)?;
        let target = match item.assignment_type {
            AssignmentType::Vessel => AssignmentTarget::vessel(ProjectId::new()),
            AssignmentType::Training => AssignmentTarget::training("training"),
        };
        assignments.push(Assignment::new(crew, target, range));
    }

    Ok(DeriveStatusResponse {
        status: status::derive_status(req.stored_status, &assignments, today),
    })
}

/// Dispatches a request and renders `{"ok": ...}` or the error object.
pub fn handle<S: ScheduleStore>(
    gate: &AssignmentGate<S>,
    clock: &dyn Clock,
    actor: Option<&str>,
    request: ApiRequest,
) -> Value {
    let result = match request {
        ApiRequest::CheckConflicts(req) => check_conflicts(gate, req).and_then(to_value),
        ApiRequest::CreateAssignment(req) => {
            create_assignment(gate, clock, actor, req).and_then(to_value)
        }
        ApiRequest::UpdateAssignment(req) => {
            update_assignment(gate, clock, actor, req).and_then(to_value)
        }
        ApiRequest::MoveAssignment(req) => {
            move_assignment(gate, clock, actor, req).and_then(to_value)
        }
        ApiRequest::DeleteAssignment(req) => {
            delete_assignment(gate, clock, actor, req).and_then(to_value)
        }
        ApiRequest::DeriveStatus(req) => derive_status(clock, req).and_then(to_value),
    };

    match result {
        Ok(value) => json!({ "ok": value }),
        Err(err) => serde_json::to_value(&err)
            .unwrap_or_else(|_| json!({ "error": err.error, "kind": err.kind })),
    }
}

/// Parses a JSON request body, dispatches it, and renders the response.
pub fn handle_json<S: ScheduleStore>(
    gate: &AssignmentGate<S>,
    clock: &dyn Clock,
    actor: Option<&str>,
    body: &str,
) -> String {
    let response = match serde_json::from_str::<ApiRequest>(body) {
        Ok(request) => handle(gate, clock, actor, request),
        Err(err) => {
            let api_err = ApiError::new(ApiErrorKind::InvalidInput, format!("malformed request: {err}"));
            json!({ "kind": api_err.kind, "error": api_err.error })
        }
    };
    response.to_string()
}

fn to_value<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|err| {
        tracing::error!(error = %err, "response serialization failed");
        ApiError::new(ApiErrorKind::Unavailable, GENERIC_FAILURE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::SchedulerConfig;
    use crate::models::{CrewMember, Project, ProjectStatus};
    use crate::store::{MemoryStore, StoreFaults};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn setup() -> (AssignmentGate<MemoryStore>, CrewId, ProjectId) {
        let store = MemoryStore::new();
        let crew = CrewMember::new("Noor Haddad");
        let project = Project::new("MV Aurora");
        let ids = (crew.id, project.id);
        store.add_crew_member(crew);
        store.add_project(project);
        (AssignmentGate::new(store, SchedulerConfig::default()), ids.0, ids.1)
    }

    #[test]
    fn test_malformed_date_rejected_before_check() {
        let (gate, crew, _) = setup();
        gate.store().set_faults(StoreFaults {
            reads: true,
            ..StoreFaults::default()
        });
        let err = check_conflicts(
            &gate,
            ConflictCheckRequest {
                crew_member_id: crew,
                start_date: "2024-02-31".into(),
                end_date: "2024-03-01".into(),
                exclude_assignment_id: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InvalidInput);
    }

    #[test]
    fn test_store_failure_is_generic() {
        let (gate, crew, _) = setup();
        gate.store().set_faults(StoreFaults {
            reads: true,
            ..StoreFaults::default()
        });
        let err = check_conflicts(
            &gate,
            ConflictCheckRequest {
                crew_member_id: crew,
                start_date: "2024-02-01".into(),
                end_date: "2024-03-01".into(),
                exclude_assignment_id: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unavailable);
        assert_eq!(err.error, GENERIC_FAILURE);
    }

    #[test]
    fn test_create_then_conflict() {
        let (gate, crew, project) = setup();
        let clock = FixedClock(d(1, 1));
        create_assignment(
            &gate,
            &clock,
            Some("ops"),
            CreateAssignmentRequest {
                crew_member_id: crew,
                target: AssignmentTarget::vessel(project),
                start_date: "2024-02-15".into(),
                end_date: "2024-02-25".into(),
                role_on_project: None,
            },
        )
        .unwrap();

        let err = create_assignment(
            &gate,
            &clock,
            Some("ops"),
            CreateAssignmentRequest {
                crew_member_id: crew,
                target: AssignmentTarget::training("Survival craft"),
                start_date: "2024-02-10".into(),
                end_date: "2024-02-20".into(),
                role_on_project: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Conflict);
        assert!(err.error.contains("MV Aurora"));
        assert_eq!(err.conflicting.len(), 1);
    }

    #[test]
    fn test_update_role_absent_keeps_null_clears() {
        let (gate, crew, project) = setup();
        let clock = FixedClock(d(1, 1));
        let created = create_assignment(
            &gate,
            &clock,
            None,
            CreateAssignmentRequest {
                crew_member_id: crew,
                target: AssignmentTarget::vessel(project),
                start_date: "2024-02-01".into(),
                end_date: "2024-02-10".into(),
                role_on_project: Some("Bosun".into()),
            },
        )
        .unwrap()
        .assignment;

        let dates_only: UpdateAssignmentRequest = serde_json::from_value(json!({
            "assignment_id": created.id,
            "start_date": "2024-02-03",
            "end_date": "2024-02-12",
        }))
        .unwrap();
        assert_eq!(dates_only.role_on_project, None);
        let moved = update_assignment(&gate, &clock, None, dates_only).unwrap().assignment;
        assert_eq!(moved.range, DateRange::new(d(2, 3), d(2, 12)).unwrap());
        assert_eq!(moved.role_on_project.as_deref(), Some("Bosun"));

        let cleared: ApiRequest = serde_json::from_value(json!({
            "action": "update_assignment",
            "assignment_id": created.id,
            "start_date": "2024-02-03",
            "end_date": "2024-02-12",
            "role_on_project": null,
        }))
        .unwrap();
        let ApiRequest::UpdateAssignment(cleared) = cleared else {
            panic!("expected update_assignment");
        };
        assert_eq!(cleared.role_on_project, Some(None));
        let out = update_assignment(&gate, &clock, None, cleared).unwrap().assignment;
        assert_eq!(out.role_on_project, None);
    }

    #[test]
    fn test_closed_project_is_invalid_input() {
        let (gate, crew, _) = setup();
        let finished = Project::new("MV Retired").with_status(ProjectStatus::Completed);
        let finished_id = finished.id;
        gate.store().add_project(finished);

        let err = create_assignment(
            &gate,
            &FixedClock(d(1, 1)),
            None,
            CreateAssignmentRequest {
                crew_member_id: crew,
                target: AssignmentTarget::vessel(finished_id),
                start_date: "2024-02-01".into(),
                end_date: "2024-02-10".into(),
                role_on_project: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InvalidInput);
        assert!(err.error.contains("completed"));
    }

    #[test]
    fn test_derive_status_handler() {
        let clock = FixedClock(d(1, 5));
        let req = DeriveStatusRequest {
            stored_status: CrewStatus::Available,
            assignments: vec![StatusAssignment {
                start_date: "2024-01-01".into(),
                end_date: "2024-01-10".into(),
                assignment_type: AssignmentType::Training,
            }],
            today: None,
        };
        assert_eq!(derive_status(&clock, req.clone()).unwrap().status, DisplayStatus::Training);

        let later = DeriveStatusRequest {
            today: Some("2024-01-15".into()),
            ..req
        };
        assert_eq!(derive_status(&clock, later).unwrap().status, DisplayStatus::Available);
    }

    #[test]
    fn test_derive_status_bad_today() {
        let req = DeriveStatusRequest {
            stored_status: CrewStatus::Available,
            assignments: vec![],
            today: Some("soon".into()),
        };
        let err = derive_status(&FixedClock(d(1, 1)), req).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InvalidInput);
    }
}

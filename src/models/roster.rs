//! Roster model.
//!
//! A roster is a snapshot of the scheduling data set: crew members,
//! projects, and the assignments linking them. It backs the in-memory
//! store and feeds the timeline and roster audit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{
    Assignment, AssignmentId, AssignmentTarget, CrewId, CrewMember, DateRange, Project, ProjectId,
};

/// Crew, projects, and assignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Crew members by id.
    pub crew: BTreeMap<CrewId, CrewMember>,
    /// Projects by id.
    pub projects: BTreeMap<ProjectId, Project>,
    /// All assignments, in insertion order.
    pub assignments: Vec<Assignment>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a crew member.
    pub fn add_crew_member(&mut self, member: CrewMember) {
        self.crew.insert(member.id, member);
    }

    /// Adds or replaces a project.
    pub fn add_project(&mut self, project: Project) {
        self.projects.insert(project.id, project);
    }

    /// Appends an assignment without any conflict check.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Looks up a crew member.
    pub fn crew_member(&self, id: CrewId) -> Option<&CrewMember> {
        self.crew.get(&id)
    }

    /// Looks up a project.
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(&id)
    }

    /// Looks up an assignment.
    pub fn assignment(&self, id: AssignmentId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// Removes an assignment, returning it.
    pub fn remove_assignment(&mut self, id: AssignmentId) -> Option<Assignment> {
        let pos = self.assignments.iter().position(|a| a.id == id)?;
        Some(self.assignments.remove(pos))
    }

    /// All assignments of a crew member, ordered by start date.
    pub fn assignments_for_crew(&self, crew_member_id: CrewId) -> Vec<&Assignment> {
        let mut found: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.crew_member_id == crew_member_id)
            .collect();
        found.sort_by_key(|a| (a.range.start, a.range.end));
        found
    }

    /// All assignments aboard a project, ordered by start date.
    pub fn assignments_for_project(&self, project_id: ProjectId) -> Vec<&Assignment> {
        let mut found: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.target.project_id() == Some(project_id))
            .collect();
        found.sort_by_key(|a| (a.range.start, a.range.end));
        found
    }

    /// Human-readable label: project name or training description.
    ///
    /// Falls back to the project id when the project is unknown.
    pub fn label_for(&self, assignment: &Assignment) -> String {
        label_for(&assignment.target, |id| {
            self.project(id).map(|p| p.name.clone())
        })
    }

    /// Distinct days a crew member is booked within `window`.
    pub fn booked_days(&self, crew_member_id: CrewId, window: &DateRange) -> i64 {
        let mut days: HashSet<NaiveDate> = HashSet::new();
        for a in self.assignments_for_crew(crew_member_id) {
            if let Some(clip) = a.range.intersection(window) {
                days.extend(clip.iter_days());
            }
        }
        days.len() as i64
    }

    /// Fraction of `window` a crew member is booked (0.0..=1.0).
    pub fn utilization(&self, crew_member_id: CrewId, window: &DateRange) -> f64 {
        self.booked_days(crew_member_id, window) as f64 / window.days() as f64
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}

/// Resolves the display label of an assignment target.
pub(crate) fn label_for(
    target: &AssignmentTarget,
    project_name: impl FnOnce(ProjectId) -> Option<String>,
) -> String {
    match target {
        AssignmentTarget::Vessel { project_id } => {
            project_name(*project_id).unwrap_or_else(|| format!("project {project_id}"))
        }
        AssignmentTarget::Training { description } => description.clone(),
    }
}

//! Timeline (Gantt) data.
//!
//! Turns a roster into per-crew rows of bars for a calendar window. The
//! dashboard renders these; this module only computes them.
//!
//! # Bars
//! Each assignment overlapping the window becomes one bar, clipped to the
//! window. A bar is flagged `conflict` when it overlaps another bar of
//! the same crew member, which only happens with data written outside
//! the mutation gate.
//!
//! # Metrics
//!
//! | Field | Definition |
//! |-------|-----------|
//! | `booked_days` | Distinct window days covered by any assignment |
//! | `utilization` | `booked_days / window days` |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::models::{
    AssignmentId, AssignmentType, CrewId, DateRange, DisplayStatus, Roster,
};
use crate::status::derive_status;
use crate::validation::{ValidationError, ValidationErrorKind};

/// One assignment drawn on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineBar {
    /// Source assignment.
    pub assignment_id: AssignmentId,
    /// Vessel or training.
    pub assignment_type: AssignmentType,
    /// Project name or training description.
    pub label: String,
    /// Bar color.
    pub color: String,
    /// Visible days (clipped to the window).
    pub visible: DateRange,
    /// Full assignment range.
    pub range: DateRange,
    /// The assignment starts before the window.
    pub clipped_start: bool,
    /// The assignment ends after the window.
    pub clipped_end: bool,
    /// Overlaps another bar in the same row.
    pub conflict: bool,
    /// Role on project.
    pub role_on_project: Option<String>,
}

/// One crew member's row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    /// Crew member.
    pub crew_member_id: CrewId,
    /// Display name.
    pub name: String,
    /// Role aboard.
    pub role: String,
    /// Derived status for the timeline's "today".
    pub status: DisplayStatus,
    /// Bars ordered by start date.
    pub bars: Vec<TimelineBar>,
    /// Distinct booked days inside the window.
    pub booked_days: i64,
    /// `booked_days / window days` (0.0..=1.0).
    pub utilization: f64,
}

/// Timeline for a window of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Visible days.
    pub window: DateRange,
    /// Rows ordered by crew name.
    pub rows: Vec<TimelineRow>,
}

impl Timeline {
    /// Builds the timeline for `window`.
    ///
    /// # Errors
    /// `RangeTooLong` if the window exceeds `config.max_timeline_days`.
    pub fn build(
        roster: &Roster,
        window: DateRange,
        today: NaiveDate,
        config: &SchedulerConfig,
    ) -> Result<Self, ValidationError> {
        if window.days() > i64::from(config.max_timeline_days) {
            return Err(ValidationError::new(
                ValidationErrorKind::RangeTooLong,
                format!(
                    "Timeline window {window} spans {} days; the maximum is {}",
                    window.days(),
                    config.max_timeline_days
                ),
            ));
        }

        let mut rows: Vec<TimelineRow> = roster
            .crew
            .values()
            .map(|member| {
                let own = roster.assignments_for_crew(member.id);
                let status = derive_status(member.status, own.iter().copied(), today);

                let mut bars: Vec<TimelineBar> = own
                    .iter()
                    .filter_map(|a| {
                        let visible = a.range.intersection(&window)?;
                        let color = match a.target.project_id() {
                            Some(id) => roster
                                .project(id)
                                .and_then(|p| p.color.clone())
                                .unwrap_or_else(|| config.fallback_color.clone()),
                            None => config.training_color.clone(),
                        };
                        Some(TimelineBar {
                            assignment_id: a.id,
                            assignment_type: a.assignment_type(),
                            label: roster.label_for(a),
                            color,
                            visible,
                            range: a.range,
                            clipped_start: a.range.start < window.start,
                            clipped_end: a.range.end > window.end,
                            conflict: false,
                            role_on_project: a.role_on_project.clone(),
                        })
                    })
                    .collect();
                flag_conflicts(&mut bars);

                let booked_days = roster.booked_days(member.id, &window);
                TimelineRow {
                    crew_member_id: member.id,
                    name: member.name.clone(),
                    role: member.role.clone(),
                    status,
                    bars,
                    booked_days,
                    utilization: booked_days as f64 / window.days() as f64,
                }
            })
            .collect();

        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.crew_member_id.cmp(&b.crew_member_id)));

        Ok(Self { window, rows })
    }

    /// Finds a crew member's row.
    pub fn row(&self, crew_member_id: CrewId) -> Option<&TimelineRow> {
        self.rows.iter().find(|r| r.crew_member_id == crew_member_id)
    }

    /// Mean utilization across rows (0.0 when empty).
    pub fn average_utilization(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.rows.iter().map(|r| r.utilization).sum::<f64>() / self.rows.len() as f64
    }

    /// Whether any bar is flagged as conflicting.
    pub fn has_conflicts(&self) -> bool {
        self.rows.iter().flat_map(|r| &r.bars).any(|b| b.conflict)
    }
}

/// Marks bars whose full ranges overlap another bar in the same row.
fn flag_conflicts(bars: &mut [TimelineBar]) {
    for i in 0..bars.len() {
        for j in (i + 1)..bars.len() {
            if bars[i].range.overlaps(&bars[j].range) {
                bars[i].conflict = true;
                bars[j].conflict = true;
            }
        }
    }
}

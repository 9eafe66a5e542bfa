//! Project (vessel) model.
//!
//! A project is the thing crew are assigned to: usually a vessel, but
//! the type is free-form (rig, barge, shore base). Projects carry a
//! lifecycle status, a display color for the timeline, and optional
//! date bounds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A vessel or other project crew can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: ProjectId,
    /// Vessel or project name, used as the conflict label.
    pub name: String,
    /// Free-form type (e.g., "vessel", "rig").
    pub project_type: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Timeline color (CSS hex, e.g., `#1f77b4`). `None` = fallback color.
    pub color: Option<String>,
    /// Planned start. `None` = open-ended.
    pub start_date: Option<NaiveDate>,
    /// Planned end. `None` = open-ended.
    pub end_date: Option<NaiveDate>,
    /// Client, flag state, and other metadata.
    pub attributes: HashMap<String, String>,
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Running.
    #[default]
    Active,
    /// Not started yet.
    Planned,
    /// Finished.
    Completed,
    /// Called off.
    Cancelled,
}

impl ProjectStatus {
    /// The status string as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Planned => "planned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Project {
    /// Creates an active vessel project with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(ProjectId::new(), name)
    }

    /// Creates an active vessel project with a known id.
    pub fn with_id(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            project_type: "vessel".to_string(),
            status: ProjectStatus::Active,
            color: None,
            start_date: None,
            end_date: None,
            attributes: HashMap::new(),
        }
    }

    /// Sets the project type.
    pub fn with_type(mut self, project_type: impl Into<String>) -> Self {
        self.project_type = project_type.into();
        self
    }

    /// Sets the lifecycle status.
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the timeline color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the date bounds.
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Adds a metadata attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether the project is still schedulable (active or planned).
    pub fn is_open(&self) -> bool {
        matches!(self.status, ProjectStatus::Active | ProjectStatus::Planned)
    }
}

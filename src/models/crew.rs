//! Crew member model.
//!
//! Crew members are the people scheduled onto vessels and training
//! events. Each carries a *stored* status, which is authoritative and
//! persisted, and can be shown with a *display* status derived from the
//! member's assignments (see [`crate::status`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Crew member identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrewId(pub Uuid);

impl CrewId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CrewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A schedulable crew member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    /// Unique identifier.
    pub id: CrewId,
    /// Full name.
    pub name: String,
    /// Rank or role aboard (e.g., "Chief Engineer", "Deckhand").
    pub role: String,
    /// Persisted status.
    pub status: CrewStatus,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Nationality, certificates, and other profile fields.
    pub attributes: HashMap<String, String>,
}

/// Persisted crew status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewStatus {
    /// Free to be scheduled.
    #[default]
    Available,
    /// Currently serving on a project.
    OnProject,
    /// On leave; overrides every derived status.
    OnLeave,
}

/// Status shown on the dashboard, derived from stored status and assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    /// No current or upcoming assignment.
    Available,
    /// Holds a vessel assignment covering today.
    OnProject,
    /// Stored as on leave.
    OnLeave,
    /// Only future assignments.
    Planned,
    /// Holds a training assignment covering today.
    Training,
}

impl CrewStatus {
    /// The status string as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnProject => "on_project",
            Self::OnLeave => "on_leave",
        }
    }
}

impl From<CrewStatus> for DisplayStatus {
    fn from(status: CrewStatus) -> Self {
        match status {
            CrewStatus::Available => Self::Available,
            CrewStatus::OnProject => Self::OnProject,
            CrewStatus::OnLeave => Self::OnLeave,
        }
    }
}

impl DisplayStatus {
    /// The status string as displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnProject => "on_project",
            Self::OnLeave => "on_leave",
            Self::Planned => "planned",
            Self::Training => "training",
        }
    }
}

impl fmt::Display for CrewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CrewMember {
    /// Creates an available crew member with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(CrewId::new(), name)
    }

    /// Creates an available crew member with a known id.
    pub fn with_id(id: CrewId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: String::new(),
            status: CrewStatus::Available,
            email: None,
            phone: None,
            attributes: HashMap::new(),
        }
    }

    /// Sets the role aboard.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Sets the stored status.
    pub fn with_status(mut self, status: CrewStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the contact phone.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Adds a profile attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether the stored status marks the member as on leave.
    pub fn is_on_leave(&self) -> bool {
        self.status == CrewStatus::OnLeave
    }
}

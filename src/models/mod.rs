//! Crew scheduling domain models.
//!
//! Provides the typed records the scheduling core works with. Every
//! entity has an explicit struct and validated constructors; nothing is
//! passed around as an untyped row.
//!
//! # Entities
//!
//! | Type | Dashboard term | Notes |
//! |------|----------------|-------|
//! | `CrewMember` | Crew | Stored status is authoritative |
//! | `Project` | Vessel | Lifecycle status and timeline color |
//! | `Assignment` | Booking | Vessel or training, inclusive day range |
//! | `Roster` | Data set | Snapshot of all three |

mod assignment;
mod crew;
mod date_range;
mod project;
mod roster;

pub(crate) use roster::label_for;

pub use assignment::{Assignment, AssignmentId, AssignmentTarget, AssignmentType};
pub use crew::{CrewId, CrewMember, CrewStatus, DisplayStatus};
pub use date_range::{ranges_overlap, DateRange};
pub use project::{Project, ProjectId, ProjectStatus};
pub use roster::Roster;

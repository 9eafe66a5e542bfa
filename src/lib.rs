//! Crew scheduling core.
//!
//! Decides whether a crew member can be booked for a range of days,
//! gates every assignment write behind that decision, and derives the
//! status a crew member is shown with. Forms, tables, and rendering live
//! elsewhere and call into this crate.
//!
//! # Modules
//!
//! - **`models`**: Domain types (`CrewMember`, `Project`, `Assignment`,
//!   `DateRange`, `Roster`)
//! - **`validation`**: Date parsing, input checks, roster audit
//! - **`conflict`**: Inclusive overlap detection, store-backed checker,
//!   drag preview
//! - **`status`**: Display status derivation
//! - **`gate`**: The assignment write path (create, update, move, delete)
//! - **`store`**: Data-store seam and an in-memory implementation
//! - **`timeline`**: Gantt rows and utilization for a window of days
//! - **`api`**: Typed request handlers and JSON dispatch
//! - **`config`**, **`clock`**, **`error`**: Settings, "today", error types
//!
//! # Invariant
//!
//! A crew member never holds two assignments whose ranges overlap,
//! counting a shared boundary day as overlap. The gate enforces it on
//! every write; stores may back it with an exclusion constraint.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use crew_schedule::config::SchedulerConfig;
//! use crew_schedule::gate::{AssignmentDraft, AssignmentGate, MutationContext};
//! use crew_schedule::models::{CrewMember, DateRange, Project};
//! use crew_schedule::store::MemoryStore;
//!
//! let store = MemoryStore::new().with_exclusion(true);
//! let crew = CrewMember::new("Ana Souza");
//! let ship = Project::new("MV Aurora");
//! let (crew_id, ship_id) = (crew.id, ship.id);
//! store.add_crew_member(crew);
//! store.add_project(ship);
//!
//! let gate = AssignmentGate::new(store, SchedulerConfig::default());
//! let ctx = MutationContext::new(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
//! let day = |d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap();
//!
//! gate.create(&ctx, AssignmentDraft::vessel(crew_id, ship_id, DateRange::new(day(15), day(25)).unwrap()))
//!     .unwrap();
//!
//! // Touching on the 25th counts as a conflict.
//! let err = gate
//!     .create(&ctx, AssignmentDraft::training(crew_id, "HUET", DateRange::new(day(25), day(27)).unwrap()))
//!     .unwrap_err();
//! assert!(err.is_conflict());
//! ```

pub mod api;
pub mod clock;
pub mod config;
pub mod conflict;
pub mod error;
pub mod gate;
pub mod models;
pub mod status;
pub mod store;
pub mod timeline;
pub mod validation;

pub use error::{ScheduleError, StoreError};

//! # Shiftboard
//!
//! Branch employee scheduling core: managers configure branches and role
//! rosters, onboard employees, and assign weekly shifts with live
//! multi-client updates and shift-conflict checks.
//!
//! ## Architecture
//!
//! The crate is organized around the assignment pipeline
//! (validate → apply → persist → broadcast → reconcile-finalization):
//!
//! - [`api`]: persisted entity types (branches, employees, shifts,
//!   finalization records)
//! - [`models`]: "HH:MM" time arithmetic and Sunday-aligned week math
//! - [`rules`]: pure conflict checks (role, overlap, daily/weekly caps,
//!   days per week)
//! - [`state`]: week-scoped snapshot queries over the shift collection
//! - [`finalize`]: per-employee-per-week finalization state machine
//! - [`coordinator`]: end-to-end orchestration of every mutation
//! - [`db`]: repository traits, the in-memory backend, and configuration
//! - [`broadcast`]: fire-and-forget event bus for connected clients
//! - [`auth`]: session tokens and role gating for the HTTP surface
//! - [`http`]: axum REST API + SSE event stream (feature `http-server`)

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod coordinator;
pub mod db;
pub mod finalize;
pub mod models;
pub mod rules;
pub mod state;

#[cfg(feature = "http-server")]
pub mod http;

pub use api::{
    Branch, BranchId, CrossBranchRequest, Employee, EmployeeId, EmploymentType, FinalizedSchedule,
    RoleConfig, Shift, ShiftId, ShiftStatus,
};
pub use broadcast::{Event, EventBus};
pub use coordinator::{
    AssignmentCoordinator, CreateOutcome, CreateShiftRequest, DeleteShiftRequest, ScheduleError,
    UpdateSettingsRequest, UpdateShiftRequest,
};
pub use db::{FullRepository, RepositoryError, RepositoryResult};
pub use finalize::{FinalizationChange, FinalizationTracker};
pub use models::time::{break_window, duration_hours, duration_seconds, ClockTime};
pub use rules::{Conflict, ConflictKind, Severity, ShiftCandidate};
pub use state::WeekSnapshot;

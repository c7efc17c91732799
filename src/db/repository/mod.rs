//! Repository traits and error types.
//!
//! The store is split into one trait per entity family, with
//! [`FullRepository`] as the convenience supertrait the application wires
//! together. Every operation is atomic at the single-document level only;
//! nothing here spans a transaction across entities.

pub mod branches;
pub mod employees;
pub mod error;
pub mod finalized;
pub mod shifts;

pub use branches::BranchRepository;
pub use employees::{EmployeeRepository, HoursUpdate};
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use finalized::FinalizationRepository;
pub use shifts::{ShiftFilter, ShiftPatch, ShiftRepository};

use async_trait::async_trait;

/// Everything the scheduling application needs from a storage backend.
#[async_trait]
pub trait FullRepository:
    BranchRepository + EmployeeRepository + ShiftRepository + FinalizationRepository
{
    /// Verify the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

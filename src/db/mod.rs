//! Persistence layer: repository traits, implementations, and configuration.
//!
//! The application talks to storage through the Repository pattern so
//! backends can be swapped without touching the scheduling core:
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │  Coordinator / HTTP handlers                    │
//! └──────────────────────┬──────────────────────────┘
//!                        │
//! ┌──────────────────────▼──────────────────────────┐
//! │  Repository traits (repository/), contracts     │
//! └──────────────────────┬──────────────────────────┘
//!                        │
//!        ┌───────────────▼───────────────┐
//!        │   LocalRepository (in-memory) │
//!        └───────────────────────────────┘
//! ```
//!
//! All operations are atomic at the single-document level only.

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
pub use repository::{
    BranchRepository, EmployeeRepository, ErrorContext, FinalizationRepository, FullRepository,
    HoursUpdate, RepositoryError, RepositoryResult, ShiftFilter, ShiftPatch, ShiftRepository,
};

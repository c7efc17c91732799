//! Repository implementations.
//!
//! Currently only the in-memory `local` backend exists; a SQL backend slots
//! in beside it behind its own feature flag, selected via the factory.
#[cfg(feature = "local-repo")]
pub mod local;

#[cfg(feature = "local-repo")]
pub use local::LocalRepository;

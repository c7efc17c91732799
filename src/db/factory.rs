//! Repository factory for dependency injection.
//!
//! Creates and configures repository instances from runtime configuration
//! (environment variables or `repository.toml`).

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
#[cfg(feature = "local-repo")]
use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Read `REPOSITORY_TYPE` from the environment, defaulting to Local.
    pub fn from_env() -> Self {
        std::env::var("REPOSITORY_TYPE")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(Self::Local)
    }
}

/// Centralized creation of repository instances.
///
/// # Example
/// ```
/// use shiftboard::db::factory::RepositoryFactory;
///
/// let repo = RepositoryFactory::create_local();
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    pub fn create(repo_type: RepositoryType) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => {
                #[cfg(feature = "local-repo")]
                {
                    Ok(Self::create_local())
                }
                #[cfg(not(feature = "local-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Local repository feature not enabled",
                    ))
                }
            }
        }
    }

    /// Create an in-memory local repository.
    #[cfg(feature = "local-repo")]
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a repository from environment configuration
    /// (`REPOSITORY_TYPE`).
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        Self::create(RepositoryType::from_env())
    }

    /// Create a repository from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        Self::create(repo_type)
    }

    /// Create a repository from `repository.toml` in a standard location,
    /// falling back to the environment when no file exists.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryConfig::from_default_location() {
            Ok(config) => {
                let repo_type = config.repository_type().map_err(|e| {
                    RepositoryError::configuration(format!("Invalid repository type: {}", e))
                })?;
                Self::create(repo_type)
            }
            Err(_) => Self::from_env(),
        }
    }
}

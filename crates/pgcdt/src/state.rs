//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. The storage backend is picked from [`Config`] at startup.

use std::sync::Arc;

use pgcdt_core::storage::{
    ContactRepository, QueryInspector, TaggedContactRepository, UserRepository,
};

use crate::config::{Config, ConfigError, StorageBackend};
use crate::storage::{InMemoryRepository, PostgresRepository};

/// Shared application state.
///
/// This is cloned for each request handler and contains the repository trait
/// objects used for database access.
#[derive(Clone)]
pub struct AppState {
    /// Contact repository (JSONB phone directories).
    pub contact_repo: Arc<dyn ContactRepository>,
    /// Contact repository (JSONB arrays of tagged numbers).
    pub tagged_contact_repo: Arc<dyn TaggedContactRepository>,
    /// User repository (composite addresses).
    pub user_repo: Arc<dyn UserRepository>,
    /// Plan inspector. None when the backend has no query planner.
    pub query_inspector: Option<Arc<dyn QueryInspector>>,
}

impl AppState {
    fn build(
        contact_repo: Arc<dyn ContactRepository>,
        tagged_contact_repo: Arc<dyn TaggedContactRepository>,
        user_repo: Arc<dyn UserRepository>,
        query_inspector: Option<Arc<dyn QueryInspector>>,
    ) -> Self {
        Self {
            contact_repo,
            tagged_contact_repo,
            user_repo,
            query_inspector,
        }
    }

    /// Creates AppState for the backend selected in the configuration.
    ///
    /// No connection is opened here; the postgres backend connects per
    /// operation.
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        match config.storage_backend {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or(ConfigError::MissingDatabaseUrl)?;
                let repo = Arc::new(PostgresRepository::new(url)?);
                tracing::info!("Using PostgreSQL storage");
                Ok(Self::build(
                    repo.clone(),
                    repo.clone(),
                    repo.clone(),
                    Some(repo),
                ))
            }
            StorageBackend::InMemory => {
                tracing::info!("Using in-memory storage");
                Ok(Self::in_memory())
            }
        }
    }

    /// Creates AppState with in-memory storage.
    /// Useful for testing without any external dependencies.
    pub fn in_memory() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        Self::build(repo.clone(), repo.clone(), repo, None)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}

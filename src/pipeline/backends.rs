// src/pipeline/backends.rs

//! Opened storage backends shared by every command.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::storage::{
    DocumentRepository, InMemoryRepository, LocalObjectStore, ObjectStore, PostgresRepository,
    open_object_store,
};

/// The repository and object store a command runs against.
#[derive(Clone)]
pub struct Backends {
    pub repository: Arc<dyn DocumentRepository>,
    pub store: Arc<dyn ObjectStore>,
}

impl Backends {
    pub fn new(repository: Arc<dyn DocumentRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self { repository, store }
    }

    /// Postgres plus the configured object store.
    pub async fn connect(config: &Config) -> Result<Self> {
        let repository = PostgresRepository::connect(&config.database).await?;
        let store = open_object_store(&config.storage).await?;
        Ok(Self::new(Arc::new(repository), store))
    }

    /// In-memory repository plus a local object store under `storage.local_dir`.
    pub fn dry_run(config: &Config) -> Self {
        Self::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(LocalObjectStore::from_config(&config.storage)),
        )
    }

    /// Ensure the schema and the bucket exist.
    pub async fn init(&self) -> Result<()> {
        self.repository.ensure_schema().await?;
        self.store.ensure_bucket().await?;
        Ok(())
    }
}

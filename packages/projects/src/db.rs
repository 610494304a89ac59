// ABOUTME: Database connection management and storage initialization
// ABOUTME: Provides shared access to the SQLite pool, domain storages, and the case generator

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use testdesk_ai::TestCaseGenerator;
use testdesk_requirements::RequirementStorage;
use testdesk_storage::{init_pool, PoolConfig, StorageError};
use testdesk_tabs::{TabManager, TabNaming};

use crate::storage::ProjectStorage;

/// Shared database state for API handlers
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub project_storage: Arc<ProjectStorage>,
    pub requirement_storage: Arc<RequirementStorage>,
    pub tab_manager: Arc<TabManager>,
    pub generator: Arc<dyn TestCaseGenerator>,
}

impl DbState {
    /// Create new database state from a migrated SQLite pool
    pub fn new(
        pool: SqlitePool,
        naming: TabNaming,
        generator: Arc<dyn TestCaseGenerator>,
    ) -> Self {
        let project_storage = Arc::new(ProjectStorage::new(pool.clone()));
        let requirement_storage = Arc::new(RequirementStorage::new(pool.clone()));
        let tab_manager = Arc::new(TabManager::new(pool.clone(), naming));

        Self {
            pool,
            project_storage,
            requirement_storage,
            tab_manager,
            generator,
        }
    }

    /// Open the configured database, run migrations, and build the state
    pub async fn init_with_config(
        config: &PoolConfig,
        naming: TabNaming,
        generator: Arc<dyn TestCaseGenerator>,
    ) -> Result<Self, StorageError> {
        let pool = init_pool(config).await?;

        info!(
            "Database ready at {} (tab base name: '{}')",
            config.database_path.display(),
            naming.base()
        );

        Ok(Self::new(pool, naming, generator))
    }
}

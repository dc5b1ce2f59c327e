//! Store contracts and the runtime backend dispatcher.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use starry_core::config::{DatabaseConfig, StoreProvider};
use starry_core::error::AppError;
use starry_core::pagination::PageRequest;
use starry_core::result::AppResult;
use starry_entity::binding::{BindOutcome, BindTargets, DirectoryBinding, TargetType, UnbindTargets};
use starry_entity::directory::{CreateDirectory, Directory, DirectoryType};

/// Durable CRUD over directory rows, scoped by tenant.
#[async_trait]
pub trait DirectoryStore: Debug + Send + Sync + 'static {
    /// Find a directory by id, only if it belongs to `tenant_id`.
    async fn find_by_id_and_tenant(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> AppResult<Option<Directory>>;

    /// Direct children of a directory, in creation order.
    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<Directory>>;

    /// Every directory of one type in the tenant, in creation order.
    async fn list_by_type(
        &self,
        tenant_id: Uuid,
        dir_type: DirectoryType,
    ) -> AppResult<Vec<Directory>>;

    /// Create a directory. Fails with a validation error when `parent_id`
    /// does not resolve inside the same tenant and type, and with a
    /// conflict when a sibling already uses the name.
    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory>;

    /// Rename a directory in place.
    async fn rename(&self, directory: &Directory, new_name: &str) -> AppResult<Directory>;

    /// Point a directory at a new parent (None for root level) and
    /// recompute the level of the whole moved subtree.
    ///
    /// The new parent must be another directory of the same tenant and
    /// type that does not lie inside the moved subtree; anything else is a
    /// validation error. The check and the write happen atomically, so
    /// concurrent moves cannot close a cycle.
    async fn reparent(
        &self,
        directory: &Directory,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<Directory>;

    /// Delete a leaf directory together with its bindings. Fails with a
    /// conflict when any directory still references it as parent.
    async fn delete(&self, directory: &Directory) -> AppResult<()>;

    /// Direct binding counts for each id. Ids without bindings are absent.
    async fn count_bindings(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, u64>>;

    /// Check backend connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Durable target-to-directory mapping, one row per target.
#[async_trait]
pub trait BindingStore: Debug + Send + Sync + 'static {
    /// File every target of the batch into the directory, mirroring the
    /// directory pointer onto each target row. All or nothing: a missing
    /// target, or a directory that no longer exists in the tenant, aborts
    /// the whole batch with a not-found error.
    async fn bind(&self, req: &BindTargets) -> AppResult<BindOutcome>;

    /// Remove the bindings of every target of the batch and clear their
    /// directory pointers. Targets without a binding are skipped; missing
    /// targets abort the whole batch with a not-found error. Returns the
    /// number of binding rows removed.
    async fn unbind(&self, req: &UnbindTargets) -> AppResult<u64>;

    /// The binding for a target, if any.
    async fn find_by_target(&self, target_id: Uuid) -> AppResult<Option<DirectoryBinding>>;

    /// Bindings filed directly into a directory of the tenant, oldest
    /// first, one page at a time, plus the total count.
    async fn list_by_directory(
        &self,
        tenant_id: Uuid,
        directory_id: Uuid,
        target_type: TargetType,
        page: PageRequest,
    ) -> AppResult<(Vec<DirectoryBinding>, u64)>;
}

/// Handle to the configured directory and binding stores.
///
/// Both stores always come from the same backend so that multi-table
/// operations stay inside one transaction.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// Directory store.
    directories: Arc<dyn DirectoryStore>,
    /// Binding store.
    bindings: Arc<dyn BindingStore>,
}

impl StoreManager {
    /// Create the stores selected by configuration.
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            StoreProvider::Postgres => {
                info!("Initializing PostgreSQL directory stores");
                let pool = crate::connection::connect_pool(config).await?;
                if config.run_migrations {
                    crate::migration::run_migrations(&pool).await?;
                }
                Ok(Self::postgres(pool))
            }
            #[cfg(feature = "memory")]
            StoreProvider::Memory => {
                info!("Initializing in-memory directory stores");
                Ok(Self::memory(crate::memory::MemoryStore::new()))
            }
            #[cfg(not(feature = "memory"))]
            StoreProvider::Memory => Err(AppError::configuration(
                "The memory store provider is not compiled in",
            )),
        }
    }

    /// Stores backed by an existing PostgreSQL pool.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            directories: Arc::new(crate::repositories::DirectoryRepository::new(pool.clone())),
            bindings: Arc::new(crate::repositories::BindingRepository::new(pool)),
        }
    }

    /// Stores backed by one shared in-memory store.
    #[cfg(feature = "memory")]
    pub fn memory(store: crate::memory::MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            directories: Arc::clone(&store) as Arc<dyn DirectoryStore>,
            bindings: store,
        }
    }

    /// The directory store.
    pub fn directories(&self) -> Arc<dyn DirectoryStore> {
        Arc::clone(&self.directories)
    }

    /// The binding store.
    pub fn bindings(&self) -> Arc<dyn BindingStore> {
        Arc::clone(&self.bindings)
    }
}

/// Map a sqlx error into a database [`AppError`] with context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(starry_core::error::ErrorKind::Database, context, e)
}

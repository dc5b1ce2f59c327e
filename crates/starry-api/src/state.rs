//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use starry_core::config::AppConfig;
use starry_database::StoreManager;
use starry_service::DirectoryService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Directory and binding stores
    pub stores: StoreManager,
    /// Directory tree service
    pub directory_service: Arc<DirectoryService>,
}

impl AppState {
    /// Wires the services on top of already-initialized stores.
    pub fn new(config: AppConfig, stores: StoreManager) -> Self {
        let directory_service = Arc::new(DirectoryService::new(
            stores.directories(),
            stores.bindings(),
            config.directory.clone(),
        ));
        Self {
            config: Arc::new(config),
            stores,
            directory_service,
        }
    }
}

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::layout::StorageLayout;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub layout: Arc<StorageLayout>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let layout = StorageLayout::new(config.storage_root.clone());
        Self {
            config: Arc::new(config),
            layout: Arc::new(layout),
        }
    }
}

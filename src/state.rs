use std::sync::Arc;

use storefront_backend::config::SearchConfig;
use storefront_backend::storage::SqliteProductStore;

/// Shared application state / 共享应用状态
pub struct AppState {
    pub store: Arc<SqliteProductStore>,
    /// Default result limits / 默认结果数
    pub search: SearchConfig,
}

impl AppState {
    pub fn new(store: SqliteProductStore, search: SearchConfig) -> Self {
        Self {
            store: Arc::new(store),
            search,
        }
    }
}

use bizbuddy_backend::chat::ChatIndex;
use bizbuddy_backend::config::AppConfig;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
    /// Built once at startup; `None` means the dataset or model failed to
    /// load and /chat runs degraded (always the fallback answer).
    pub chat: Option<Arc<ChatIndex>>,
}

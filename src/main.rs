use axum::{
    routing::{get, post},
    Router,
};
use sqlx::sqlite::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use bizbuddy_backend::chat::{self, ChatError, ChatIndex};
use bizbuddy_backend::config::{self, AppConfig};
use bizbuddy_backend::db;
use state::AppState;

/// Load the dataset and embedding model and build the chat index.
///
/// Any failure here is logged and leaves the chatbot degraded; auth and the
/// contact form stay up regardless.
async fn build_chat_index(app_config: &AppConfig) -> Option<Arc<ChatIndex>> {
    let dataset_path = PathBuf::from(&app_config.chatbot.dataset_file);
    let cache_dir = app_config.get_model_cache_dir();
    let threshold = app_config.chatbot.similarity_threshold;

    let result = tokio::task::spawn_blocking(move || -> Result<ChatIndex, ChatError> {
        let records = chat::load_dataset(&dataset_path)?;
        tracing::info!(records = records.len(), "Q&A dataset loaded");

        let encoder = chat::MiniLmEncoder::load(&cache_dir)?;
        ChatIndex::build(records, Box::new(encoder), threshold)
    })
    .await;

    match result {
        Ok(Ok(index)) => Some(Arc::new(index)),
        Ok(Err(e)) => {
            tracing::error!("Chatbot disabled, /chat will return the fallback answer: {}", e);
            None
        }
        Err(e) => {
            tracing::error!("Chatbot startup task failed: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bizbuddy_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_config = config::load_config().expect("Failed to load configuration");
    tracing::info!(
        "Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| app_config.get_database_url());

    let pool = SqlitePool::connect(&database_url).await?;

    db::run_migrations(&pool).await?;

    let chat_index = build_chat_index(&app_config).await;

    let state = Arc::new(AppState {
        db: pool,
        config: app_config.clone(),
        chat: chat_index,
    });

    let app = Router::new()
        .route("/", get(api::server::health_check))
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/me", get(api::auth::get_current_user))
        .route("/api/contact", post(api::contact::submit))
        .route("/api/contact/messages", get(api::contact::list_messages))
        .route("/chat", post(api::chat::chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

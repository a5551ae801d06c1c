use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contacts_api::{
    build_app,
    config::{Config, StorageBackend},
    storage::{ContactRepository, MemoryContactRepository, PgContactRepository},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contacts_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load();
    tracing::info!("Starting server in {} mode", config.server.environment);

    let contacts: Arc<dyn ContactRepository> = match config.database.backend {
        StorageBackend::Postgres => {
            let db = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database_url())
                .await?;
            tracing::info!("Connected to PostgreSQL");

            sqlx::migrate!("./migrations").run(&db).await?;
            tracing::info!("Database migrations completed");

            Arc::new(PgContactRepository::new(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory contact storage; data is lost on restart");
            Arc::new(MemoryContactRepository::new())
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(contacts, config);
    state.avatars.ensure_dirs().await?;

    let app = build_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

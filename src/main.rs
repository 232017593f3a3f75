use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eldercare_messaging::{
    alert::AlertRepository,
    db::{create_pool, redact_database_url, run_migrations},
    message::MessageRepository,
    routes::create_router,
    state::{AppState, Config, StorageBackend},
    store::InMemoryStore,
    user::UserRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,eldercare_messaging=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env().context("invalid configuration")?);

    let state = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORAGE_BACKEND is postgres")?;

            tracing::info!("Connecting to database at {}...", redact_database_url(database_url));
            let db = create_pool(database_url, config.database_max_connections)
                .await
                .context("failed to connect to database")?;

            tracing::info!("Running migrations...");
            run_migrations(&db).await.context("failed to run migrations")?;

            AppState::new(
                config.clone(),
                Arc::new(UserRepository::new(db.clone())),
                Arc::new(MessageRepository::new(db.clone())),
                Arc::new(AlertRepository::new(db)),
            )
        }
        StorageBackend::Memory => {
            let store = match &config.memory_seed_file {
                Some(path) => {
                    tracing::info!("Seeding in-memory store from {}", path.display());
                    InMemoryStore::from_seed_file(path).await?
                }
                None => InMemoryStore::new(),
            };
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            AppState::in_memory(config.clone(), Arc::new(store))
        }
    };

    tracing::info!("Unread counts use {:?} mode", config.unread_count_mode);

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use anyhow::{anyhow, bail, Context};
use std::{path::PathBuf, str::FromStr, sync::Arc};

use crate::{
    alert::AlertStore,
    message::{MessageService, MessageStore, UnreadCountMode},
    store::InMemoryStore,
    user::{UserDirectory, UserService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub user_repository: Arc<dyn UserDirectory>,
    pub alert_repository: Arc<dyn AlertStore>,
    pub user_service: UserService,
    pub message_service: MessageService,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        users: Arc<dyn UserDirectory>,
        messages: Arc<dyn MessageStore>,
        alerts: Arc<dyn AlertStore>,
    ) -> Self {
        let user_service = UserService::new(users.clone());
        let message_service =
            MessageService::new(messages, users.clone(), config.unread_count_mode);

        Self {
            config,
            user_repository: users,
            alert_repository: alerts,
            user_service,
            message_service,
        }
    }

    /// State backed entirely by one in-memory store.
    pub fn in_memory(config: Arc<Config>, store: Arc<InMemoryStore>) -> Self {
        Self::new(config, store.clone(), store.clone(), store)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub memory_seed_file: Option<PathBuf>,
    pub unread_count_mode: UnreadCountMode,
    pub cors_allowed_origins: Vec<String>,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let jwt_expiration_hours: i64 = var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse()
            .context("JWT_EXPIRATION_HOURS must be a number")?;

        let storage: StorageBackend = var("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .parse()
            .map_err(|e: String| anyhow!(e))
            .context("invalid STORAGE_BACKEND")?;

        let database_url = var("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND is postgres");
        }

        let database_max_connections: u32 = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a positive number")?;

        let unread_count_mode = var("UNREAD_COUNT_MODE")
            .map(|v| v.parse::<UnreadCountMode>())
            .transpose()
            .map_err(|e| anyhow!(e))
            .context("invalid UNREAD_COUNT_MODE")?
            .unwrap_or_default();

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        Ok(Self {
            jwt_secret,
            jwt_expiration_hours,
            storage,
            database_url,
            database_max_connections,
            memory_seed_file: var("MEMORY_SEED_FILE").map(PathBuf::from),
            unread_count_mode,
            cors_allowed_origins,
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        })
    }
}

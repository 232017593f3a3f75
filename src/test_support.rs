use axum::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::create_jwt,
    error::{AppError, Result},
    message::{Message, MessageStore},
    state::{AppState, Config, StorageBackend},
    store::InMemoryStore,
    user::User,
};

pub const SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        jwt_secret: SECRET.to_string(),
        jwt_expiration_hours: 1,
        storage: StorageBackend::Memory,
        database_url: None,
        database_max_connections: 1,
        memory_seed_file: None,
        unread_count_mode: Default::default(),
        cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}

pub fn staff(name: &str, user_type: &str) -> User {
    User {
        id: Uuid::new_v4(),
        full_name: name.to_string(),
        email: format!("{}@care.test", name.to_lowercase()),
        user_type: user_type.to_string(),
        is_active: true,
        created_at: Utc::now(),
    }
}

pub fn token(user: &User) -> String {
    create_jwt(user.id, SECRET, 1).unwrap()
}

pub async fn memory_state(users: &[User]) -> (AppState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    for user in users {
        store.insert_user(user.clone()).await;
    }
    let state = AppState::in_memory(Arc::new(test_config()), store.clone());
    (state, store)
}

/// Serve the full router over loopback and return its base URL.
pub async fn spawn_server(users: &[User]) -> String {
    let (state, _) = memory_state(users).await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, crate::routes::create_router(state))
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

/// Message store whose reads and/or read-marking fail like a lost database pool.
/// Inserts go through to the wrapped store.
pub struct FailingMessageStore {
    pub inner: Arc<InMemoryStore>,
    pub fail_reads: bool,
    pub fail_marks: bool,
}

impl FailingMessageStore {
    fn outage() -> AppError {
        AppError::Database(sqlx::Error::PoolTimedOut)
    }
}

#[async_trait]
impl MessageStore for FailingMessageStore {
    async fn insert(&self, message: &Message) -> Result<Message> {
        self.inner.insert(message).await
    }

    async fn find_involving(&self, user_id: Uuid) -> Result<Vec<Message>> {
        if self.fail_reads {
            return Err(Self::outage());
        }
        self.inner.find_involving(user_id).await
    }

    async fn find_thread(&self, user_id: Uuid, other_user_id: Uuid) -> Result<Vec<Message>> {
        if self.fail_reads {
            return Err(Self::outage());
        }
        self.inner.find_thread(user_id, other_user_id).await
    }

    async fn mark_read_from(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<u64> {
        if self.fail_marks {
            return Err(Self::outage());
        }
        self.inner.mark_read_from(sender_id, receiver_id).await
    }
}

/// State whose message store fails as configured; users and alerts are in memory.
pub async fn failing_state(
    users: &[User],
    fail_reads: bool,
    fail_marks: bool,
) -> (AppState, Arc<InMemoryStore>) {
    let (_, store) = memory_state(users).await;
    let messages = Arc::new(FailingMessageStore {
        inner: store.clone(),
        fail_reads,
        fail_marks,
    });
    let state = AppState::new(
        Arc::new(test_config()),
        store.clone(),
        messages,
        store.clone(),
    );
    (state, store)
}

use axum::async_trait;
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    alert::{Alert, AlertStore},
    error::{AppError, Result},
    message::{Message, MessageStore},
    user::{User, UserDirectory, UserType},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    messages: Vec<Message>,
    alerts: Vec<Alert>,
}

/// Process-local storage for development runs and tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store whose users come from a JSON array of `User` objects.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Internal(format!("Failed to read seed file {}: {}", path.display(), e))
        })?;
        let users: Vec<User> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Internal(format!("Invalid seed file {}: {}", path.display(), e))
        })?;

        let store = Self::new();
        for user in users {
            store.insert_user(user).await;
        }
        Ok(store)
    }

    pub async fn insert_user(&self, user: User) {
        let mut tables = self.tables.write().await;
        tables.users.retain(|u| u.id != user.id);
        tables.users.push(user);
    }

    pub async fn insert_alert(&self, alert: Alert) {
        self.tables.write().await.alerts.push(alert);
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.tables.read().await.alerts.clone()
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn insert(&self, message: &Message) -> Result<Message> {
        self.tables.write().await.messages.push(message.clone());
        Ok(message.clone())
    }

    async fn find_involving(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        Ok(messages)
    }

    async fn find_thread(&self, user_id: Uuid, other_user_id: Uuid) -> Result<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.is_between(user_id, other_user_id))
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.timestamp, m.id));
        Ok(messages)
    }

    async fn mark_read_from(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.sender_id == sender_id && m.receiver_id == receiver_id && !m.is_read)
        {
            message.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_contacts(&self, viewer_id: Uuid, roles: &[UserType]) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .iter()
            .filter(|u| u.id != viewer_id && u.is_active)
            .filter(|u| u.role().is_some_and(|r| roles.contains(&r)))
            .cloned()
            .collect();
        users.sort_by(|a, b| (&a.full_name, a.id).cmp(&(&b.full_name, b.id)));
        Ok(users)
    }
}

#[async_trait]
impl AlertStore for InMemoryStore {
    async fn mark_alerts_read(&self, alert_ids: &[Uuid]) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for alert in tables
            .alerts
            .iter_mut()
            .filter(|a| !a.is_read && alert_ids.contains(&a.id))
        {
            alert.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::Result, message::message_models::Message};

/// Persistence for direct messages.
///
/// Timestamp ties are ordered by message id so repeated reads agree.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, message: &Message) -> Result<Message>;

    /// Every message the user sent or received, newest first.
    async fn find_involving(&self, user_id: Uuid) -> Result<Vec<Message>>;

    /// The two-party transcript, oldest first.
    async fn find_thread(&self, user_id: Uuid, other_user_id: Uuid) -> Result<Vec<Message>>;

    /// Flip `is_read` on every unread message from `sender_id` to `receiver_id`.
    /// Returns how many rows changed.
    async fn mark_read_from(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<u64>;
}

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert(&self, message: &Message) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, sender_id, receiver_id, content, is_read, timestamp)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_involving(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE sender_id = $1 OR receiver_id = $1
             ORDER BY timestamp DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn find_thread(&self, user_id: Uuid, other_user_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE (sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1)
             ORDER BY timestamp ASC, id ASC",
        )
        .bind(user_id)
        .bind(other_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn mark_read_from(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE messages
             SET is_read = true
             WHERE sender_id = $1 AND receiver_id = $2 AND is_read = false",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

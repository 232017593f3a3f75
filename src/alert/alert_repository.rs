use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Flip `is_read` on the given alerts. Unknown ids are ignored.
    async fn mark_alerts_read(&self, alert_ids: &[Uuid]) -> Result<u64>;
}

#[derive(Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for AlertRepository {
    async fn mark_alerts_read(&self, alert_ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE alerts SET is_read = true WHERE id = ANY($1) AND is_read = false",
        )
        .bind(alert_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use super::user_models::{User, UserType};

/// Read access to user accounts, the collaborator messaging joins against.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>>;

    /// Active users of the given roles, excluding `viewer_id`, ordered by name.
    async fn find_contacts(&self, viewer_id: Uuid, roles: &[UserType]) -> Result<Vec<User>>;
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn find_contacts(&self, viewer_id: Uuid, roles: &[UserType]) -> Result<Vec<User>> {
        let roles: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE id <> $1 AND is_active = true AND lower(user_type) = ANY($2)
             ORDER BY full_name ASC, id ASC",
        )
        .bind(viewer_id)
        .bind(&roles)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

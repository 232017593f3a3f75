use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use super::{
    user_models::{User, UserType},
    user_repository::UserDirectory,
};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserDirectory>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    pub async fn get_current_user(&self, user_id: Uuid) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Users the viewer may start an instant-messaging thread with.
    pub async fn list_contacts(&self, viewer_id: Uuid) -> Result<Vec<User>> {
        self.users
            .find_contacts(viewer_id, &UserType::messaging_eligible())
            .await
    }
}

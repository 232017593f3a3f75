use uuid::Uuid;

use crate::message::Message;

/// Who is calling and where. Passed explicitly to every API call.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    token: String,
    user_id: Uuid,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, user_id: Uuid) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: token.into(),
            user_id,
        }
    }

    /// True when the message was written by this session's user.
    pub fn sent_by_self(&self, message: &Message) -> bool {
        message.sender_id == self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Absolute URL for an API path such as `/api/conversations`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

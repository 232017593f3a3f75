use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A direct message between two users. Only `is_read` ever changes after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender_id: Uuid, receiver_id: Uuid, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            content,
            is_read: false,
            timestamp,
        }
    }

    /// The other party of this message as seen by `viewer_id`.
    pub fn counterpart_of(&self, viewer_id: Uuid) -> Uuid {
        if self.sender_id == viewer_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    pub fn is_unread_for(&self, viewer_id: Uuid) -> bool {
        self.receiver_id == viewer_id && !self.is_read
    }

    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }
}

/// Which action flipped a thread's read flags.
///
/// Both variants drive the same `is_read` flag: there is no separate
/// delivered state stored for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMark {
    Delivered,
    Read,
}

impl std::fmt::Display for ReadMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadMark::Delivered => write!(f, "delivered"),
            ReadMark::Read => write!(f, "read"),
        }
    }
}

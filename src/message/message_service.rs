use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::{collections::HashMap, str::FromStr, sync::Arc};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    message::{
        message_dto::{ConversationSummary, LastMessage, SendMessageRequest},
        message_models::{Message, ReadMark},
        message_repository::MessageStore,
    },
    user::{UserDirectory, UserSummary},
};

/// How `unreadCount` is derived for a conversation summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnreadCountMode {
    /// 1 when the newest message of the thread is addressed to the viewer and unread, else 0.
    #[default]
    Latest,
    /// Every unread message from the counterpart to the viewer.
    Total,
}

impl FromStr for UnreadCountMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(UnreadCountMode::Latest),
            "total" => Ok(UnreadCountMode::Total),
            other => Err(format!("unknown unread count mode: {}", other)),
        }
    }
}

/// Round up to the microsecond precision Postgres stores, so the persisted
/// timestamp is never earlier than `now`.
pub fn storage_timestamp(now: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = now.trunc_subsecs(6);
    if truncated < now {
        truncated + Duration::microseconds(1)
    } else {
        truncated
    }
}

/// Per-counterpart aggregate before the user join.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    pub counterpart_id: Uuid,
    pub last_message: Message,
    pub unread_count: i64,
}

/// Collapse a viewer's message history into one entry per counterpart.
///
/// `messages` must be sorted newest first; the first message seen for a
/// counterpart is kept as its latest. Entries keep first-seen order.
pub fn summarize_threads(
    viewer_id: Uuid,
    messages: Vec<Message>,
    mode: UnreadCountMode,
) -> Vec<ThreadSummary> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut summaries: Vec<ThreadSummary> = Vec::new();

    for message in messages {
        let counterpart_id = message.counterpart_of(viewer_id);
        let unread = message.is_unread_for(viewer_id);

        match index.get(&counterpart_id) {
            Some(&i) => {
                if mode == UnreadCountMode::Total && unread {
                    summaries[i].unread_count += 1;
                }
            }
            None => {
                index.insert(counterpart_id, summaries.len());
                summaries.push(ThreadSummary {
                    counterpart_id,
                    last_message: message,
                    unread_count: i64::from(unread),
                });
            }
        }
    }

    summaries
}

#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
    unread_mode: UnreadCountMode,
}

impl MessageService {
    pub fn new(
        store: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
        unread_mode: UnreadCountMode,
    ) -> Self {
        Self {
            store,
            users,
            unread_mode,
        }
    }

    pub async fn send_message(&self, sender_id: Uuid, payload: SendMessageRequest) -> Result<Message> {
        let content = payload.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation(
                "Message content cannot be empty".to_string(),
            ));
        }

        self.users
            .find_by_id(payload.receiver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Receiver not found".to_string()))?;

        let message = Message::new(
            sender_id,
            payload.receiver_id,
            content.to_string(),
            storage_timestamp(Utc::now()),
        );
        let message = self.store.insert(&message).await?;

        tracing::debug!(
            "Message {} sent from {} to {}",
            message.id,
            message.sender_id,
            message.receiver_id
        );

        Ok(message)
    }

    pub async fn list_conversations(&self, viewer_id: Uuid) -> Result<Vec<ConversationSummary>> {
        let messages = self.store.find_involving(viewer_id).await?;
        let threads = summarize_threads(viewer_id, messages, self.unread_mode);

        let ids: Vec<Uuid> = threads.iter().map(|t| t.counterpart_id).collect();
        let users: HashMap<Uuid, UserSummary> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        let conversations = threads
            .into_iter()
            .filter_map(|thread| {
                let Some(user) = users.get(&thread.counterpart_id).cloned() else {
                    tracing::debug!(
                        "Dropping conversation with unknown user {}",
                        thread.counterpart_id
                    );
                    return None;
                };

                Some(ConversationSummary {
                    user,
                    last_message: LastMessage {
                        content: thread.last_message.content,
                        timestamp: thread.last_message.timestamp,
                        is_read: thread.last_message.is_read,
                    },
                    unread_count: thread.unread_count,
                })
            })
            .collect();

        Ok(conversations)
    }

    /// Transcript with `other_user_id`, oldest first.
    ///
    /// Messages from the counterpart are marked read after the transcript is
    /// loaded, so the returned items still carry their previous read flags.
    pub async fn get_thread(&self, viewer_id: Uuid, other_user_id: Uuid) -> Result<Vec<Message>> {
        self.users
            .find_by_id(other_user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let messages = self.store.find_thread(viewer_id, other_user_id).await?;

        let updated = self.store.mark_read_from(other_user_id, viewer_id).await?;
        if updated > 0 {
            tracing::debug!(
                "Opening thread marked {} message(s) from {} to {} as read",
                updated,
                other_user_id,
                viewer_id
            );
        }

        Ok(messages)
    }

    /// Mark everything `sender_id` sent to the viewer as read.
    pub async fn mark_thread(&self, viewer_id: Uuid, sender_id: Uuid, mark: ReadMark) -> Result<u64> {
        let updated = self.store.mark_read_from(sender_id, viewer_id).await?;

        tracing::debug!(
            "Marked {} message(s) from {} to {} as {}",
            updated,
            sender_id,
            viewer_id,
            mark
        );

        Ok(updated)
    }
}

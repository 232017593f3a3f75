use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use uuid::Uuid;

use super::session::Session;
use crate::message::{ConversationSummary, Message, StatusResponse};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Clone, Default)]
pub struct ApiClient {
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn list_conversations(&self, session: &Session) -> ClientResult<Vec<ConversationSummary>> {
        self.send(session, self.http.get(session.url("/api/conversations")))
            .await
    }

    /// Fetching a thread also marks the counterpart's messages as read.
    pub async fn get_thread(&self, session: &Session, counterpart_id: Uuid) -> ClientResult<Vec<Message>> {
        let url = session.url(&format!("/api/messages/{}", counterpart_id));
        self.send(session, self.http.get(url)).await
    }

    pub async fn send_message(
        &self,
        session: &Session,
        receiver_id: Uuid,
        content: &str,
    ) -> ClientResult<Message> {
        let body = json!({ "receiverId": receiver_id, "content": content });
        self.send(session, self.http.post(session.url("/api/messages")).json(&body))
            .await
    }

    pub async fn mark_read(&self, session: &Session, sender_id: Uuid) -> ClientResult<StatusResponse> {
        let url = session.url(&format!("/api/messages/read/{}", sender_id));
        self.send(session, self.http.put(url)).await
    }

    pub async fn mark_delivered(&self, session: &Session, sender_id: Uuid) -> ClientResult<StatusResponse> {
        let url = session.url(&format!("/api/messages/deliver/{}", sender_id));
        self.send(session, self.http.put(url)).await
    }

    pub async fn mark_alerts_read(&self, session: &Session, alert_ids: &[Uuid]) -> ClientResult<StatusResponse> {
        let body = json!({ "alertIds": alert_ids });
        self.send(session, self.http.put(session.url("/api/alerts/read")).json(&body))
            .await
    }

    async fn send<T: DeserializeOwned>(&self, session: &Session, request: RequestBuilder) -> ClientResult<T> {
        let response = request.bearer_auth(session.token()).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(text);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

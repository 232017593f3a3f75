//! Tails the conversation list (and optionally one thread) of a user by polling the API.
//!
//! CHAT_API_URL, CHAT_TOKEN and CHAT_USER_ID select the session; CHAT_OPEN_THREAD
//! optionally names a counterpart whose thread is polled too.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use eldercare_messaging::client::{ApiClient, ChatPoller, PollEvent, PollerConfig, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url = std::env::var("CHAT_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let token = std::env::var("CHAT_TOKEN").context("CHAT_TOKEN must be set")?;
    let user_id: Uuid = std::env::var("CHAT_USER_ID")
        .context("CHAT_USER_ID must be set")?
        .parse()
        .context("CHAT_USER_ID must be a UUID")?;

    let session = Session::new(base_url, token, user_id);
    let (poller, mut events) = ChatPoller::spawn(ApiClient::default(), session.clone(), PollerConfig::default());

    if let Ok(raw) = std::env::var("CHAT_OPEN_THREAD") {
        let counterpart: Uuid = raw.parse().context("CHAT_OPEN_THREAD must be a UUID")?;
        poller.open_thread(counterpart);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(PollEvent::Conversations(list)) => {
                    println!("--- {} conversation(s)", list.len());
                    for c in list {
                        println!(
                            "{:<24} {:>3} unread  {}  {}",
                            c.user.full_name,
                            c.unread_count,
                            c.last_message.timestamp.format("%Y-%m-%d %H:%M"),
                            c.last_message.content
                        );
                    }
                }
                Some(PollEvent::Thread { counterpart_id, messages }) => {
                    println!("--- thread with {} ({} message(s))", counterpart_id, messages.len());
                    for m in messages {
                        let who = if session.sent_by_self(&m) { "me" } else { "them" };
                        println!("[{}] {}: {}", m.timestamp.format("%H:%M:%S"), who, m.content);
                    }
                }
                Some(PollEvent::Error(e)) => tracing::warn!("Poll failed: {}", e),
                None => break,
            }
        }
    }

    poller.stop().await;
    Ok(())
}

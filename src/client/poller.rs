use std::time::Duration;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, Interval, MissedTickBehavior},
};
use uuid::Uuid;

use super::{api::ApiClient, session::Session};
use crate::message::{ConversationSummary, Message};

#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub list_interval: Duration,
    pub thread_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            list_interval: Duration::from_secs(10),
            thread_interval: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PollEvent {
    Conversations(Vec<ConversationSummary>),
    Thread {
        counterpart_id: Uuid,
        messages: Vec<Message>,
    },
    /// A poll failed; the next tick tries again.
    Error(String),
}

enum Command {
    Open(Uuid),
    Close,
    Stop,
}

/// Background task that refetches the chat list and the open thread on fixed intervals.
pub struct ChatPoller {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl ChatPoller {
    pub fn spawn(
        client: ApiClient,
        session: Session,
        config: PollerConfig,
    ) -> (Self, mpsc::Receiver<PollEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(32);

        let task = tokio::spawn(run(client, session, config, command_rx, event_tx));

        (
            Self {
                commands: command_tx,
                task,
            },
            event_rx,
        )
    }

    /// Start polling the thread with `counterpart_id`, replacing any open thread.
    pub fn open_thread(&self, counterpart_id: Uuid) {
        let _ = self.commands.send(Command::Open(counterpart_id));
    }

    pub fn close_thread(&self) {
        let _ = self.commands.send(Command::Close);
    }

    pub async fn stop(self) {
        let _ = self.commands.send(Command::Stop);
        if let Err(e) = self.task.await {
            tracing::warn!("Chat poller task ended abnormally: {}", e);
        }
    }
}

fn ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    // A slow request pushes the next poll back instead of bursting
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run(
    client: ApiClient,
    session: Session,
    config: PollerConfig,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::Sender<PollEvent>,
) {
    let mut list_tick = ticker(config.list_interval);
    let mut thread_tick = ticker(config.thread_interval);
    let mut open: Option<Uuid> = None;

    loop {
        let event = tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(Command::Open(id)) => {
                        open = Some(id);
                        thread_tick.reset_immediately();
                    }
                    Some(Command::Close) => open = None,
                    Some(Command::Stop) | None => break,
                }
                continue;
            }
            _ = list_tick.tick() => {
                match client.list_conversations(&session).await {
                    Ok(list) => PollEvent::Conversations(list),
                    Err(e) => PollEvent::Error(e.to_string()),
                }
            }
            _ = thread_tick.tick(), if open.is_some() => {
                let Some(counterpart_id) = open else { continue };
                match client.get_thread(&session, counterpart_id).await {
                    Ok(messages) => PollEvent::Thread { counterpart_id, messages },
                    Err(e) => PollEvent::Error(e.to_string()),
                }
            }
        };

        if events.send(event).await.is_err() {
            tracing::debug!("Poll event receiver dropped, stopping");
            break;
        }
    }
}

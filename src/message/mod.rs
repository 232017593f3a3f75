pub mod message_models;
pub mod message_dto;
pub mod message_repository;
pub mod message_service;
pub mod message_handlers;

pub use message_models::{Message, ReadMark};
pub use message_dto::{ConversationSummary, LastMessage, SendMessageRequest, StatusResponse};
pub use message_repository::{MessageRepository, MessageStore};
pub use message_service::{MessageService, UnreadCountMode};

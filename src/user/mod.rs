pub mod user_models;
pub mod user_repository;
pub mod user_service;
pub mod user_handlers;

pub use user_models::{User, UserSummary, UserType};
pub use user_repository::{UserDirectory, UserRepository};
pub use user_service::UserService;

pub mod alert_models;
pub mod alert_repository;
pub mod alert_handlers;

pub use alert_models::{Alert, MarkAlertsReadRequest};
pub use alert_repository::{AlertRepository, AlertStore};

//! HTTP client for the messaging API and the interval poller that keeps a
//! chat view current.

pub mod session;
pub mod api;
pub mod poller;

pub use api::{ApiClient, ClientError};
pub use poller::{ChatPoller, PollEvent, PollerConfig};
pub use session::Session;

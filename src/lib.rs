pub mod alert;
pub mod auth;
pub mod client;
pub mod db;
pub mod error;
pub mod message;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

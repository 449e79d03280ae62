#![warn(clippy::unwrap_used)]

pub mod analytics_rest;
pub mod auth;
pub mod error;
pub mod extract;
pub mod loyalty_rest;
pub mod rest;
pub mod server;
pub mod store;

pub use rest::AppState;
pub use server::{build_router, ApiServer};
pub use store::PassdeskStore;

// Library exports for testing and reuse

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod session;
pub mod state;
pub mod store;

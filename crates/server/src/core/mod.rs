//! Core Service Layer
//!
//! Storage, authentication, item CRUD and the HTTP wiring around them.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod items;
pub mod models;
pub mod router;
pub mod store;

// Re-exports for convenience
pub use config::{AppState, ServerConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use router::router;

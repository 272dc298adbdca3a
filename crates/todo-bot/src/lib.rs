//! Telegram front end for the To-Do API
//!
//! Each chat gets its own [`flow::Session`]: a single conversation state,
//! a few scratch fields, the bearer token and the last list shown to the
//! user. Menu buttons start short prompt sequences; the final step of each
//! sequence calls the REST API through [`api::TodoApi`] and drops back to
//! idle whether the call worked or not.

pub mod api;
pub mod bot;
pub mod config;
pub mod flow;
pub mod sessions;
pub mod telegram;

pub use api::{ApiError, HttpApi, TodoApi};
pub use bot::{Bot, ReplySink};
pub use config::BotConfig;
pub use flow::{Command, ConversationState, Reply, Session};
pub use sessions::SessionRegistry;

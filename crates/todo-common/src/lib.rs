//! Shared pieces of the To-Do system
//!
//! The server and the chat bot speak the same JSON over HTTP; the request and
//! response bodies for every route live in [`api`] so both sides agree on the
//! shape. [`env`] holds the small helpers both binaries use to read their
//! configuration from the process environment.

pub mod api;
pub mod env;

pub use api::{
    Credentials, CreatedResponse, ErrorBody, ItemText, ItemView, LoginResponse, SuccessResponse,
};

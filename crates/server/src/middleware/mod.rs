//! Request extractors shared across handlers.

pub mod auth;

pub use auth::{MaybeApiKey, RequireApiKey};

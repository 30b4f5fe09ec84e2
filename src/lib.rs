//! groqchat - terminal chat client for OpenAI-compatible completion endpoints.
//!
//! Keeps settings, the API key, the active conversation, and a bounded
//! history of past chats in a local key/value store, and sends each turn
//! with the full conversation so the model keeps context.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod markup;
pub mod storage;

pub use config::Config;
pub use error::{ApiError, Error, Result};

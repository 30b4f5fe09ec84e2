//! Conversation state, persistence, and the completion exchange.

pub mod archive;
pub mod client;
pub mod credential;
pub mod orchestrator;
pub mod session;
pub mod settings;

pub use archive::{ChatArchive, ChatRecord};
pub use client::{CompletionClient, HttpCompletionClient};
pub use credential::Credential;
pub use orchestrator::{AppState, Orchestrator};
pub use session::{ConversationSession, Role, Turn};
pub use settings::Settings;

//! CLI command implementations.

pub mod chat;
pub mod credential;
pub mod history;
pub mod render;
pub mod send;
pub mod session;
pub mod settings;

use crate::config::Config;
use crate::core::{HttpCompletionClient, Orchestrator};
use crate::error::Result;
use crate::storage::FileBackend;

/// Open the chat state stored under the configured directory.
///
/// # Errors
///
/// Returns an error if the storage directory cannot be created or the HTTP
/// client cannot be built.
pub fn open_chat(config: &Config) -> Result<Orchestrator> {
    let store = FileBackend::new(config.storage.path.clone())?;
    let client = HttpCompletionClient::new(&config.api)?;
    Ok(Orchestrator::open(Box::new(store), Box::new(client)))
}

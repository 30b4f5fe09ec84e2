//! `groqchat key` command implementations.

use crate::cli::open_chat;
use crate::cli::render::Printer;
use crate::config::Config;
use crate::error::Result;

/// Run `key set`.
///
/// # Errors
///
/// Returns `Error::Validation` for a blank key, or a storage error.
pub fn run_set(config: &Config, key: &str) -> Result<()> {
    let chat = open_chat(config)?;
    chat.save_credential(key)?;
    Printer::for_settings(&chat.settings()).status("API Key saved successfully!");
    Ok(())
}

/// Run `key status`.
///
/// Prints whether a key is configured, masked unless `show` is set.
///
/// # Errors
///
/// Returns an error if storage cannot be opened.
pub fn run_status(config: &Config, show: bool) -> Result<()> {
    let chat = open_chat(config)?;
    match chat.credential() {
        Some(key) if show => println!("Connected: {}", key.expose()),
        Some(key) => println!("Connected: {}", key.masked()),
        None => println!("Not connected: no API key saved"),
    }
    Ok(())
}

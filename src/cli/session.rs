//! `groqchat new`, `load`, and `export` command implementations.

use crate::cli::open_chat;
use crate::cli::render::Printer;
use crate::config::Config;
use crate::core::Orchestrator;
use crate::error::Result;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

/// Run the new command.
///
/// # Errors
///
/// Returns an error if storage cannot be opened or written.
pub fn run_new(config: &Config) -> Result<()> {
    let chat = open_chat(config)?;
    chat.start_new()?;
    Printer::for_settings(&chat.settings()).status("New chat started");
    Ok(())
}

/// Run the load command.
///
/// Makes a saved chat the active one and replays every turn.
///
/// # Errors
///
/// Returns `Error::RecordNotFound` for an unknown id, or a storage error.
pub fn run_load(config: &Config, id: u64) -> Result<()> {
    let chat = open_chat(config)?;
    let printer = Printer::for_settings(&chat.settings());

    let turns = chat.load_record(id)?;
    for turn in &turns {
        printer.turn(turn);
    }
    printer.status("Chat loaded");
    Ok(())
}

/// Run the export command.
///
/// # Errors
///
/// Returns `Error::Validation` if there is nothing to export, or an I/O
/// error writing the file.
pub fn run_export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let chat = open_chat(config)?;
    let path = write_export(&chat, output)?;
    Printer::for_settings(&chat.settings())
        .status(&format!("Chat exported to {}", path.display()));
    Ok(())
}

/// Write the active chat transcript, returning where it went.
///
/// # Errors
///
/// Returns `Error::Validation` if the active chat is empty, or an I/O error.
pub fn write_export(chat: &Orchestrator, output: Option<PathBuf>) -> Result<PathBuf> {
    let text = chat.export_active()?;
    let path = output.unwrap_or_else(default_export_path);
    fs::write(&path, text)?;
    tracing::debug!(path = %path.display(), "exported chat");
    Ok(path)
}

fn default_export_path() -> PathBuf {
    PathBuf::from(format!("groqchat-chat-{}.txt", Utc::now().timestamp_millis()))
}

//! `groqchat send` command implementation.

use crate::cli::open_chat;
use crate::cli::render::Printer;
use crate::config::Config;
use crate::core::Turn;
use crate::error::Result;

/// Run the send command.
///
/// Sends one message in the active conversation and prints the reply.
///
/// # Errors
///
/// Returns validation, API, or storage errors from the send.
pub fn run(config: &Config, message: &str) -> Result<()> {
    let chat = open_chat(config)?;
    let printer = Printer::for_settings(&chat.settings());

    let outcome = chat.submit(message);
    printer.bell();

    let reply = outcome?;
    printer.turn(&Turn::assistant(reply));
    Ok(())
}

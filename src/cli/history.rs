//! `groqchat history` and `groqchat clear-history` command implementations.

use crate::cli::open_chat;
use crate::cli::render::Printer;
use crate::config::Config;
use crate::core::ChatRecord;
use crate::error::Result;
use chrono::{DateTime, Local, Utc};
use std::io::{self, BufRead, Write};

/// Run the history command.
///
/// Lists saved chats, most recent first.
///
/// # Errors
///
/// Returns an error if storage cannot be opened.
pub fn run_list(config: &Config) -> Result<()> {
    let chat = open_chat(config)?;
    let printer = Printer::for_settings(&chat.settings());
    print_list(&chat.archive(), &printer);
    Ok(())
}

/// Run the clear-history command.
///
/// Asks for confirmation on stdin unless `yes` is set.
///
/// # Errors
///
/// Returns an error if reading stdin or persisting fails.
pub fn run_clear(config: &Config, yes: bool) -> Result<()> {
    let chat = open_chat(config)?;
    let printer = Printer::for_settings(&chat.settings());

    if !yes && !confirm("Clear all chat history?", &mut io::stdin().lock())? {
        printer.status("Nothing cleared.");
        return Ok(());
    }

    chat.clear_archive()?;
    printer.status("Chat history cleared");
    Ok(())
}

/// Print the saved-chat table.
pub fn print_list(records: &[ChatRecord], printer: &Printer) {
    if records.is_empty() {
        printer.status("No saved chats.");
        return;
    }

    let now = Utc::now();
    println!("{:<15} {:<12} Title", "ID", "When");
    println!("{}", "─".repeat(80));
    for record in records {
        println!(
            "{:<15} {:<12} {}",
            record.id,
            format_relative(record.created_at, now),
            record.title
        );
    }
    println!("{}", "─".repeat(80));
    println!("{} saved chat(s)", records.len());
}

/// Human-friendly age of a timestamp.
#[must_use]
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - timestamp;
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        let local: DateTime<Local> = timestamp.into();
        local.format("%Y-%m-%d").to_string()
    }
}

/// Ask a yes/no question; anything but `y`/`yes` means no.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the answer fails.
pub fn confirm(question: &str, input: &mut impl BufRead) -> io::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

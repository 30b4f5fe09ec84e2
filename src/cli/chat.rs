//! `groqchat chat` interactive loop.

use crate::cli::render::Printer;
use crate::cli::{history, open_chat, session};
use crate::config::Config;
use crate::core::{Orchestrator, Turn};
use crate::error::Result;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const HELP: &str = "\
Commands:
  /new              start a new chat
  /history          list saved chats
  /load <id>        open a saved chat
  /export [path]    save this chat as text
  /clear            delete all saved chats
  /help             show this help
  /quit             leave
Anything else is sent as a message.";

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Message(String),
    New,
    History,
    Load(u64),
    Export(Option<PathBuf>),
    Clear,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

/// Classify a line typed at the prompt.
#[must_use]
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "new" => Input::New,
        "history" => Input::History,
        "load" => match arg.parse() {
            Ok(id) => Input::Load(id),
            Err(_) => Input::Invalid("Usage: /load <id>".to_string()),
        },
        "export" => Input::Export((!arg.is_empty()).then(|| PathBuf::from(arg))),
        "clear" => Input::Clear,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Invalid(format!("Unknown command: /{other} (try /help)")),
    }
}

/// Run the interactive chat.
///
/// Errors from individual commands are printed and the loop continues.
///
/// # Errors
///
/// Returns an error only if storage cannot be opened or stdin fails.
pub fn run(config: &Config) -> Result<()> {
    let chat = open_chat(config)?;
    let printer = Printer::for_settings(&chat.settings());

    if !chat.has_credential() {
        printer.status("No API key saved yet. Run `groqchat key set <key>` first.");
    }
    let active = chat.session();
    if !active.is_empty() {
        printer.status(&format!("Continuing chat ({} messages)", active.len()));
        for turn in active.turns() {
            printer.turn(turn);
        }
    }
    printer.status("Type /help for commands.");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Invalid(msg) => printer.error(&msg),
            Input::Message(text) => send(&chat, &printer, &text),
            Input::New => match chat.start_new() {
                Ok(()) => printer.status("New chat started"),
                Err(e) => printer.error(&e.to_string()),
            },
            Input::History => history::print_list(&chat.archive(), &printer),
            Input::Load(id) => match chat.load_record(id) {
                Ok(turns) => {
                    for turn in &turns {
                        printer.turn(turn);
                    }
                    printer.status("Chat loaded");
                }
                Err(e) => printer.error(&e.to_string()),
            },
            Input::Export(path) => match session::write_export(&chat, path) {
                Ok(path) => printer.status(&format!("Chat exported to {}", path.display())),
                Err(e) => printer.error(&e.to_string()),
            },
            Input::Clear => {
                if history::confirm("Clear all chat history?", &mut input)? {
                    match chat.clear_archive() {
                        Ok(()) => printer.status("Chat history cleared"),
                        Err(e) => printer.error(&e.to_string()),
                    }
                }
            }
        }
    }

    Ok(())
}

fn send(chat: &Orchestrator, printer: &Printer, text: &str) {
    match chat.submit(text) {
        Ok(reply) => {
            println!();
            printer.turn(&Turn::assistant(reply));
            printer.bell();
        }
        Err(e) => printer.error(&e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_messages() {
        assert_eq!(
            parse_input("  hello there \n"),
            Input::Message("hello there".to_string())
        );
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(parse_input("   \n"), Input::Empty);
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_input("/new"), Input::New);
        assert_eq!(parse_input("/history"), Input::History);
        assert_eq!(parse_input("/clear"), Input::Clear);
        assert_eq!(parse_input("/help"), Input::Help);
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/exit"), Input::Quit);
    }

    #[test]
    fn load_takes_an_id() {
        assert_eq!(parse_input("/load 1700000000000"), Input::Load(1_700_000_000_000));
        assert!(matches!(parse_input("/load"), Input::Invalid(_)));
        assert!(matches!(parse_input("/load abc"), Input::Invalid(_)));
    }

    #[test]
    fn export_path_is_optional() {
        assert_eq!(parse_input("/export"), Input::Export(None));
        assert_eq!(
            parse_input("/export notes/chat.txt"),
            Input::Export(Some(PathBuf::from("notes/chat.txt")))
        );
    }

    #[test]
    fn unknown_command_is_invalid() {
        assert!(matches!(parse_input("/frobnicate"), Input::Invalid(_)));
    }
}

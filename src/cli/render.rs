//! Terminal output for chats: labels, markup, status lines, and the bell.

use crate::core::{Role, Settings, Turn};
use crate::markup::{self, Palette};
use std::io::{self, IsTerminal, Write};

/// Prints turns and status messages according to the user's settings.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    palette: Palette,
    bell: bool,
}

impl Printer {
    /// Palette from `darkMode` (plain when stdout is not a terminal), bell
    /// from `soundEffects`.
    #[must_use]
    pub fn for_settings(settings: &Settings) -> Self {
        let palette = if io::stdout().is_terminal() {
            Palette::for_theme(settings.dark_mode)
        } else {
            Palette::plain()
        };
        Self {
            palette,
            bell: settings.sound_effects,
        }
    }

    /// Print one turn with its author label.
    pub fn turn(&self, turn: &Turn) {
        println!("{}\n", format_turn(turn, &self.palette));
    }

    /// Print a one-line status message.
    pub fn status(&self, message: &str) {
        println!("{}{message}{}", self.palette.dim, self.palette.reset);
    }

    /// Print an error on stderr and ring the error bell.
    pub fn error(&self, message: &str) {
        eprintln!("{}Error: {message}{}", self.palette.error, self.palette.reset);
        self.bell();
    }

    /// Ring the terminal bell if sound effects are on.
    pub fn bell(&self) {
        if self.bell {
            let mut stderr = io::stderr();
            let _ = stderr.write_all(b"\x07");
            let _ = stderr.flush();
        }
    }
}

/// Label plus rendered content for one turn.
#[must_use]
pub fn format_turn(turn: &Turn, palette: &Palette) -> String {
    let (label, color) = match turn.role {
        Role::User => ("You", palette.user),
        Role::Assistant => ("GroqAI", palette.assistant),
    };
    let body = match turn.role {
        Role::User => turn.content.clone(),
        Role::Assistant => markup::render(&turn.content, palette),
    };
    format!("{color}{label}:{} {body}", palette.reset)
}

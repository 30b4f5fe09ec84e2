//! Terminal rendering of the lightweight markup found in replies.
//!
//! Precedence is fixed: fenced code blocks, then inline code spans, then
//! `**bold**`, then `*italic*`. Code is never emphasis-processed.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// ANSI sequences used when printing a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub code: &'static str,
    pub bold: &'static str,
    pub italic: &'static str,
    pub user: &'static str,
    pub assistant: &'static str,
    pub error: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Palette {
    /// No escape codes at all, for pipes and files.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            code: "",
            bold: "",
            italic: "",
            user: "",
            assistant: "",
            error: "",
            dim: "",
            reset: "",
        }
    }

    /// Bright colors for dark backgrounds.
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            code: "\x1b[96m",
            bold: "\x1b[1m",
            italic: "\x1b[3m",
            user: "\x1b[94m",
            assistant: "\x1b[92m",
            error: "\x1b[91m",
            dim: "\x1b[2m",
            reset: "\x1b[0m",
        }
    }

    /// Normal-intensity colors for light backgrounds.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            code: "\x1b[36m",
            bold: "\x1b[1m",
            italic: "\x1b[3m",
            user: "\x1b[34m",
            assistant: "\x1b[32m",
            error: "\x1b[31m",
            dim: "\x1b[2m",
            reset: "\x1b[0m",
        }
    }

    /// Palette for the `darkMode` setting.
    #[must_use]
    pub const fn for_theme(dark_mode: bool) -> Self {
        if dark_mode { Self::dark() } else { Self::light() }
    }
}

struct Patterns {
    fence: Regex,
    inline_code: Regex,
    bold: Regex,
    italic: Regex,
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(Patterns {
                fence: Regex::new(r"```(\w+)?\n([\s\S]*?)```").ok()?,
                inline_code: Regex::new(r"`([^`]+)`").ok()?,
                bold: Regex::new(r"\*\*([^*]+)\*\*").ok()?,
                italic: Regex::new(r"\*([^*]+)\*").ok()?,
            })
        })
        .as_ref()
}

/// Render reply markup for the terminal.
#[must_use]
pub fn render(text: &str, palette: &Palette) -> String {
    let Some(p) = patterns() else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in p.fence.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&render_inline(&text[last..whole.start()], p, palette));
        out.push_str(&render_block(caps.get(2).map_or("", |m| m.as_str()), palette));
        last = whole.end();
    }
    out.push_str(&render_inline(&text[last..], p, palette));
    out
}

fn render_block(body: &str, palette: &Palette) -> String {
    let lines: Vec<String> = body
        .trim_end_matches('\n')
        .lines()
        .map(|line| format!("    {line}"))
        .collect();
    format!("{}{}{}", palette.code, lines.join("\n"), palette.reset)
}

fn render_inline(segment: &str, p: &Patterns, palette: &Palette) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut last = 0;
    for caps in p.inline_code.captures_iter(segment) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&emphasize(&segment[last..whole.start()], p, palette));
        out.push_str(palette.code);
        out.push_str(caps.get(1).map_or("", |m| m.as_str()));
        out.push_str(palette.reset);
        last = whole.end();
    }
    out.push_str(&emphasize(&segment[last..], p, palette));
    out
}

fn emphasize(plain: &str, p: &Patterns, palette: &Palette) -> String {
    let bolded = p.bold.replace_all(plain, |c: &Captures| {
        format!("{}{}{}", palette.bold, &c[1], palette.reset)
    });
    p.italic
        .replace_all(&bolded, |c: &Captures| {
            format!("{}{}{}", palette.italic, &c[1], palette.reset)
        })
        .into_owned()
}

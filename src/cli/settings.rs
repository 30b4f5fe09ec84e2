//! `groqchat settings` command implementations.

use crate::cli::open_chat;
use crate::cli::render::Printer;
use crate::config::Config;
use crate::core::Settings;
use crate::error::Result;

/// Run `settings show`.
///
/// # Errors
///
/// Returns an error if storage cannot be opened.
pub fn run_show(config: &Config) -> Result<()> {
    let chat = open_chat(config)?;
    print!("{}", describe(&chat.settings()));
    Ok(())
}

/// Run `settings set <field> <value>`.
///
/// The whole settings object is re-saved after the change.
///
/// # Errors
///
/// Returns `Error::Validation` for an unknown field or bad value, or a
/// storage error.
pub fn run_set(config: &Config, field: &str, value: &str) -> Result<()> {
    let chat = open_chat(config)?;
    let mut settings = chat.settings();
    settings.set(field, value)?;
    chat.update_settings(settings.clone())?;
    Printer::for_settings(&settings).status("Settings saved");
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// One `name: value` line per setting.
#[must_use]
pub fn describe(settings: &Settings) -> String {
    format!(
        "model:         {}\ntemperature:   {}\nmax-tokens:    {}\ndark-mode:     {}\nsound-effects: {}\n",
        settings.model,
        settings.temperature,
        settings.max_tokens,
        on_off(settings.dark_mode),
        on_off(settings.sound_effects),
    )
}

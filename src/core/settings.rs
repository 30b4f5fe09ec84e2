//! User-adjustable chat settings.
//!
//! Settings are persisted as one JSON object. Loading overlays whatever
//! usable fields were stored on top of the defaults, so a partial or
//! partly-corrupted object still loads.

use crate::error::{Error, Result};
use crate::storage::{KeyValueStore, SETTINGS_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Accepted sampling temperatures.
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=2.0;

/// Sampling and presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Model identifier sent with every request.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Output token cap.
    pub max_tokens: u32,

    /// Dark terminal palette.
    pub dark_mode: bool,

    /// Ring the terminal bell on replies and errors.
    pub sound_effects: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            dark_mode: true,
            sound_effects: true,
        }
    }
}

impl Settings {
    /// Check that every field is usable for a request.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Validation("Model must not be empty".to_string()));
        }
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            return Err(Error::Validation(format!(
                "Temperature must be between {} and {}",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            )));
        }
        if self.max_tokens == 0 {
            return Err(Error::Validation(
                "Max tokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set one field from its textual form.
    ///
    /// Field names accept both `max-tokens` and `maxTokens` spellings.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for an unknown field or an unparsable or
    /// out-of-range value. `self` is left untouched on error.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        let value = value.trim();
        let bad_value = || Error::Validation(format!("Invalid value for {field}: {value}"));

        match field {
            "model" => updated.model = value.to_string(),
            "temperature" => updated.temperature = value.parse().map_err(|_| bad_value())?,
            "max-tokens" | "maxTokens" | "max_tokens" => {
                updated.max_tokens = value.parse().map_err(|_| bad_value())?;
            }
            "dark-mode" | "darkMode" | "dark_mode" => {
                updated.dark_mode = parse_toggle(value).ok_or_else(bad_value)?;
            }
            "sound-effects" | "soundEffects" | "sound_effects" => {
                updated.sound_effects = parse_toggle(value).ok_or_else(bad_value)?;
            }
            other => {
                return Err(Error::Validation(format!("Unknown setting: {other}")));
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Overlay well-formed fields of a stored object onto these settings.
    fn overlay(mut self, fields: &Map<String, Value>) -> Self {
        if let Some(model) = fields.get("model").and_then(Value::as_str) {
            if !model.trim().is_empty() {
                self.model = model.to_string();
            }
        }
        if let Some(t) = fields.get("temperature").and_then(Value::as_f64) {
            if TEMPERATURE_RANGE.contains(&t) {
                self.temperature = t;
            }
        }
        if let Some(n) = fields.get("maxTokens").and_then(Value::as_u64) {
            if let Ok(n) = u32::try_from(n) {
                if n > 0 {
                    self.max_tokens = n;
                }
            }
        }
        if let Some(b) = fields.get("darkMode").and_then(Value::as_bool) {
            self.dark_mode = b;
        }
        if let Some(b) = fields.get("soundEffects").and_then(Value::as_bool) {
            self.sound_effects = b;
        }
        self
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Load settings, merging persisted fields over the defaults.
///
/// Never fails: unreadable or malformed data counts as absent.
#[must_use]
pub fn load(store: &dyn KeyValueStore) -> Settings {
    let raw = match store.get(SETTINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Settings::default(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read settings, using defaults");
            return Settings::default();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(fields)) => Settings::default().overlay(&fields),
        Ok(_) => {
            tracing::warn!("stored settings are not an object, using defaults");
            Settings::default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed settings");
            Settings::default()
        }
    }
}

/// Persist the full settings object, replacing what was stored.
///
/// # Errors
///
/// Returns an error if serialization or the storage write fails.
pub fn save(store: &dyn KeyValueStore, settings: &Settings) -> Result<()> {
    let json = serde_json::to_string(settings)?;
    store.put(SETTINGS_KEY, &json)?;
    tracing::debug!(model = %settings.model, "saved settings");
    Ok(())
}

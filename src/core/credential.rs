//! API key handling.

use crate::error::{Error, Result};
use crate::storage::{CREDENTIAL_KEY, KeyValueStore};
use std::fmt;

const MASK_PREFIX_LEN: usize = 4;
const MASK_MIN_REVEAL_LEN: usize = 2 * MASK_PREFIX_LEN;

/// Bearer token for the completion endpoint.
///
/// `Debug` and `Display` never reveal the secret; call [`Credential::expose`]
/// at the one place it is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Build a credential from user input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the input is empty or whitespace-only.
    pub fn new(raw: &str) -> Result<Self> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(Error::Validation("Please enter an API key".to_string()));
        }
        Ok(Self(key.to_string()))
    }

    /// The raw secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First four characters followed by asterisks.
    ///
    /// Keys too short to hide most of their length are fully starred.
    #[must_use]
    pub fn masked(&self) -> String {
        let len = self.0.chars().count();
        if len <= MASK_MIN_REVEAL_LEN {
            return "*".repeat(MASK_MIN_REVEAL_LEN);
        }
        let visible: String = self.0.chars().take(MASK_PREFIX_LEN).collect();
        format!("{visible}{}", "*".repeat(len - MASK_PREFIX_LEN))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// Load the stored credential, if any.
///
/// A blank stored value counts as absent.
#[must_use]
pub fn load(store: &dyn KeyValueStore) -> Option<Credential> {
    match store.get(CREDENTIAL_KEY) {
        Ok(raw) => raw.and_then(|raw| Credential::new(&raw).ok()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read API key");
            None
        }
    }
}

/// Validate and persist a credential.
///
/// # Errors
///
/// Returns `Error::Validation` for blank input, or a storage error if the
/// write fails.
pub fn save(store: &dyn KeyValueStore, raw: &str) -> Result<Credential> {
    let credential = Credential::new(raw)?;
    store.put(CREDENTIAL_KEY, credential.expose())?;
    tracing::debug!("saved API key");
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    #[test]
    fn rejects_blank_input() {
        assert!(matches!(Credential::new(""), Err(Error::Validation(_))));
        assert!(matches!(Credential::new("  \t\n"), Err(Error::Validation(_))));
    }

    #[test]
    fn trims_input() {
        let credential = Credential::new("  gsk_abc  ").unwrap();
        assert_eq!(credential.expose(), "gsk_abc");
    }

    #[test]
    fn debug_and_display_hide_secret() {
        let credential = Credential::new("gsk_supersecret").unwrap();
        assert!(!format!("{credential:?}").contains("supersecret"));
        assert!(!format!("{credential}").contains("supersecret"));
    }

    #[test]
    fn masked_shows_prefix_only() {
        let credential = Credential::new("gsk_supersecret").unwrap();
        assert_eq!(credential.masked(), "gsk_***********");

        let nine = Credential::new("abcd12345").unwrap();
        assert_eq!(nine.masked(), "abcd*****");
    }

    #[test]
    fn short_keys_are_fully_masked() {
        for raw in ["ab", "abcd", "abcd1234"] {
            let masked = Credential::new(raw).unwrap().masked();
            assert_eq!(masked, "********");
            assert!(!masked.contains("ab"));
        }
    }

    #[test]
    fn save_and_load() {
        let store = MemoryBackend::new();
        save(&store, "gsk_abc").unwrap();
        assert_eq!(load(&store).unwrap().expose(), "gsk_abc");
    }

    #[test]
    fn save_blank_does_not_touch_store() {
        let store = MemoryBackend::new();
        save(&store, "gsk_abc").unwrap();
        assert!(save(&store, "   ").is_err());
        assert_eq!(load(&store).unwrap().expose(), "gsk_abc");
    }

    #[test]
    fn load_missing_or_blank_is_none() {
        let store = MemoryBackend::new();
        assert!(load(&store).is_none());

        store.put(CREDENTIAL_KEY, "   ").unwrap();
        assert!(load(&store).is_none());
    }
}

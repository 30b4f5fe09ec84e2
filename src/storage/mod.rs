//! Key/value storage backends for settings, credential, and chat history.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::{FileBackend, get_home};
pub use memory::MemoryBackend;
pub use traits::KeyValueStore;

/// Key holding the raw API key.
pub const CREDENTIAL_KEY: &str = "api_key";

/// Key holding the settings object.
pub const SETTINGS_KEY: &str = "settings.json";

/// Key holding the chat archive, most recent first.
pub const ARCHIVE_KEY: &str = "history.json";

/// Key holding the active conversation.
pub const SESSION_KEY: &str = "session.json";

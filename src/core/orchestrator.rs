//! The send-turn flow and the other chat commands.
//!
//! `Orchestrator` owns all application state explicitly. Presentation code
//! calls its commands and renders what they return; nothing else mutates
//! settings, the credential, the active session, or the archive.
//!
//! Sending is a small state machine: `Idle -> Sending -> Idle`. Only one
//! send may be in flight; a second `submit` (or a `start_new` /
//! `load_record` that would swap the session out from under it) fails with
//! [`Error::Busy`] without touching the network.

use crate::core::archive::{ChatArchive, ChatRecord};
use crate::core::client::CompletionClient;
use crate::core::credential::{self, Credential};
use crate::core::session::{ConversationSession, Turn};
use crate::core::settings::{self, Settings};
use crate::error::{ApiError, Error, Result};
use crate::storage::KeyValueStore;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Everything the chat commands read and mutate.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Current settings.
    pub settings: Settings,

    /// API key, if one has been saved.
    pub credential: Option<Credential>,

    /// Active conversation.
    pub session: ConversationSession,

    /// Past chats, most recent first.
    pub archive: ChatArchive,
}

impl AppState {
    /// Load every piece of state from storage, falling back to defaults.
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            settings: settings::load(store),
            credential: credential::load(store),
            session: ConversationSession::load(store),
            archive: ChatArchive::load(store),
        }
    }
}

/// Marks the single in-flight send; released on drop.
struct SendGuard<'a>(&'a AtomicBool);

impl<'a> SendGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Command interface over the chat state.
pub struct Orchestrator {
    store: Box<dyn KeyValueStore>,
    client: Box<dyn CompletionClient>,
    state: Mutex<AppState>,
    sending: AtomicBool,
}

impl Orchestrator {
    /// Load persisted state and wire up the collaborators.
    #[must_use]
    pub fn open(store: Box<dyn KeyValueStore>, client: Box<dyn CompletionClient>) -> Self {
        let state = AppState::load(store.as_ref());
        tracing::debug!(
            turns = state.session.len(),
            archived = state.archive.len(),
            has_key = state.credential.is_some(),
            "loaded chat state"
        );
        Self {
            store,
            client,
            state: Mutex::new(state),
            sending: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send one user message and wait for the reply.
    ///
    /// On success the reply is appended, the whole session is archived
    /// under its first user message, and both are persisted. On an API
    /// failure the user turn stays in the session, nothing is archived, and
    /// the error is returned.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` for a blank message (no state change).
    /// - `Error::Api(ApiError::MissingCredential)` with no key configured (no
    ///   state change, no request).
    /// - `Error::Busy` while another send is in flight.
    /// - `Error::Api` for remote, malformed, or transport failures.
    /// - Storage errors when persisting.
    pub fn submit(&self, text: &str) -> Result<String> {
        let message = text.trim();
        if message.is_empty() {
            return Err(Error::Validation("Please enter a message".to_string()));
        }
        if !self.has_credential() {
            return Err(ApiError::MissingCredential.into());
        }

        let _guard = SendGuard::acquire(&self.sending)?;

        let (session, settings, credential) = {
            let mut state = self.lock();
            state.session.append_user(message);
            state.session.persist(self.store.as_ref())?;
            (
                state.session.clone(),
                state.settings.clone(),
                state.credential.clone(),
            )
        };

        // Lock released: readers may observe the pending user turn
        let outcome = self
            .client
            .complete(&session, &settings, credential.as_ref());

        let mut guard = self.lock();
        let state = &mut *guard;
        match outcome {
            Ok(reply) => {
                state.session.append_assistant(reply.as_str());
                let title_source = state
                    .session
                    .first_user_message()
                    .unwrap_or(message)
                    .to_string();
                let record = state.archive.record_session(
                    &title_source,
                    state.session.snapshot(),
                    Utc::now(),
                );
                tracing::debug!(id = record.id, "archived chat");

                state.session.persist(self.store.as_ref())?;
                state.archive.persist(self.store.as_ref())?;
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "completion failed");
                Err(e.into())
            }
        }
    }

    /// Start a fresh conversation. The archive is untouched.
    ///
    /// # Errors
    ///
    /// Returns `Error::Busy` during a send, or a storage error.
    pub fn start_new(&self) -> Result<()> {
        let _guard = SendGuard::acquire(&self.sending)?;
        let mut state = self.lock();
        state.session.reset();
        state.session.persist(self.store.as_ref())
    }

    /// Replace the active session with an archived chat.
    ///
    /// Returns every stored turn for replay, including the first.
    ///
    /// # Errors
    ///
    /// Returns `Error::RecordNotFound`, `Error::Busy` during a send, or a
    /// storage error.
    pub fn load_record(&self, id: u64) -> Result<Vec<Turn>> {
        let _guard = SendGuard::acquire(&self.sending)?;
        let mut guard = self.lock();
        let state = &mut *guard;

        let turns = state
            .archive
            .get(id)
            .map(|record| record.turns.clone())
            .ok_or(Error::RecordNotFound(id))?;

        state.session.replace(turns.clone());
        state.session.persist(self.store.as_ref())?;
        Ok(turns)
    }

    /// Remove every archived chat.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn clear_archive(&self) -> Result<()> {
        let mut state = self.lock();
        state.archive.clear();
        state.archive.persist(self.store.as_ref())
    }

    /// Render the active session as a plain-text transcript.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the session is empty.
    pub fn export_active(&self) -> Result<String> {
        let state = self.lock();
        if state.session.is_empty() {
            return Err(Error::Validation("No chat to export".to_string()));
        }
        Ok(state.session.export_text())
    }

    /// Validate, persist, and adopt a new API key.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for blank input, or a storage error.
    pub fn save_credential(&self, raw: &str) -> Result<()> {
        let saved = credential::save(self.store.as_ref(), raw)?;
        self.lock().credential = Some(saved);
        Ok(())
    }

    /// Validate, persist, and adopt a complete settings object.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for out-of-range values, or a storage
    /// error.
    pub fn update_settings(&self, new_settings: Settings) -> Result<()> {
        new_settings.validate()?;
        settings::save(self.store.as_ref(), &new_settings)?;
        self.lock().settings = new_settings;
        Ok(())
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.lock().settings.clone()
    }

    /// Copy of the active session.
    #[must_use]
    pub fn session(&self) -> ConversationSession {
        self.lock().session.clone()
    }

    /// Copy of the archived chats, most recent first.
    #[must_use]
    pub fn archive(&self) -> Vec<ChatRecord> {
        self.lock().archive.list().to_vec()
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.lock().credential.is_some()
    }

    /// The configured API key, if any.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.lock().credential.clone()
    }

    /// Whether a send is in flight.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }
}

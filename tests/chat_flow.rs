//! Integration tests for the full send / archive / reload flow.

use groqchat::core::client::CompletionClient;
use groqchat::core::{ConversationSession, Credential, Orchestrator, Role, Settings, Turn};
use groqchat::error::{ApiError, Error};
use groqchat::storage::{
    ARCHIVE_KEY, FileBackend, KeyValueStore, MemoryBackend, SESSION_KEY, SETTINGS_KEY,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

/// Answers `reply to <last message>` and counts calls.
struct EchoClient {
    calls: Arc<AtomicUsize>,
}

impl CompletionClient for EchoClient {
    fn complete(
        &self,
        session: &ConversationSession,
        _settings: &Settings,
        credential: Option<&Credential>,
    ) -> Result<String, ApiError> {
        credential.ok_or(ApiError::MissingCredential)?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last = session.turns().last().map_or("", |t| t.content.as_str());
        Ok(format!("reply to {last}"))
    }
}

/// Fails every call with a remote error.
struct FailingClient;

impl CompletionClient for FailingClient {
    fn complete(
        &self,
        _session: &ConversationSession,
        _settings: &Settings,
        _credential: Option<&Credential>,
    ) -> Result<String, ApiError> {
        Err(ApiError::Remote("API request failed".to_string()))
    }
}

/// Blocks inside `complete` until released, so a send can be held in flight.
struct GatedClient {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
    calls: Arc<AtomicUsize>,
}

impl CompletionClient for GatedClient {
    fn complete(
        &self,
        _session: &ConversationSession,
        _settings: &Settings,
        _credential: Option<&Credential>,
    ) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Ok("finally".to_string())
    }
}

fn echo_chat(store: Arc<MemoryBackend>) -> (Orchestrator, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = EchoClient {
        calls: Arc::clone(&calls),
    };
    (Orchestrator::open(Box::new(store), Box::new(client)), calls)
}

#[test]
fn full_flow_send_archive_new_load() {
    let store = Arc::new(MemoryBackend::new());
    let (chat, calls) = echo_chat(Arc::clone(&store));
    chat.save_credential("gsk_test").unwrap();

    // Two turns in the first chat
    assert_eq!(chat.submit("what is rust?").unwrap(), "reply to what is rust?");
    chat.submit("and cargo?").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Each successful exchange archives a snapshot titled by the first message
    let archive = chat.archive();
    assert_eq!(archive.len(), 2);
    assert!(archive.iter().all(|r| r.title == "what is rust?"));
    assert_eq!(archive[0].turns.len(), 4);

    // New chat leaves history alone
    chat.start_new().unwrap();
    assert!(chat.session().is_empty());
    chat.submit("second chat").unwrap();
    assert_eq!(chat.archive()[0].title, "second chat");

    // Loading the older record brings back every turn, first one included
    let older = chat.archive()[1].id;
    let replay = chat.load_record(older).unwrap();
    assert_eq!(replay[0], Turn::user("what is rust?"));
    assert_eq!(replay.len(), 4);

    // Persisted keys reflect the state
    assert!(store.get(ARCHIVE_KEY).unwrap().is_some());
    assert!(store.get(SESSION_KEY).unwrap().unwrap().contains("what is rust?"));
}

#[test]
fn archive_keeps_twenty_most_recent_exchanges() {
    let store = Arc::new(MemoryBackend::new());
    let (chat, _) = echo_chat(store);
    chat.save_credential("gsk_test").unwrap();

    for i in 0..25 {
        chat.start_new().unwrap();
        chat.submit(&format!("chat number {i}")).unwrap();
    }

    let archive = chat.archive();
    assert_eq!(archive.len(), 20);
    let titles: Vec<String> = archive.iter().map(|r| r.title.clone()).collect();
    let expected: Vec<String> = (5..25).rev().map(|i| format!("chat number {i}")).collect();
    assert_eq!(titles, expected);
    assert!(archive.windows(2).all(|w| w[0].id > w[1].id));
}

#[test]
fn long_first_message_is_truncated_in_title() {
    let store = Arc::new(MemoryBackend::new());
    let (chat, _) = echo_chat(store);
    chat.save_credential("gsk_test").unwrap();

    let message = "a".repeat(80);
    chat.submit(&message).unwrap();
    assert_eq!(chat.archive()[0].title, format!("{}…", "a".repeat(50)));
}

#[test]
fn no_request_without_credential() {
    let store = Arc::new(MemoryBackend::new());
    let (chat, calls) = echo_chat(store);

    let err = chat.submit("hello").unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::MissingCredential)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(chat.session().is_empty());
}

#[test]
fn failure_after_success_keeps_unanswered_turn() {
    let store = Arc::new(MemoryBackend::new());
    {
        let (chat, _) = echo_chat(Arc::clone(&store));
        chat.save_credential("gsk_test").unwrap();
        chat.submit("hi").unwrap();
    }

    let chat = Orchestrator::open(Box::new(Arc::clone(&store)), Box::new(FailingClient));
    let err = chat.submit("are you there?").unwrap_err();
    assert_eq!(err.to_string(), "API request failed");

    let turns = chat.session().snapshot();
    let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    assert_eq!(turns[2].content, "are you there?");

    // Archive still holds only the earlier exchange
    let archive = chat.archive();
    assert_eq!(archive.len(), 1);
    assert_eq!(archive[0].turns.len(), 2);

    // The client can be retried after a failure
    assert!(!chat.is_sending());
}

#[test]
fn second_submit_while_sending_is_rejected() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let client = GatedClient {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
        calls: Arc::clone(&calls),
    };

    let chat = Arc::new(Orchestrator::open(
        Box::new(MemoryBackend::new()),
        Box::new(client),
    ));
    chat.save_credential("gsk_test").unwrap();

    let first = {
        let chat = Arc::clone(&chat);
        thread::spawn(move || chat.submit("first"))
    };

    entered_rx.recv().unwrap();
    assert!(chat.is_sending());

    assert!(matches!(chat.submit("second"), Err(Error::Busy)));
    assert!(matches!(chat.start_new(), Err(Error::Busy)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    release_tx.send(()).unwrap();
    assert_eq!(first.join().unwrap().unwrap(), "finally");

    assert!(!chat.is_sending());
    assert_eq!(chat.session().len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn export_matches_transcript_format() {
    let store = Arc::new(MemoryBackend::new());
    let (chat, _) = echo_chat(store);
    chat.save_credential("gsk_test").unwrap();

    assert!(matches!(chat.export_active(), Err(Error::Validation(_))));
    chat.submit("hi").unwrap();
    assert_eq!(chat.export_active().unwrap(), "You: hi\n\nAI: reply to hi\n\n");
}

#[test]
fn file_backend_round_trip_across_reopen() {
    let temp = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    {
        let store = FileBackend::new(temp.path().to_path_buf()).unwrap();
        let chat = Orchestrator::open(
            Box::new(store),
            Box::new(EchoClient {
                calls: Arc::clone(&calls),
            }),
        );
        chat.save_credential("gsk_file").unwrap();
        let mut settings = chat.settings();
        settings.set("temperature", "0.2").unwrap();
        chat.update_settings(settings).unwrap();
        chat.submit("persist me").unwrap();
    }

    let store = FileBackend::new(temp.path().to_path_buf()).unwrap();
    let chat = Orchestrator::open(Box::new(store), Box::new(EchoClient { calls }));
    assert_eq!(chat.credential().unwrap().expose(), "gsk_file");
    assert!((chat.settings().temperature - 0.2).abs() < f64::EPSILON);
    assert_eq!(chat.session().len(), 2);
    assert_eq!(chat.archive()[0].title, "persist me");
}

#[test]
fn corrupted_storage_starts_clean() {
    let store = Arc::new(MemoryBackend::new());
    store.put(ARCHIVE_KEY, "not json at all").unwrap();
    store.put(SESSION_KEY, "{").unwrap();
    store.put(SETTINGS_KEY, r#"{"maxTokens":"lots"}"#).unwrap();

    let (chat, _) = echo_chat(store);
    assert!(chat.archive().is_empty());
    assert!(chat.session().is_empty());
    assert_eq!(chat.settings(), Settings::default());
}

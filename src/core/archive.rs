//! Bounded archive of past chats.

use crate::core::session::Turn;
use crate::error::Result;
use crate::storage::{ARCHIVE_KEY, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of archived chats kept.
pub const MAX_RECORDS: usize = 20;

/// Title length in characters before truncation.
pub const TITLE_LIMIT: usize = 50;

/// Appended to truncated titles.
pub const ELLIPSIS: &str = "…";

/// Snapshot of one chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRecord {
    /// Creation time in Unix milliseconds, unique within the archive.
    pub id: u64,

    /// First user message, truncated.
    pub title: String,

    /// When the record was made.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,

    /// The conversation at that moment.
    #[serde(rename = "messages")]
    pub turns: Vec<Turn>,
}

/// Derive a record title from the first user message.
#[must_use]
pub fn make_title(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TITLE_LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}{ELLIPSIS}")
    } else {
        head
    }
}

/// Most-recent-first collection of chat records, never longer than
/// [`MAX_RECORDS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatArchive {
    records: Vec<ChatRecord>,
}

impl ChatArchive {
    /// Create an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a record for `turns`, evicting the oldest beyond the cap.
    pub fn record_session(
        &mut self,
        first_user_message: &str,
        turns: Vec<Turn>,
        now: DateTime<Utc>,
    ) -> &ChatRecord {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let id = match self.records.first() {
            Some(latest) if latest.id >= millis => latest.id + 1,
            _ => millis,
        };

        self.records.insert(
            0,
            ChatRecord {
                id,
                title: make_title(first_user_message),
                created_at: now,
                turns,
            },
        );
        self.records.truncate(MAX_RECORDS);
        &self.records[0]
    }

    /// Records, most recent first.
    #[must_use]
    pub fn list(&self) -> &[ChatRecord] {
        &self.records
    }

    /// Find a record by id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&ChatRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the archive is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load the persisted archive.
    ///
    /// Missing or malformed data yields an empty archive.
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(ARCHIVE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read chat history, starting empty");
                return Self::new();
            }
        };

        match serde_json::from_str::<Vec<ChatRecord>>(&raw) {
            Ok(mut records) => {
                records.truncate(MAX_RECORDS);
                Self { records }
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed chat history");
                Self::new()
            }
        }
    }

    /// Persist the whole archive, replacing the stored copy.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(&self.records)?;
        store.put(ARCHIVE_KEY, &json)?;
        tracing::info!(records = self.records.len(), "saved chat history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use chrono::Duration;
    use proptest::prelude::*;

    fn exchange(text: &str) -> Vec<Turn> {
        vec![Turn::user(text), Turn::assistant(format!("re: {text}"))]
    }

    #[test]
    fn short_title_is_unchanged() {
        assert_eq!(make_title("hello"), "hello");
        assert_eq!(make_title(&"x".repeat(50)), "x".repeat(50));
    }

    #[test]
    fn long_title_is_truncated_with_marker() {
        let title = make_title(&"x".repeat(51));
        assert_eq!(title, format!("{}…", "x".repeat(50)));
    }

    #[test]
    fn title_truncation_respects_char_boundaries() {
        let text = "é".repeat(60);
        assert_eq!(make_title(&text), format!("{}…", "é".repeat(50)));
    }

    #[test]
    fn record_prepends() {
        let mut archive = ChatArchive::new();
        let now = Utc::now();
        archive.record_session("first", exchange("first"), now);
        archive.record_session("second", exchange("second"), now + Duration::seconds(1));

        let titles: Vec<&str> = archive.list().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let mut archive = ChatArchive::new();
        let now = Utc::now();
        let first = archive.record_session("a", exchange("a"), now).id;
        let second = archive.record_session("b", exchange("b"), now).id;
        assert_eq!(second, first + 1);
    }

    #[test]
    fn evicts_oldest_beyond_cap() {
        let mut archive = ChatArchive::new();
        let start = Utc::now();
        for i in 0..25 {
            let text = format!("message {i}");
            archive.record_session(&text, exchange(&text), start + Duration::seconds(i));
        }

        assert_eq!(archive.len(), MAX_RECORDS);
        let titles: Vec<String> = archive.list().iter().map(|r| r.title.clone()).collect();
        let expected: Vec<String> = (5..25).rev().map(|i| format!("message {i}")).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn get_finds_by_id() {
        let mut archive = ChatArchive::new();
        let id = archive.record_session("hi", exchange("hi"), Utc::now()).id;
        assert_eq!(archive.get(id).unwrap().title, "hi");
        assert!(archive.get(id + 1).is_none());
    }

    #[test]
    fn stored_shape_matches_history_format() {
        let mut archive = ChatArchive::new();
        archive.record_session("hi", exchange("hi"), Utc::now());
        let json = serde_json::to_value(archive.list()).unwrap();
        let record = &json[0];
        assert!(record.get("id").is_some());
        assert!(record.get("title").is_some());
        assert!(record.get("timestamp").is_some());
        assert_eq!(record["messages"][0]["role"], "user");
    }

    #[test]
    fn persist_and_load() {
        let store = MemoryBackend::new();
        let mut archive = ChatArchive::new();
        archive.record_session("hi", exchange("hi"), Utc::now());
        archive.persist(&store).unwrap();

        assert_eq!(ChatArchive::load(&store), archive);
    }

    #[test]
    fn clear_then_persist_stores_empty_list() {
        let store = MemoryBackend::new();
        let mut archive = ChatArchive::new();
        archive.record_session("hi", exchange("hi"), Utc::now());
        archive.persist(&store).unwrap();

        archive.clear();
        archive.persist(&store).unwrap();

        assert_eq!(store.get(ARCHIVE_KEY).unwrap().as_deref(), Some("[]"));
        assert!(ChatArchive::load(&store).is_empty());
    }

    #[test]
    fn load_malformed_is_empty() {
        let store = MemoryBackend::new();
        store.put(ARCHIVE_KEY, "{ not json").unwrap();
        assert!(ChatArchive::load(&store).is_empty());

        store.put(ARCHIVE_KEY, r#"[{"id":"x"}]"#).unwrap();
        assert!(ChatArchive::load(&store).is_empty());
    }

    #[test]
    fn load_enforces_cap() {
        let store = MemoryBackend::new();
        let now = Utc::now();
        let records: Vec<ChatRecord> = (0..30)
            .map(|i| ChatRecord {
                id: i,
                title: format!("chat {i}"),
                created_at: now,
                turns: exchange("x"),
            })
            .collect();
        store
            .put(ARCHIVE_KEY, &serde_json::to_string(&records).unwrap())
            .unwrap();

        let archive = ChatArchive::load(&store);
        assert_eq!(archive.len(), MAX_RECORDS);
        assert_eq!(archive.list()[0].id, 0);
    }

    proptest! {
        #[test]
        fn truncation_law(text in "\\PC{0,120}") {
            let len = text.chars().count();
            let head: String = text.chars().take(TITLE_LIMIT).collect();
            let expected = if len > TITLE_LIMIT { format!("{head}…") } else { head };
            prop_assert_eq!(make_title(&text), expected);
        }
    }
}

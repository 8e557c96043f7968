//! Per-chat session state: the flow step enum, the session record, and the
//! in-memory store that serializes events per chat identity.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// The steps of the mail composition flow.
///
/// Progresses `WaitingForEmail → WaitingForContentType → { WaitingForTextMessage
/// | WaitingForRename → [WaitingForNewName] → WaitingForFile →
/// WaitingForDescription } → WaitingForSubject`, then the session is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    WaitingForEmail,
    WaitingForContentType,
    WaitingForTextMessage,
    WaitingForRename,
    WaitingForNewName,
    WaitingForFile,
    WaitingForDescription,
    WaitingForSubject,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::WaitingForEmail => "waiting_for_email",
            Self::WaitingForContentType => "waiting_for_content_type",
            Self::WaitingForTextMessage => "waiting_for_text_message",
            Self::WaitingForRename => "waiting_for_rename",
            Self::WaitingForNewName => "waiting_for_new_name",
            Self::WaitingForFile => "waiting_for_file",
            Self::WaitingForDescription => "waiting_for_description",
            Self::WaitingForSubject => "waiting_for_subject",
        };
        write!(f, "{s}")
    }
}

/// What the user chose to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Photo,
    File,
}

/// What kind of attachment was actually uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Photo,
    Document,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Photo => write!(f, "photo"),
            Self::Document => write!(f, "document"),
        }
    }
}

/// One in-progress mail composition flow.
///
/// Exists in the store iff the chat has an uncompleted flow. Mutated only by
/// the engine while holding that chat's event lock.
#[derive(Debug, Clone)]
pub struct Session {
    pub step: Step,
    pub created_at: DateTime<Utc>,
    pub email: Option<String>,
    pub content_type: Option<ContentKind>,
    pub text_message: Option<String>,
    pub new_filename: Option<String>,
    pub staged_file: Option<PathBuf>,
    pub file_kind: Option<FileKind>,
    pub description: Option<String>,
}

impl Session {
    /// Fresh session at the start of the flow.
    pub fn new() -> Self {
        Self {
            step: Step::WaitingForEmail,
            created_at: Utc::now(),
            email: None,
            content_type: None,
            text_message: None,
            new_filename: None,
            staged_file: None,
            file_kind: None,
            description: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory session store keyed by chat id.
///
/// Two layers of locking: the map itself is behind an `RwLock`, and each chat
/// id additionally has its own `Mutex` acquired for the full duration of
/// handling one event. That serializes rapid messages (and `/cancel`) from
/// the same chat against any staging or send in flight, while different chats
/// proceed in parallel.
pub struct SessionStore {
    sessions: RwLock<HashMap<i64, Session>>,
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the per-chat event lock. Held across the whole handle cycle.
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(chat_id).or_default())
        };
        lock.lock_owned().await
    }

    pub async fn get(&self, chat_id: i64) -> Option<Session> {
        self.sessions.read().await.get(&chat_id).cloned()
    }

    pub async fn set(&self, chat_id: i64, session: Session) {
        self.sessions.write().await.insert(chat_id, session);
    }

    pub async fn remove(&self, chat_id: i64) -> Option<Session> {
        self.sessions.write().await.remove(&chat_id)
    }

    pub async fn contains(&self, chat_id: i64) -> bool {
        self.sessions.read().await.contains_key(&chat_id)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_waiting_for_email() {
        let session = Session::new();
        assert_eq!(session.step, Step::WaitingForEmail);
        assert!(session.email.is_none());
        assert!(session.content_type.is_none());
        assert!(session.staged_file.is_none());
        assert!(session.description.is_none());
    }

    #[test]
    fn step_display_matches_serde() {
        let steps = [
            Step::WaitingForEmail,
            Step::WaitingForContentType,
            Step::WaitingForTextMessage,
            Step::WaitingForRename,
            Step::WaitingForNewName,
            Step::WaitingForFile,
            Step::WaitingForDescription,
            Step::WaitingForSubject,
        ];
        for step in steps {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn file_kind_display() {
        assert_eq!(FileKind::Photo.to_string(), "photo");
        assert_eq!(FileKind::Document.to_string(), "document");
    }

    #[tokio::test]
    async fn store_get_set_remove() {
        let store = SessionStore::new();
        assert!(store.get(1).await.is_none());
        assert!(!store.contains(1).await);

        store.set(1, Session::new()).await;
        assert!(store.contains(1).await);
        assert_eq!(store.get(1).await.unwrap().step, Step::WaitingForEmail);

        let removed = store.remove(1).await;
        assert!(removed.is_some());
        assert!(!store.contains(1).await);
        assert!(store.remove(1).await.is_none());
    }

    #[tokio::test]
    async fn store_keys_are_independent() {
        let store = SessionStore::new();
        store.set(1, Session::new()).await;
        let mut other = Session::new();
        other.step = Step::WaitingForSubject;
        store.set(2, other).await;

        assert_eq!(store.get(1).await.unwrap().step, Step::WaitingForEmail);
        assert_eq!(store.get(2).await.unwrap().step, Step::WaitingForSubject);

        store.remove(1).await;
        assert!(store.contains(2).await);
    }

    #[tokio::test]
    async fn chat_lock_serializes_same_chat() {
        let store = Arc::new(SessionStore::new());

        let guard = store.lock_chat(1).await;
        // A different chat is not blocked.
        let other = store.lock_chat(2).await;
        drop(other);

        // The same chat is blocked until the guard drops.
        let store2 = Arc::clone(&store);
        let pending = tokio::spawn(async move {
            let _g = store2.lock_chat(1).await;
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        drop(guard);
        pending.await.unwrap();
    }
}

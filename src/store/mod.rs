//! Read-only record store boundary.
//!
//! The drafting pipeline only ever reads four things: the thread between a
//! practice and a doctor, that thread's messages, the doctor's display name,
//! and the practice's name. [`RecordStore`] is that contract; absent records
//! come back as the typed [`StoreError::NotFound`] so callers branch on the
//! error kind rather than on message text.
//!
//! [`sqlite::SqliteStore`] is the bundled implementation.

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// A conversation thread between one practice and one doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Thread identifier.
    pub id: i64,
    /// Practice on the other side of the thread.
    pub practice_id: i64,
    /// Doctor the thread belongs to.
    pub doctor_id: i64,
}

/// A single message in a thread. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: String,
    /// Message body text.
    pub body: String,
    /// Sender: the doctor's id for outbound messages, a practice user otherwise.
    pub user_id: i64,
    /// Doctor associated with the message, when recorded.
    pub doctor_id: Option<i64>,
    /// Whether the recipient has read the message.
    pub is_read: bool,
}

/// Sent/received counts for a thread, relative to the requesting doctor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Messages sent by the doctor.
    #[serde(rename = "messages_sent")]
    pub sent: u32,
    /// Messages received from the practice.
    #[serde(rename = "messages_received")]
    pub received: u32,
    /// All messages in the thread.
    #[serde(rename = "total_messages")]
    pub total: u32,
}

impl HistorySummary {
    /// Count messages by sender. `sent + received == total` by construction.
    pub fn from_messages(doctor_id: i64, messages: &[Message]) -> Self {
        let sent = messages.iter().filter(|m| m.user_id == doctor_id).count();
        let received = messages.len().saturating_sub(sent);
        let sent = u32::try_from(sent).unwrap_or(u32::MAX);
        let received = u32::try_from(received).unwrap_or(u32::MAX);
        Self {
            sent,
            received,
            total: sent.saturating_add(received),
        }
    }

    /// Whether the counts agree with each other.
    pub fn is_consistent(&self) -> bool {
        self.sent.checked_add(self.received) == Some(self.total)
    }
}

/// Chronological message history of a thread, seen from one doctor's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadHistory {
    /// The doctor the history was loaded for.
    pub doctor_id: i64,
    /// Sent/received counts.
    pub summary: HistorySummary,
    /// Messages, oldest first.
    pub messages: Vec<Message>,
}

impl ThreadHistory {
    /// Build a history and its summary from chronological messages.
    pub fn new(doctor_id: i64, messages: Vec<Message>) -> Self {
        Self {
            doctor_id,
            summary: HistorySummary::from_messages(doctor_id, &messages),
            messages,
        }
    }

    /// History of a first-time application: no messages, zero counts.
    pub fn empty(doctor_id: i64) -> Self {
        Self {
            doctor_id,
            summary: HistorySummary::default(),
            messages: Vec::new(),
        }
    }

    /// Whether a message was written by the doctor this history belongs to.
    pub fn is_from_doctor(&self, message: &Message) -> bool {
        message.user_id == self.doctor_id
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Kind of record a lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Practice/doctor conversation thread.
    Thread,
    /// Doctor user record.
    Doctor,
    /// Practice record.
    Practice,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Thread => "thread",
            Self::Doctor => "doctor",
            Self::Practice => "practice",
        })
    }
}

/// Errors from the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{record} not found: {id}")]
    NotFound {
        /// What was looked up.
        record: RecordKind,
        /// The key that was looked up.
        id: String,
    },

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data could not be interpreted.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Whether this is the typed not-found tag.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read-only key lookups the drafting pipeline needs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Find the thread between a practice and a doctor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no thread exists.
    async fn find_thread(&self, practice_id: i64, doctor_id: i64) -> Result<Thread, StoreError>;

    /// List a thread's messages, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    async fn list_messages(&self, thread_id: i64) -> Result<Vec<Message>, StoreError>;

    /// Look up a doctor's display name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the doctor does not exist.
    async fn find_user_display_name(&self, doctor_id: i64) -> Result<String, StoreError>;

    /// Look up a practice's name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the practice does not exist.
    async fn find_practice_name(&self, practice_id: i64) -> Result<String, StoreError>;
}

/// Load the thread between a practice and a doctor with its summary.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] when the thread does not exist, or any
/// other [`StoreError`] from the underlying lookups.
pub async fn load_thread_history(
    store: &dyn RecordStore,
    practice_id: i64,
    doctor_id: i64,
) -> Result<ThreadHistory, StoreError> {
    let thread = store.find_thread(practice_id, doctor_id).await?;
    let messages = store.list_messages(thread.id).await?;
    let history = ThreadHistory::new(doctor_id, messages);
    debug!(
        thread_id = thread.id,
        sent = history.summary.sent,
        received = history.summary.received,
        "thread history loaded"
    );
    Ok(history)
}

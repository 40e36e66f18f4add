//! Secure messages between a patient and their care team.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{MessageId, UserId};

/// Whether a message was written directly or is a therapist-originated
/// reminder. Nudges are only sent to patients who allow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Direct,
    Nudge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_key: String,
    pub from: UserId,
    pub to: UserId,
    pub body: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(
        from: UserId,
        to: UserId,
        body: impl Into<String>,
        kind: MessageKind,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            thread_key: thread_key(&from, &to),
            from,
            to,
            body: body.into(),
            kind,
            created_at: at,
            read_at: None,
        }
    }
}

/// The key shared by both directions of a conversation: the two ids sorted
/// and joined with ':'.
pub fn thread_key(a: &UserId, b: &UserId) -> String {
    if a <= b {
        format!("{a}:{b}")
    } else {
        format!("{b}:{a}")
    }
}

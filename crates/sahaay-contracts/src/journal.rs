//! Journal entries, emotions, and per-entry share scopes.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{EntryId, UserId};

/// The fixed, closed set of emotions an entry can be tagged with.
///
/// Declaration order is the canonical display order and breaks ties when
/// ranking emotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Anxious,
    Calm,
    Love,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Anxious,
        Emotion::Calm,
        Emotion::Love,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Anxious => "Anxious",
            Emotion::Calm => "Calm",
            Emotion::Love => "Love",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-entry sharing override, independent of the global consent flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareScope {
    /// Private to the patient.
    None,
    /// Shared with the connected therapist.
    Therapist,
    /// Shared with the therapist, accompanied by a generated summary.
    TherapistAi,
}

impl ShareScope {
    pub fn is_shared(&self) -> bool {
        !matches!(self, ShareScope::None)
    }
}

/// One journal entry written by a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,
    pub owner: UserId,
    pub content: String,
    pub emotion: Emotion,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub scope: ShareScope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Create a new private-by-default entry stamped at `at`.
    pub fn new(
        owner: UserId,
        content: impl Into<String>,
        emotion: Emotion,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            owner,
            content: content.into(),
            emotion,
            tags: BTreeSet::new(),
            scope: ShareScope::None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn with_scope(mut self, scope: ShareScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags
            .into_iter()
            .map(|tag| {
                let tag: String = tag.into();
                tag.trim().to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    /// Change the share scope and stamp `updated_at`.
    pub fn rescope(&mut self, scope: ShareScope, at: DateTime<Utc>) {
        self.scope = scope;
        self.updated_at = at;
    }
}

//! Patient-owned consent settings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Four independent sharing flags plus the time any of them last changed.
///
/// Only the owning patient mutates these. Every change goes through
/// [`ConsentSettings::set`] so `updated_at` is always stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSettings {
    pub share_mood: bool,
    pub share_text: bool,
    pub share_assessments: bool,
    pub allow_nudges: bool,
    pub updated_at: DateTime<Utc>,
}

/// Names one of the four consent flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentField {
    ShareMood,
    ShareText,
    ShareAssessments,
    AllowNudges,
}

impl ConsentField {
    pub const ALL: [ConsentField; 4] = [
        ConsentField::ShareMood,
        ConsentField::ShareText,
        ConsentField::ShareAssessments,
        ConsentField::AllowNudges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentField::ShareMood => "share_mood",
            ConsentField::ShareText => "share_text",
            ConsentField::ShareAssessments => "share_assessments",
            ConsentField::AllowNudges => "allow_nudges",
        }
    }
}

impl fmt::Display for ConsentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConsentSettings {
    /// Everything shared, as a newly connected patient starts.
    pub fn all_shared(at: DateTime<Utc>) -> Self {
        Self {
            share_mood: true,
            share_text: true,
            share_assessments: true,
            allow_nudges: true,
            updated_at: at,
        }
    }

    /// Nothing shared.
    pub fn nothing_shared(at: DateTime<Utc>) -> Self {
        Self {
            share_mood: false,
            share_text: false,
            share_assessments: false,
            allow_nudges: false,
            updated_at: at,
        }
    }

    pub fn get(&self, field: ConsentField) -> bool {
        match field {
            ConsentField::ShareMood => self.share_mood,
            ConsentField::ShareText => self.share_text,
            ConsentField::ShareAssessments => self.share_assessments,
            ConsentField::AllowNudges => self.allow_nudges,
        }
    }

    /// Set one flag and stamp `updated_at`, even when the value is unchanged.
    pub fn set(&mut self, field: ConsentField, value: bool, at: DateTime<Utc>) {
        let slot = match field {
            ConsentField::ShareMood => &mut self.share_mood,
            ConsentField::ShareText => &mut self.share_text,
            ConsentField::ShareAssessments => &mut self.share_assessments,
            ConsentField::AllowNudges => &mut self.allow_nudges,
        };
        *slot = value;
        self.updated_at = at;
    }
}

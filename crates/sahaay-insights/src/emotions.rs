//! Emotion aggregation over journal entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use sahaay_contracts::journal::{Emotion, JournalEntry};

/// Count of entries per emotion. Every emotion is present, zero or not.
pub fn emotion_counts(entries: &[JournalEntry]) -> BTreeMap<Emotion, usize> {
    let mut counts: BTreeMap<Emotion, usize> = Emotion::ALL.iter().map(|e| (*e, 0)).collect();
    for entry in entries {
        *counts.entry(entry.emotion).or_insert(0) += 1;
    }
    counts
}

/// One slice of the emotion distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionShare {
    pub emotion: Emotion,
    pub count: usize,
    /// Share of all entries, 0–100, rounded to the nearest whole percent.
    pub percent: u32,
}

/// Emotions that occur at least once, in canonical emotion order.
pub fn emotion_distribution(entries: &[JournalEntry]) -> Vec<EmotionShare> {
    let total = entries.len();
    emotion_counts(entries)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(emotion, count)| EmotionShare {
            emotion,
            count,
            percent: ((count as f64 / total as f64) * 100.0).round() as u32,
        })
        .collect()
}

/// The most frequent emotion. Ties go to the emotion listed first; `None`
/// when there are no entries.
pub fn dominant_emotion(entries: &[JournalEntry]) -> Option<Emotion> {
    let counts = emotion_counts(entries);
    let mut best: Option<(Emotion, usize)> = None;
    for (emotion, count) in counts {
        if count == 0 {
            continue;
        }
        match best {
            Some((_, top)) if top >= count => {}
            _ => best = Some((emotion, count)),
        }
    }
    best.map(|(emotion, _)| emotion)
}

/// Entries created in the `days` days up to and including `now`.
pub fn entries_within(entries: &[JournalEntry], now: DateTime<Utc>, days: i64) -> Vec<&JournalEntry> {
    let cutoff = now - Duration::days(days);
    entries
        .iter()
        .filter(|e| e.created_at >= cutoff && e.created_at <= now)
        .collect()
}

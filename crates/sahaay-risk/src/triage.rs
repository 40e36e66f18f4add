//! Filtering, ordering, and summarizing flags for a reviewer's queue.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sahaay_contracts::risk::{FlagStatus, RiskFlag, RiskLevel};

/// Narrows a flag list. `None` fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageFilter {
    pub severity: Option<RiskLevel>,
    pub status: Option<FlagStatus>,
    /// Case-insensitive substring of the note or the patient id.
    pub search: Option<String>,
}

impl TriageFilter {
    pub fn matches(&self, flag: &RiskFlag) -> bool {
        if self.severity.is_some_and(|s| s != flag.severity) {
            return false;
        }
        if self.status.is_some_and(|s| s != flag.status()) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                flag.note.to_lowercase().contains(&term)
                    || flag.patient_id.as_str().to_lowercase().contains(&term)
            }
            _ => true,
        }
    }

    pub fn apply<'a>(&self, flags: &'a [RiskFlag]) -> Vec<&'a RiskFlag> {
        flags.iter().filter(|f| self.matches(f)).collect()
    }
}

/// Pending first, then most severe, then newest.
pub fn sort_for_review(flags: &mut [RiskFlag]) {
    flags.sort_by(|a, b| {
        b.is_pending()
            .cmp(&a.is_pending())
            .then(b.severity.cmp(&a.severity))
            .then(b.created_at.cmp(&a.created_at))
    });
}

/// Headline counts for the review queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageSummary {
    pub total: usize,
    pub pending: usize,
    pub acknowledged: usize,
    pub high_pending: usize,
    /// Distinct patients with at least one flag.
    pub patients_affected: usize,
    /// Mean age of pending flags at `now`, rounded to whole hours. 0 when
    /// nothing is pending.
    pub mean_pending_hours: i64,
}

pub fn summarize(flags: &[RiskFlag], now: DateTime<Utc>) -> TriageSummary {
    let pending: Vec<&RiskFlag> = flags.iter().filter(|f| f.is_pending()).collect();
    let patients: HashSet<&str> = flags.iter().map(|f| f.patient_id.as_str()).collect();

    let mean_pending_hours = if pending.is_empty() {
        0
    } else {
        let total_minutes: i64 =
            pending.iter().map(|f| (now - f.created_at).num_minutes()).sum();
        let mean_minutes = total_minutes as f64 / pending.len() as f64;
        (mean_minutes / 60.0).round() as i64
    };

    TriageSummary {
        total: flags.len(),
        pending: pending.len(),
        acknowledged: flags.len() - pending.len(),
        high_pending: pending.iter().filter(|f| f.severity == RiskLevel::High).count(),
        patients_affected: patients.len(),
        mean_pending_hours,
    }
}

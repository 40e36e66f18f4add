//! Deriving risk flags from assessments and journal entries.

use chrono::{DateTime, Utc};
use tracing::debug;

use sahaay_assessment::{has_crisis_indicator, interpret, SeverityTier};
use sahaay_contracts::{
    assessment::AssessmentRecord,
    journal::JournalEntry,
    risk::{RiskFlag, RiskLevel, RiskSource},
};

/// Phrases that indicate a patient may be in crisis. Matched
/// case-insensitively as substrings of journal content.
pub const WARNING_PHRASES: [&str; 8] = [
    "i want to hurt myself",
    "i want to end my life",
    "i feel hopeless",
    "i can't go on",
    "hurt myself",
    "kill myself",
    "end it all",
    "end my life",
];

/// The first warning phrase found in `text`, if any.
pub fn find_warning_phrase(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase().replace('\u{2019}', "'");
    WARNING_PHRASES.iter().copied().find(|p| lowered.contains(p))
}

/// Raise a flag for a scored assessment, if it warrants one.
///
/// Urgent band → high, caution band → medium. An endorsed PHQ-9 self-harm
/// item is high regardless of the total. Normal bands raise nothing.
pub fn flag_from_assessment(record: &AssessmentRecord, at: DateTime<Utc>) -> Option<RiskFlag> {
    let band = interpret(record);
    let crisis = has_crisis_indicator(&record.response);

    let severity = match (crisis, band.tier) {
        (true, _) | (false, SeverityTier::Urgent) => RiskLevel::High,
        (false, SeverityTier::Caution) => RiskLevel::Medium,
        (false, SeverityTier::Normal) => return None,
    };

    let mut note = format!(
        "{} score of {} indicates {} symptoms",
        record.instrument,
        record.score,
        band.label.as_str().to_lowercase()
    );
    if crisis {
        note.push_str("; thoughts of self-harm endorsed");
    }

    debug!(
        patient_id = %record.patient_id,
        instrument = %record.instrument,
        score = record.score,
        severity = %severity,
        "assessment raised risk flag"
    );
    Some(RiskFlag::raise(record.patient_id.clone(), severity, RiskSource::Assessment, note, at))
}

/// Raise a high-severity flag if the entry contains a warning phrase.
///
/// The note names the matched phrase only, never the entry content.
pub fn flag_from_journal(entry: &JournalEntry, at: DateTime<Utc>) -> Option<RiskFlag> {
    let phrase = find_warning_phrase(&entry.content)?;
    debug!(patient_id = %entry.owner, entry_id = %entry.id, "journal entry raised risk flag");
    Some(RiskFlag::raise(
        entry.owner.clone(),
        RiskLevel::High,
        RiskSource::Journal,
        format!("Journal entry contains crisis language (\"{phrase}\")"),
        at,
    ))
}

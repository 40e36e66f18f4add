//! Deterministic clinic data.
//!
//! All names and records are fictional. Ids are fixed so scenarios and tests
//! can refer to them directly; nothing here is random, and every timestamp
//! is relative to [`clinic_now`].

use chrono::{DateTime, Duration, TimeZone, Utc};

use sahaay_assessment::create_record;
use sahaay_contracts::{
    assessment::{AssessmentRecord, AssessmentResponse, Instrument},
    consent::ConsentSettings,
    error::SahaayResult,
    identity::{AssessmentId, EntryId, FlagId, PatientProfile, TherapistProfile, UserId},
    journal::{Emotion, JournalEntry, ShareScope},
    risk::{RiskFlag, RiskLevel, RiskSource},
};
use sahaay_core::{traits::RecordStore, InMemoryRecordStore};

pub const THERAPIST: &str = "therapist-1";
/// A therapist with an empty panel.
pub const OTHER_THERAPIST: &str = "therapist-2";
/// Shares everything.
pub const RIYA: &str = "patient-1";
/// Withholds journal text and nudges.
pub const ARJUN: &str = "patient-2";
/// Withholds assessments.
pub const PRIYA: &str = "patient-3";

pub const SAMPLE_CONTENTS: [&str; 10] = [
    "Had a good meeting at work today. Feeling more confident about the project.",
    "Couldn't sleep well last night. Mind racing with thoughts about deadlines.",
    "Spent time with family. Always makes me feel grounded and loved.",
    "Feeling overwhelmed with all the responsibilities lately.",
    "Had a peaceful morning walk. Nature really helps calm my mind.",
    "Argument with a friend left me feeling unsettled.",
    "Accomplished a task I'd been putting off. Small wins matter.",
    "Feeling grateful for the support system around me.",
    "Anxious about the upcoming presentation next week.",
    "Meditation session helped center my thoughts today.",
];

const TAGS: [&str; 4] = ["daily", "work", "family", "sleep"];

const ENTRY_EMOTIONS: [Emotion; 6] = [
    Emotion::Happy,
    Emotion::Sad,
    Emotion::Anxious,
    Emotion::Calm,
    Emotion::Angry,
    Emotion::Love,
];

/// The fixed "present" of the fixture clinic.
pub fn clinic_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 21, 12, 0, 0).single().unwrap_or_default()
}

fn date(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 9, 0, 0).single().unwrap_or_default()
}

pub fn therapists() -> Vec<TherapistProfile> {
    vec![
        TherapistProfile {
            id: UserId::new(THERAPIST),
            name: "Dr. Anita Mehta".to_string(),
            email: "dr.mehta@example.com".to_string(),
            license_id: Some("MH-PSY-2019-001".to_string()),
            clinic_name: Some("Serenity Mental Health Clinic".to_string()),
            patients: vec![UserId::new(RIYA), UserId::new(ARJUN), UserId::new(PRIYA)],
            created_at: Utc.with_ymd_and_hms(2023, 8, 1, 0, 0, 0).single().unwrap_or_default(),
        },
        TherapistProfile {
            id: UserId::new(OTHER_THERAPIST),
            name: "Dr. Kabir Rao".to_string(),
            email: "dr.rao@example.com".to_string(),
            license_id: Some("MH-PSY-2021-014".to_string()),
            clinic_name: Some("Serenity Mental Health Clinic".to_string()),
            patients: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).single().unwrap_or_default(),
        },
    ]
}

pub fn patients() -> Vec<PatientProfile> {
    let patient = |id: &str, name: &str, email: &str, joined: DateTime<Utc>, consent: ConsentSettings| {
        PatientProfile {
            id: UserId::new(id),
            name: name.to_string(),
            email: email.to_string(),
            connected_therapist: Some(UserId::new(THERAPIST)),
            consent,
            created_at: joined,
        }
    };

    let riya = ConsentSettings::all_shared(date(2, 1));
    let arjun = ConsentSettings { share_text: false, allow_nudges: false, ..ConsentSettings::all_shared(date(2, 5)) };
    let priya = ConsentSettings { share_assessments: false, ..ConsentSettings::all_shared(date(2, 10)) };

    vec![
        patient(RIYA, "Riya Sharma", "riya@example.com", date(1, 15), riya),
        patient(ARJUN, "Arjun Patel", "arjun@example.com", date(1, 20), arjun),
        patient(PRIYA, "Priya Singh", "priya@example.com", date(2, 1), priya),
    ]
}

/// `days` entries for `owner`, one per day counting back from
/// [`clinic_now`]. Every third entry is private and every fourth is shared
/// with summaries; the rest are shared plainly.
pub fn journal_entries(owner: &str, days: usize) -> Vec<JournalEntry> {
    (0..days)
        .map(|i| {
            let at = clinic_now() - Duration::days(i as i64) - Duration::hours((i % 5) as i64);
            let scope = match i {
                i if i % 3 == 2 => ShareScope::None,
                i if i % 4 == 3 => ShareScope::TherapistAi,
                _ => ShareScope::Therapist,
            };
            let mut entry = JournalEntry::new(
                UserId::new(owner),
                SAMPLE_CONTENTS[i % SAMPLE_CONTENTS.len()],
                ENTRY_EMOTIONS[(i * 5) % ENTRY_EMOTIONS.len()],
                at,
            )
            .with_scope(scope)
            .with_tags([TAGS[i % TAGS.len()]]);
            entry.id = EntryId::new(format!("entry-{owner}-{i}"));
            entry
        })
        .collect()
}

/// Riya's three historical assessments: PHQ-9 = 7 and GAD-7 = 8 on 15 Feb,
/// PHQ-9 = 10 on 1 Feb.
pub fn assessments() -> SahaayResult<Vec<AssessmentRecord>> {
    let riya = UserId::new(RIYA);
    let seeds: [(&str, Instrument, &[u8], DateTime<Utc>); 3] = [
        ("assessment-1", Instrument::Phq9, &[1, 2, 1, 1, 0, 1, 1, 0, 0], date(2, 15)),
        ("assessment-2", Instrument::Gad7, &[2, 2, 1, 1, 0, 1, 1], date(2, 15)),
        ("assessment-3", Instrument::Phq9, &[2, 1, 2, 2, 1, 1, 1, 0, 0], date(2, 1)),
    ];

    seeds
        .into_iter()
        .map(|(id, instrument, values, at)| {
            let response = AssessmentResponse::from_values(instrument, values)?;
            let mut record = create_record(riya.clone(), response, at)?;
            record.id = AssessmentId::new(id);
            Ok(record)
        })
        .collect()
}

/// One pending high flag for Arjun and one acknowledged medium flag for Riya.
pub fn risk_flags() -> SahaayResult<Vec<RiskFlag>> {
    let mut pending = RiskFlag::raise(
        UserId::new(ARJUN),
        RiskLevel::High,
        RiskSource::Assessment,
        "PHQ-9 score of 15 indicates moderately severe symptoms",
        date(2, 20),
    );
    pending.id = FlagId::new("risk-1");

    let mut reviewed = RiskFlag::raise(
        UserId::new(RIYA),
        RiskLevel::Medium,
        RiskSource::Journal,
        "Multiple entries expressing sleep disturbances and fatigue",
        date(2, 18),
    );
    reviewed.id = FlagId::new("risk-2");
    reviewed.acknowledge(&UserId::new(THERAPIST), date(2, 19))?;

    Ok(vec![pending, reviewed])
}

/// Load every fixture into `store`.
pub fn seed(store: &InMemoryRecordStore) -> SahaayResult<()> {
    for therapist in therapists() {
        store.insert_therapist(therapist)?;
    }
    for patient in patients() {
        store.insert_patient(patient)?;
    }
    for owner in [RIYA, ARJUN, PRIYA] {
        for entry in journal_entries(owner, 14) {
            store.insert_journal_entry(entry)?;
        }
    }
    for record in assessments()? {
        store.put_assessment(record)?;
    }
    for flag in risk_flags()? {
        store.put_risk_flag(flag)?;
    }
    Ok(())
}

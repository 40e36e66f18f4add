//! Consent visibility predicates.
//!
//! Pure functions of the patient's current consent settings (and, for
//! journal entries, the entry's own share scope). They never fail and never
//! cache: "no consent" and "no data" both come out as not visible.

use sahaay_contracts::{
    identity::PatientProfile,
    journal::{JournalEntry, ShareScope},
};

/// Mood data (emotion tags over time) is visible.
pub fn can_view_mood(patient: &PatientProfile) -> bool {
    patient.consent.share_mood
}

/// Assessment records are visible. All-or-nothing per patient: when false,
/// no record is returned at all, not even a redacted one.
pub fn can_view_assessments(patient: &PatientProfile) -> bool {
    patient.consent.share_assessments
}

/// A journal entry is visible only when the patient shares text globally AND
/// the entry itself is shared. Either one alone hides it.
pub fn can_view_journal_entry(patient: &PatientProfile, entry: &JournalEntry) -> bool {
    entry.owner == patient.id && patient.consent.share_text && entry.scope.is_shared()
}

/// A visible entry carries a generated summary. Presentation only: this
/// never grants visibility by itself.
pub fn includes_ai_summary(entry: &JournalEntry) -> bool {
    entry.scope == ShareScope::TherapistAi
}

/// The system may originate a reminder or check-in message to the patient.
pub fn can_receive_nudges(patient: &PatientProfile) -> bool {
    patient.consent.allow_nudges
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use sahaay_contracts::{
        consent::{ConsentField, ConsentSettings},
        identity::UserId,
        journal::Emotion,
    };

    use super::*;

    const SCOPES: [ShareScope; 3] = [ShareScope::None, ShareScope::Therapist, ShareScope::TherapistAi];

    fn patient(consent: ConsentSettings) -> PatientProfile {
        PatientProfile {
            id: UserId::new("patient-1"),
            name: "Riya Sharma".to_string(),
            email: "riya@example.com".to_string(),
            connected_therapist: Some(UserId::new("therapist-1")),
            consent,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        }
    }

    fn entry(scope: ShareScope) -> JournalEntry {
        let at = Utc.with_ymd_and_hms(2024, 2, 10, 8, 0, 0).unwrap();
        JournalEntry::new(UserId::new("patient-1"), "slept badly", Emotion::Anxious, at)
            .with_scope(scope)
    }

    fn at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn text_share_off_hides_every_scope() {
        let mut consent = ConsentSettings::all_shared(at());
        consent.set(ConsentField::ShareText, false, at());
        let p = patient(consent);
        for scope in SCOPES {
            assert!(!can_view_journal_entry(&p, &entry(scope)), "{scope:?} must be hidden");
        }
    }

    #[test]
    fn entry_visible_only_when_text_shared_and_scope_not_none() {
        for share_text in [false, true] {
            let mut consent = ConsentSettings::all_shared(at());
            consent.set(ConsentField::ShareText, share_text, at());
            let p = patient(consent);
            for scope in SCOPES {
                let expected = share_text && scope != ShareScope::None;
                assert_eq!(can_view_journal_entry(&p, &entry(scope)), expected, "{share_text} {scope:?}");
            }
        }
    }

    #[test]
    fn private_entry_hidden_even_with_text_shared() {
        let p = patient(ConsentSettings::all_shared(at()));
        assert!(!can_view_journal_entry(&p, &entry(ShareScope::None)));
    }

    #[test]
    fn entry_of_another_patient_is_never_visible_through_this_profile() {
        let p = patient(ConsentSettings::all_shared(at()));
        let mut other = entry(ShareScope::Therapist);
        other.owner = UserId::new("patient-2");
        assert!(!can_view_journal_entry(&p, &other));
    }

    #[test]
    fn summary_rides_only_on_therapist_ai_scope() {
        assert!(!includes_ai_summary(&entry(ShareScope::None)));
        assert!(!includes_ai_summary(&entry(ShareScope::Therapist)));
        assert!(includes_ai_summary(&entry(ShareScope::TherapistAi)));
    }

    #[test]
    fn flag_predicates_follow_their_consent_field() {
        let cases: [(ConsentField, fn(&PatientProfile) -> bool); 3] = [
            (ConsentField::ShareMood, can_view_mood),
            (ConsentField::ShareAssessments, can_view_assessments),
            (ConsentField::AllowNudges, can_receive_nudges),
        ];
        for (field, predicate) in cases {
            let mut consent = ConsentSettings::nothing_shared(at());
            assert!(!predicate(&patient(consent.clone())), "{field} off");
            consent.set(field, true, at());
            assert!(predicate(&patient(consent)), "{field} on");
        }
    }

    #[test]
    fn assessments_hidden_immediately_after_flag_flips() {
        let mut p = patient(ConsentSettings::all_shared(at()));
        assert!(can_view_assessments(&p));
        p.consent.set(ConsentField::ShareAssessments, false, at());
        assert!(!can_view_assessments(&p));
    }
}

//! Scenario 2: Therapist View
//!
//! Dr. Mehta opens each of her three patients. What she sees differs by
//! consent: Riya shares everything, Arjun withholds journal text, Priya
//! withholds assessments. Private entries never appear. Dr. Rao, who treats
//! none of them, gets an empty view and the attempt lands in the audit trail.

use sahaay_contracts::{
    assessment::Instrument,
    error::SahaayResult,
    identity::{UserId, Viewer},
    journal::JournalEntry,
};
use sahaay_core::PatientView;
use sahaay_insights::{assessment_trend, dominant_emotion, emotion_distribution, entries_within, top_themes};

use crate::{
    fixtures::{clinic_now, ARJUN, OTHER_THERAPIST, PRIYA, RIYA, THERAPIST},
    Clinic,
};

fn print_view(name: &str, view: &PatientView) {
    println!("  {} ({}):", name, view.patient_id);
    println!("    Mood points:          {}", view.mood.len());
    println!(
        "    Journal entries:      {} ({} with summary)",
        view.journal.len(),
        view.journal.iter().filter(|e| e.summary.is_some()).count()
    );
    println!("    Assessments:          {}", view.assessments.len());
    println!("    Risk flags:           {}", view.risk_flags.len());

    let entries: Vec<JournalEntry> = view.journal.iter().map(|e| e.entry.clone()).collect();
    if !entries.is_empty() {
        let recent = entries_within(&entries, clinic_now(), 7).len();
        println!("    Shared this week:     {}", recent);
        if let Some(emotion) = dominant_emotion(&entries) {
            println!("    Dominant emotion:     {}", emotion);
        }
        let shares: Vec<String> = emotion_distribution(&entries)
            .iter()
            .map(|s| format!("{} {}%", s.emotion, s.percent))
            .collect();
        println!("    Emotion mix:          {}", shares.join(", "));
        let themes: Vec<String> = top_themes(&entries, 3).into_iter().map(|t| format!("{} ×{}", t.word, t.count)).collect();
        println!("    Top themes:           {}", themes.join(", "));
    }

    let records: Vec<_> = view.assessments.iter().map(|a| a.record.clone()).collect();
    for instrument in Instrument::ALL {
        if let Some(trend) = assessment_trend(&records, instrument) {
            println!(
                "    {} trend:          {} → {} ({:+}, {:?})",
                instrument, trend.previous, trend.latest, trend.delta, trend.direction
            );
        }
    }
    for scored in &view.assessments {
        println!(
            "    {} on {}:    {} ({})",
            scored.record.instrument,
            scored.record.created_at.format("%Y-%m-%d"),
            scored.record.score,
            scored.band.label
        );
    }
}

pub fn run_scenario(policy_toml: &str) -> SahaayResult<()> {
    println!("=== Scenario 2: Therapist View ===");
    println!();

    let clinic = Clinic::open(policy_toml)?;
    let mehta = Viewer::therapist(THERAPIST);

    for (name, id) in [("Riya Sharma", RIYA), ("Arjun Patel", ARJUN), ("Priya Singh", PRIYA)] {
        let view = clinic.gateway.patient_view(&mehta, &UserId::new(id))?;
        print_view(name, &view);
        println!();
    }

    // ── Outside the care relationship ─────────────────────────────────────────

    let rao = Viewer::therapist(OTHER_THERAPIST);
    let view = clinic.gateway.patient_view(&rao, &UserId::new(RIYA))?;
    println!(
        "  Dr. Rao views Riya:     {}",
        if view.is_empty() { "empty view (no care relationship)" } else { "DATA RETURNED (unexpected)" }
    );
    let unknown = clinic.gateway.patient_view(&mehta, &UserId::new("patient-404"))?;
    println!(
        "  Unknown patient id:     {}",
        if unknown.is_empty() { "empty view" } else { "DATA RETURNED (unexpected)" }
    );

    println!("  Audit chain integrity:  {}", clinic.audit_line()?);
    println!();
    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use sahaay_contracts::{
        audit::{AuditAction, DataCategory},
        journal::ShareScope,
    };
    use sahaay_core::{traits::AuditWriter, Access};

    use super::*;
    use crate::CARE_TEAM_POLICY;

    fn view_as(clinic: &Clinic, viewer: &Viewer, patient: &str) -> PatientView {
        clinic.gateway.patient_view(viewer, &UserId::new(patient)).unwrap()
    }

    #[test]
    fn test_scenario_runs() {
        run_scenario(CARE_TEAM_POLICY).unwrap();
    }

    #[test]
    fn test_fully_shared_patient() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let view = view_as(&clinic, &Viewer::therapist(THERAPIST), RIYA);

        assert_eq!(view.access, Access::CareTeam);
        assert_eq!(view.mood.len(), 14);
        assert_eq!(view.journal.len(), 10);
        assert!(view.journal.iter().all(|e| e.entry.scope != ShareScope::None));
        assert_eq!(view.journal.iter().filter(|e| e.summary.is_some()).count(), 2);
        assert_eq!(view.assessments.len(), 3);
        assert_eq!(view.risk_flags.len(), 1);
    }

    #[test]
    fn test_withheld_text_hides_every_entry_but_not_mood() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let view = view_as(&clinic, &Viewer::therapist(THERAPIST), ARJUN);

        assert!(view.journal.is_empty());
        assert_eq!(view.mood.len(), 14);
        assert_eq!(view.risk_flags.len(), 1);
    }

    #[test]
    fn test_withheld_assessments_are_absent() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let view = view_as(&clinic, &Viewer::therapist(THERAPIST), PRIYA);

        assert!(view.assessments.is_empty());
        assert_eq!(view.journal.len(), 10);
        assert!(!view.shared_categories().contains(&DataCategory::Assessments));
    }

    #[test]
    fn test_riya_phq9_trend_improves() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let view = view_as(&clinic, &Viewer::therapist(THERAPIST), RIYA);
        let records: Vec<_> = view.assessments.iter().map(|a| a.record.clone()).collect();

        let trend = assessment_trend(&records, Instrument::Phq9).unwrap();
        assert_eq!((trend.previous, trend.latest, trend.delta), (10, 7, -3));
        assert!(assessment_trend(&records, Instrument::Gad7).is_none());
    }

    #[test]
    fn test_other_therapist_gets_empty_view_and_is_audited() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let view = view_as(&clinic, &Viewer::therapist(OTHER_THERAPIST), RIYA);
        assert!(view.is_empty());
        assert_eq!(view.access, Access::None);

        let records = clinic.audit.records_for(&UserId::new(RIYA)).unwrap();
        assert!(records.iter().any(|r| {
            r.actor == UserId::new(OTHER_THERAPIST) && matches!(r.action, AuditAction::AccessDenied { .. })
        }));
        assert!(clinic.audit.verify_integrity().unwrap());
    }

    #[test]
    fn test_patient_sees_own_private_entries() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let view = view_as(&clinic, &Viewer::patient(RIYA), RIYA);

        assert_eq!(view.access, Access::Owner);
        assert_eq!(view.journal.len(), 14);
        assert!(view.journal.iter().all(|e| e.summary.is_none()));
        assert!(view.risk_flags.is_empty());
    }
}

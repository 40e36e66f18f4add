//! Scenario 4: Risk Review
//!
//! Dr. Mehta works through her flag queue. Pending flags come first, highest
//! severity first. She acknowledges Arjun's high flag; a second
//! acknowledgment is rejected and the original reviewer stands. Priya then
//! writes a shared entry containing crisis language and a new flag appears
//! at the top of the queue, while the same words in a private entry raise
//! nothing.

use chrono::Utc;

use sahaay_contracts::{
    error::{SahaayError, SahaayResult},
    identity::{FlagId, UserId, Viewer},
    journal::{Emotion, JournalEntry, ShareScope},
    risk::{FlagStatus, RiskFlag, RiskLevel},
};
use sahaay_risk::TriageFilter;

use crate::{
    fixtures::{OTHER_THERAPIST, PRIYA, THERAPIST},
    Clinic,
};

fn print_queue(flags: &[RiskFlag]) {
    for flag in flags {
        println!(
            "    [{:<6}] {:<12} {:<9} {:?}  {}",
            flag.severity.to_string(),
            status_label(flag),
            flag.patient_id,
            flag.source,
            flag.note
        );
    }
}

fn status_label(flag: &RiskFlag) -> &'static str {
    match flag.status() {
        FlagStatus::Pending => "pending",
        FlagStatus::Acknowledged => "acknowledged",
    }
}

pub fn run_scenario(policy_toml: &str) -> SahaayResult<()> {
    println!("=== Scenario 4: Risk Review ===");
    println!();

    let clinic = Clinic::open(policy_toml)?;
    let mehta = Viewer::therapist(THERAPIST);

    let summary = clinic.gateway.risk_summary(&mehta)?;
    println!(
        "  Queue: {} flag(s), {} pending, {} high pending, {} patient(s)",
        summary.total, summary.pending, summary.high_pending, summary.patients_affected
    );
    print_queue(&clinic.gateway.risk_queue(&mehta, &TriageFilter::default())?);
    println!();

    let high = TriageFilter { severity: Some(RiskLevel::High), ..TriageFilter::default() };
    println!("  High severity only:");
    print_queue(&clinic.gateway.risk_queue(&mehta, &high)?);
    println!();

    // ── Acknowledge ───────────────────────────────────────────────────────────

    let risk_1 = FlagId::new("risk-1");
    let acknowledged = clinic.gateway.acknowledge_flag(&mehta, &risk_1)?;
    println!(
        "  risk-1 acknowledged by: {}",
        acknowledged.acknowledged_by.as_ref().map(|u| u.as_str()).unwrap_or("-")
    );
    match clinic.gateway.acknowledge_flag(&mehta, &risk_1) {
        Err(SahaayError::AlreadyAcknowledged { acknowledged_by, .. }) => {
            println!("  Second acknowledgment:  rejected, reviewer stays {} (expected)", acknowledged_by)
        }
        Err(e) => println!("  Second acknowledgment:  unexpected error: {}", e),
        Ok(_) => println!("  Second acknowledgment:  unexpectedly accepted"),
    }
    match clinic.gateway.acknowledge_flag(&Viewer::therapist(OTHER_THERAPIST), &FlagId::new("risk-2")) {
        Err(e) => println!("  Dr. Rao acknowledges:   rejected ({})", e),
        Ok(_) => println!("  Dr. Rao acknowledges:   unexpectedly accepted"),
    }
    println!();

    // ── Detection from journal text ───────────────────────────────────────────

    let priya = Viewer::patient(PRIYA);
    let private = JournalEntry::new(UserId::new(PRIYA), "Some days I feel like I can't go on.", Emotion::Sad, Utc::now());
    let (_, flag) = clinic.gateway.write_journal_entry(&priya, private)?;
    println!("  Private crisis entry:   {}", if flag.is_some() { "FLAGGED (unexpected)" } else { "no flag" });

    let shared = JournalEntry::new(
        UserId::new(PRIYA),
        "Everything feels heavy. Some nights I just want to end it all.",
        Emotion::Sad,
        Utc::now(),
    )
    .with_scope(ShareScope::Therapist);
    let (_, flag) = clinic.gateway.write_journal_entry(&priya, shared)?;
    match &flag {
        Some(flag) => println!("  Shared crisis entry:    {} flag raised ({})", flag.severity, flag.note),
        None => println!("  Shared crisis entry:    no flag (unexpected)"),
    }

    let manual = clinic.gateway.raise_manual_flag(
        &mehta,
        &UserId::new(PRIYA),
        RiskLevel::Low,
        "Missed two sessions; check in at next appointment",
    )?;
    println!("  Manual flag raised:     {} ({})", manual.id, manual.severity);
    println!();

    println!("  Queue after review:");
    print_queue(&clinic.gateway.risk_queue(&mehta, &TriageFilter::default())?);

    println!("  Audit chain integrity:  {}", clinic.audit_line()?);
    println!();
    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use sahaay_contracts::risk::RiskSource;
    use sahaay_core::traits::RecordStore;

    use super::*;
    use crate::{fixtures::RIYA, CARE_TEAM_POLICY};

    #[test]
    fn test_scenario_runs() {
        run_scenario(CARE_TEAM_POLICY).unwrap();
    }

    #[test]
    fn test_queue_orders_pending_first() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let queue = clinic.gateway.risk_queue(&Viewer::therapist(THERAPIST), &TriageFilter::default()).unwrap();
        let ids: Vec<&str> = queue.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["risk-1", "risk-2"]);

        let summary = clinic.gateway.risk_summary(&Viewer::therapist(THERAPIST)).unwrap();
        assert_eq!((summary.total, summary.pending, summary.high_pending), (2, 1, 1));
        assert_eq!(summary.patients_affected, 2);
    }

    #[test]
    fn test_second_acknowledgment_keeps_original_reviewer() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let mehta = Viewer::therapist(THERAPIST);
        let risk_1 = FlagId::new("risk-1");

        let first = clinic.gateway.acknowledge_flag(&mehta, &risk_1).unwrap();
        let at = first.acknowledged_at.unwrap();

        let second = clinic.gateway.acknowledge_flag(&mehta, &risk_1);
        assert!(matches!(second, Err(SahaayError::AlreadyAcknowledged { .. })));
        let stored = clinic.store.risk_flag(&risk_1).unwrap().unwrap();
        assert_eq!(stored.acknowledged_by, Some(UserId::new(THERAPIST)));
        assert_eq!(stored.acknowledged_at, Some(at));
    }

    #[test]
    fn test_outside_therapist_cannot_acknowledge() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let result = clinic.gateway.acknowledge_flag(&Viewer::therapist(OTHER_THERAPIST), &FlagId::new("risk-1"));
        assert!(matches!(result, Err(SahaayError::AccessDenied { .. })));
        assert!(clinic.store.risk_flag(&FlagId::new("risk-1")).unwrap().unwrap().is_pending());
    }

    #[test]
    fn test_patient_cannot_review_queue() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let result = clinic.gateway.risk_queue(&Viewer::patient(RIYA), &TriageFilter::default());
        assert!(matches!(result, Err(SahaayError::AccessDenied { .. })));
    }

    #[test]
    fn test_private_crisis_entry_raises_nothing_until_shared() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let priya = Viewer::patient(PRIYA);
        let entry = JournalEntry::new(UserId::new(PRIYA), "I want to end my life", Emotion::Sad, Utc::now());
        let entry_id = entry.id.clone();

        let (_, flag) = clinic.gateway.write_journal_entry(&priya, entry).unwrap();
        assert!(flag.is_none());

        let (_, flag) = clinic.gateway.set_entry_scope(&priya, &entry_id, ShareScope::Therapist).unwrap();
        let flag = flag.unwrap();
        assert_eq!(flag.severity, RiskLevel::High);
        assert_eq!(flag.source, RiskSource::Journal);

        let (_, again) = clinic.gateway.set_entry_scope(&priya, &entry_id, ShareScope::TherapistAi).unwrap();
        assert!(again.is_none());
    }

    #[test]
    fn test_manual_flag_requires_care_relationship() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let result = clinic.gateway.raise_manual_flag(
            &Viewer::therapist(OTHER_THERAPIST),
            &UserId::new(PRIYA),
            RiskLevel::Medium,
            "concern",
        );
        assert!(matches!(result, Err(SahaayError::AccessDenied { .. })));
        assert!(clinic.store.risk_flags(&UserId::new(PRIYA)).unwrap().is_empty());
    }
}

//! Scenario 1: Screening
//!
//! Riya completes a GAD-7 and a PHQ-9 through the gateway. The GAD-7 lands
//! in a normal band and raises nothing. The PHQ-9 is severe and endorses the
//! self-harm item, so a high flag reaches her therapist's queue. An
//! incomplete response is rejected with every missing question listed, and
//! an out-of-range answer cannot be constructed at all.

use sahaay_assessment::{bands, definition};
use sahaay_contracts::{
    assessment::{AssessmentResponse, Instrument},
    error::{SahaayError, SahaayResult},
    identity::Viewer,
};

use crate::{fixtures::RIYA, Clinic};

pub fn run_scenario(policy_toml: &str) -> SahaayResult<()> {
    println!("=== Scenario 1: Screening ===");
    println!();

    let clinic = Clinic::open(policy_toml)?;
    let riya = Viewer::patient(RIYA);

    for instrument in Instrument::ALL {
        let questionnaire = definition(instrument);
        println!("  {} ({} questions, max {})", instrument, questionnaire.len(), questionnaire.max_score());
        for band in bands(instrument) {
            println!("    {:>2}-{:<2} {:<18} {:?}", band.min, band.max, band.label.as_str(), band.tier);
        }
    }
    println!();

    // ── GAD-7: mild, no flag ──────────────────────────────────────────────────

    let gad7 = AssessmentResponse::from_values(Instrument::Gad7, &[2, 2, 1, 1, 0, 1, 1])?;
    let submitted = clinic.gateway.submit_assessment(&riya, gad7)?;
    println!("  GAD-7 submitted:        score {} → {} ({:?})", submitted.record.score, submitted.band.label, submitted.band.tier);
    println!("  Risk flag raised:       {}", if submitted.flag.is_some() { "YES" } else { "no" });

    // ── PHQ-9: severe with item 9 endorsed ────────────────────────────────────

    let phq9 = AssessmentResponse::from_values(Instrument::Phq9, &[3, 3, 3, 3, 2, 2, 2, 2, 2])?;
    let submitted = clinic.gateway.submit_assessment(&riya, phq9)?;
    println!("  PHQ-9 submitted:        score {} → {} ({:?})", submitted.record.score, submitted.band.label, submitted.band.tier);
    match &submitted.flag {
        Some(flag) => println!("  Risk flag raised:       {} ({})", flag.severity, flag.note),
        None => println!("  Risk flag raised:       no (unexpected)"),
    }

    // ── Incomplete response ───────────────────────────────────────────────────

    let partial = AssessmentResponse::from_pairs(Instrument::Phq9, [(0, 1), (1, 1), (2, 0), (4, 2)])?;
    match clinic.gateway.submit_assessment(&riya, partial) {
        Err(SahaayError::IncompleteResponse { missing, .. }) => {
            println!("  Incomplete PHQ-9:       rejected, missing {:?} (expected)", missing);
        }
        Err(e) => println!("  Incomplete PHQ-9:       unexpected error: {}", e),
        Ok(_) => println!("  Incomplete PHQ-9:       unexpectedly accepted"),
    }

    // ── Out-of-range answer ───────────────────────────────────────────────────

    let mut response = AssessmentResponse::new(Instrument::Gad7);
    match response.answer(0, 4) {
        Err(e) => println!("  Answer 4 for Q1:        rejected ({})", e),
        Ok(()) => println!("  Answer 4 for Q1:        unexpectedly accepted"),
    }

    println!("  Audit chain integrity:  {}", clinic.audit_line()?);
    println!();
    println!("  Scenario 1 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use sahaay_assessment::BandLabel;
    use sahaay_contracts::{identity::UserId, risk::RiskLevel};
    use sahaay_core::traits::RecordStore;
    use sahaay_risk::TriageFilter;

    use super::*;
    use crate::{fixtures::THERAPIST, CARE_TEAM_POLICY};

    #[test]
    fn test_scenario_runs() {
        run_scenario(CARE_TEAM_POLICY).unwrap();
    }

    #[test]
    fn test_crisis_phq9_reaches_therapist_queue() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let phq9 = AssessmentResponse::from_values(Instrument::Phq9, &[3, 3, 3, 3, 2, 2, 2, 2, 2]).unwrap();
        let submitted = clinic.gateway.submit_assessment(&Viewer::patient(RIYA), phq9).unwrap();
        assert_eq!(submitted.record.score, 22);
        assert_eq!(submitted.band.label, BandLabel::Severe);

        let flag = submitted.flag.unwrap();
        assert_eq!(flag.severity, RiskLevel::High);
        let queue = clinic.gateway.risk_queue(&Viewer::therapist(THERAPIST), &TriageFilter::default()).unwrap();
        assert_eq!(queue[0].id, flag.id);
    }

    #[test]
    fn test_incomplete_response_stores_nothing() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let before = clinic.store.assessments(&UserId::new(RIYA)).unwrap().len();
        let partial = AssessmentResponse::from_pairs(Instrument::Gad7, [(0, 1)]).unwrap();
        match clinic.gateway.submit_assessment(&Viewer::patient(RIYA), partial) {
            Err(SahaayError::IncompleteResponse { missing, .. }) => assert_eq!(missing, vec![1, 2, 3, 4, 5, 6]),
            other => panic!("expected IncompleteResponse, got {:?}", other.map(|s| s.record.score)),
        }
        assert_eq!(clinic.store.assessments(&UserId::new(RIYA)).unwrap().len(), before);
    }
}

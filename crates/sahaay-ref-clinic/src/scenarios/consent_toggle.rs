//! Scenario 3: Consent Toggle
//!
//! Riya turns off journal text sharing. Dr. Mehta's very next view carries
//! no entries while mood and assessments stay visible. Riya turns it back on
//! and the shared entries return. Riya then reads her own sharing history,
//! which lists every view and every consent change.

use sahaay_contracts::{
    audit::AuditAction,
    consent::ConsentField,
    error::SahaayResult,
    identity::{UserId, Viewer},
};

use crate::{
    fixtures::{RIYA, THERAPIST},
    Clinic,
};

pub fn run_scenario(policy_toml: &str) -> SahaayResult<()> {
    println!("=== Scenario 3: Consent Toggle ===");
    println!();

    let clinic = Clinic::open(policy_toml)?;
    let riya = Viewer::patient(RIYA);
    let riya_id = UserId::new(RIYA);
    let mehta = Viewer::therapist(THERAPIST);

    let before = clinic.gateway.patient_view(&mehta, &riya_id)?;
    println!("  Before:                 {} journal entries, {} mood points", before.journal.len(), before.mood.len());

    let settings = clinic.gateway.update_consent(&riya, ConsentField::ShareText, false)?;
    println!("  Riya sets share_text:   {}", settings.share_text);
    let hidden = clinic.gateway.patient_view(&mehta, &riya_id)?;
    println!("  With text withheld:     {} journal entries, {} mood points", hidden.journal.len(), hidden.mood.len());

    clinic.gateway.update_consent(&riya, ConsentField::ShareText, true)?;
    let after = clinic.gateway.patient_view(&mehta, &riya_id)?;
    println!("  Sharing restored:       {} journal entries", after.journal.len());

    // ── A therapist cannot change a patient's consent ─────────────────────────

    match clinic.gateway.update_consent(&mehta, ConsentField::ShareText, false) {
        Err(e) => println!("  Therapist edits consent: rejected ({})", e),
        Ok(_) => println!("  Therapist edits consent: unexpectedly accepted"),
    }

    // ── Sharing history ───────────────────────────────────────────────────────

    println!();
    println!("  Riya's sharing history:");
    for record in clinic.gateway.sharing_history(&riya, &riya_id)? {
        let line = match &record.action {
            AuditAction::ConsentChanged { field, value } => format!("consent {} set to {}", field, value),
            AuditAction::RecordViewed { shared, journal_entries, .. } => {
                format!("{} viewed {:?} ({} entries)", record.actor, shared, journal_entries)
            }
            AuditAction::AccessDenied { action, resource, .. } => {
                format!("{} denied {} {}", record.actor, action, resource)
            }
            other => format!("{:?}", other),
        };
        println!("    {}  {}", record.timestamp.format("%H:%M:%S"), line);
    }

    println!();
    println!("  Exported trail:         {} bytes of JSON", clinic.export_audit_json()?.len());
    println!("  Audit chain integrity:  {}", clinic.audit_line()?);
    println!();
    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

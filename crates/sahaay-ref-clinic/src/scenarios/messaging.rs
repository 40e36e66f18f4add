//! Scenario 5: Messaging and Nudges
//!
//! Riya and Dr. Mehta exchange direct messages in one thread. Dr. Mehta
//! nudges Riya, who allows reminders, and tries to nudge Arjun, who does
//! not: that attempt is refused and audited. A therapist outside the care
//! relationship cannot message Riya at all.

use sahaay_contracts::{
    error::{SahaayError, SahaayResult},
    identity::{UserId, Viewer},
    message::MessageKind,
};

use crate::{
    fixtures::{ARJUN, OTHER_THERAPIST, RIYA, THERAPIST},
    Clinic,
};

pub fn run_scenario(policy_toml: &str) -> SahaayResult<()> {
    println!("=== Scenario 5: Messaging and Nudges ===");
    println!();

    let clinic = Clinic::open(policy_toml)?;
    let riya = Viewer::patient(RIYA);
    let mehta = Viewer::therapist(THERAPIST);
    let riya_id = UserId::new(RIYA);
    let mehta_id = UserId::new(THERAPIST);

    clinic.gateway.send_message(&riya, &mehta_id, "Could we move Thursday's session to the afternoon?")?;
    let reply = clinic.gateway.send_message(&mehta, &riya_id, "Of course. 3pm works; see you then.")?;
    let nudge = clinic.gateway.send_nudge(&mehta, &riya_id, "Reminder: a quick mood check-in today?")?;

    println!("  Thread {}:", reply.thread_key);
    for message in clinic.gateway.thread(&riya, &mehta_id)? {
        let kind = match message.kind {
            MessageKind::Direct => "",
            MessageKind::Nudge => " [nudge]",
        };
        println!("    {} → {}{}: {}", message.from, message.to, kind, message.body);
    }

    let read = clinic.gateway.mark_read(&riya, &nudge.id)?;
    println!("  Riya reads the nudge:   read_at set = {}", read.read_at.is_some());
    match clinic.gateway.mark_read(&mehta, &nudge.id) {
        Err(e) => println!("  Sender marks it read:   rejected ({})", e),
        Ok(_) => println!("  Sender marks it read:   unexpectedly accepted"),
    }
    println!();

    // ── Consent and relationship checks ───────────────────────────────────────

    match clinic.gateway.send_nudge(&mehta, &UserId::new(ARJUN), "Checking in") {
        Err(SahaayError::NudgeNotPermitted { patient_id }) => {
            println!("  Nudge to {}:     refused, nudges not allowed (expected)", patient_id)
        }
        Err(e) => println!("  Nudge to Arjun:         unexpected error: {}", e),
        Ok(_) => println!("  Nudge to Arjun:         unexpectedly sent"),
    }
    match clinic.gateway.send_message(&Viewer::therapist(OTHER_THERAPIST), &riya_id, "Hello") {
        Err(e) => println!("  Dr. Rao messages Riya:  rejected ({})", e),
        Ok(_) => println!("  Dr. Rao messages Riya:  unexpectedly sent"),
    }
    match clinic.gateway.send_nudge(&riya, &mehta_id, "Nudge back") {
        Err(e) => println!("  Patient sends a nudge:  rejected ({})", e),
        Ok(_) => println!("  Patient sends a nudge:  unexpectedly sent"),
    }

    println!("  Audit chain integrity:  {}", clinic.audit_line()?);
    println!();
    println!("  Scenario 5 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use sahaay_contracts::audit::AuditAction;
    use sahaay_core::traits::AuditWriter;

    use super::*;
    use crate::CARE_TEAM_POLICY;

    #[test]
    fn test_scenario_runs() {
        run_scenario(CARE_TEAM_POLICY).unwrap();
    }

    #[test]
    fn test_both_directions_share_one_thread() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let riya = Viewer::patient(RIYA);
        let mehta = Viewer::therapist(THERAPIST);

        let first = clinic.gateway.send_message(&riya, &UserId::new(THERAPIST), "hi").unwrap();
        let second = clinic.gateway.send_message(&mehta, &UserId::new(RIYA), "hello").unwrap();
        assert_eq!(first.thread_key, second.thread_key);

        let from_riya = clinic.gateway.thread(&riya, &UserId::new(THERAPIST)).unwrap();
        let from_mehta = clinic.gateway.thread(&mehta, &UserId::new(RIYA)).unwrap();
        assert_eq!(from_riya.len(), 2);
        assert_eq!(from_riya, from_mehta);
    }

    #[test]
    fn test_nudge_blocked_without_consent_and_audited() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let arjun_id = UserId::new(ARJUN);

        let result = clinic.gateway.send_nudge(&Viewer::therapist(THERAPIST), &arjun_id, "Checking in");
        assert!(matches!(result, Err(SahaayError::NudgeNotPermitted { .. })));
        assert!(clinic.gateway.thread(&Viewer::patient(ARJUN), &UserId::new(THERAPIST)).unwrap().is_empty());

        let records = clinic.audit.records_for(&arjun_id).unwrap();
        assert!(records.iter().any(|r| matches!(
            &r.action,
            AuditAction::AccessDenied { resource, .. } if resource == "nudge"
        )));
    }

    #[test]
    fn test_nudge_delivered_with_consent() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let nudge = clinic
            .gateway
            .send_nudge(&Viewer::therapist(THERAPIST), &UserId::new(RIYA), "Time for a check-in")
            .unwrap();
        assert_eq!(nudge.kind, MessageKind::Nudge);
        assert!(nudge.read_at.is_none());
    }

    #[test]
    fn test_mark_read_is_recipient_only_and_sticks() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let riya = Viewer::patient(RIYA);
        let message = clinic
            .gateway
            .send_message(&Viewer::therapist(THERAPIST), &UserId::new(RIYA), "How was the week?")
            .unwrap();

        let first = clinic.gateway.mark_read(&riya, &message.id).unwrap();
        let second = clinic.gateway.mark_read(&riya, &message.id).unwrap();
        assert_eq!(first.read_at, second.read_at);

        let by_sender = clinic.gateway.mark_read(&Viewer::therapist(THERAPIST), &message.id);
        assert!(matches!(by_sender, Err(SahaayError::NotFound { .. })));
    }

    #[test]
    fn test_unconnected_pair_cannot_message() {
        let clinic = Clinic::open(CARE_TEAM_POLICY).unwrap();
        let result = clinic.gateway.send_message(&Viewer::therapist(OTHER_THERAPIST), &UserId::new(RIYA), "Hello");
        assert!(matches!(result, Err(SahaayError::AccessDenied { .. })));
    }
}

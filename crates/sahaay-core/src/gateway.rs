//! The care gateway: the one path through which patient data leaves the store.
//!
//! Every read and write follows the same order:
//!
//!   Policy → Relationship → Consent → Store → Audit
//!
//! The policy decides whether the viewer's role may perform the action at
//! all. The relationship check confines therapists to their own panel.
//! Consent predicates then filter what a care-team viewer receives. Nothing
//! a predicate rejects is ever placed in a returned value, and every decision
//! (including denials) is written to the audit trail before returning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sahaay_assessment::{create_record, interpret, SeverityBand};
use sahaay_contracts::{
    assessment::{AssessmentRecord, AssessmentResponse},
    audit::{AuditAction, AuditRecord, DataCategory},
    consent::{ConsentField, ConsentSettings},
    error::{SahaayError, SahaayResult},
    identity::{EntryId, FlagId, MessageId, PatientProfile, Role, UserId, Viewer},
    journal::{Emotion, JournalEntry, ShareScope},
    message::{thread_key, Message, MessageKind},
    policy::{PolicyContext, PolicyVerdict},
    risk::{RiskFlag, RiskLevel, RiskSource},
};
use sahaay_insights::summarize_entry;
use sahaay_risk::{flag_from_assessment, flag_from_journal, sort_for_review, summarize, TriageFilter, TriageSummary};

use crate::traits::{AuditWriter, RecordStore, ViewPolicy};
use crate::visibility::{
    can_receive_nudges, can_view_assessments, can_view_journal_entry, can_view_mood, includes_ai_summary,
};

// ── View types ────────────────────────────────────────────────────────────────

/// How the viewer relates to the patient whose data is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// The patient themselves: no consent filtering.
    Owner,
    /// A therapist with the patient on their panel: consent-filtered.
    CareTeam,
    /// No relationship. Receives an empty view.
    None,
}

/// One point on a mood chart. Carries no entry content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodPoint {
    pub emotion: Emotion,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedEntry {
    pub entry: JournalEntry,
    /// Present only for entries shared with `therapist_ai` scope.
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredAssessment {
    pub record: AssessmentRecord,
    pub band: SeverityBand,
}

/// Everything a viewer may see of one patient, already filtered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientView {
    pub patient_id: UserId,
    pub access: Access,
    pub mood: Vec<MoodPoint>,
    pub journal: Vec<SharedEntry>,
    pub assessments: Vec<ScoredAssessment>,
    pub risk_flags: Vec<RiskFlag>,
}

impl PatientView {
    fn empty(patient_id: &UserId, access: Access) -> Self {
        Self {
            patient_id: patient_id.clone(),
            access,
            mood: Vec::new(),
            journal: Vec::new(),
            assessments: Vec::new(),
            risk_flags: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mood.is_empty()
            && self.journal.is_empty()
            && self.assessments.is_empty()
            && self.risk_flags.is_empty()
    }

    /// Categories that carried data in this view.
    pub fn shared_categories(&self) -> Vec<DataCategory> {
        let mut shared = Vec::new();
        if !self.mood.is_empty() {
            shared.push(DataCategory::Mood);
        }
        if !self.journal.is_empty() {
            shared.push(DataCategory::Journal);
        }
        if !self.assessments.is_empty() {
            shared.push(DataCategory::Assessments);
        }
        if !self.risk_flags.is_empty() {
            shared.push(DataCategory::RiskFlags);
        }
        shared
    }
}

/// The outcome of submitting a completed questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAssessment {
    pub record: AssessmentRecord,
    pub band: SeverityBand,
    /// Raised only when the patient shares assessments with their therapist.
    pub flag: Option<RiskFlag>,
}

// ── Gateway ───────────────────────────────────────────────────────────────────

/// Wires the view policy, audit writer and record store together.
///
/// Construct one per process and share it by reference. The gateway holds no
/// mutable state of its own; all mutation goes through the store.
pub struct CareGateway {
    policy: Box<dyn ViewPolicy>,
    audit: Box<dyn AuditWriter>,
    store: Box<dyn RecordStore>,
}

impl CareGateway {
    pub fn new(
        policy: Box<dyn ViewPolicy>,
        audit: Box<dyn AuditWriter>,
        store: Box<dyn RecordStore>,
    ) -> Self {
        Self { policy, audit, store }
    }

    // ── Policy and relationship ───────────────────────────────────────────────

    /// Ask the view policy whether `viewer` may perform `action` on `resource`.
    pub fn authorize(&self, viewer: &Viewer, action: &str, resource: &str) -> SahaayResult<PolicyVerdict> {
        let capabilities = self.policy.capabilities_for(viewer.role);
        let ctx = PolicyContext {
            viewer_id: viewer.user_id.to_string(),
            role: viewer.role.as_str().to_string(),
            action: action.to_string(),
            resource: resource.to_string(),
            capabilities: capabilities.all().map(|c| c.0.clone()).collect(),
        };
        self.policy.evaluate(&ctx)
    }

    /// Authorize or fail with `AccessDenied`, auditing the denial against
    /// `subject`.
    fn require(&self, viewer: &Viewer, subject: &UserId, action: &str, resource: &str) -> SahaayResult<()> {
        match self.authorize(viewer, action, resource)? {
            PolicyVerdict::Allow => Ok(()),
            PolicyVerdict::Deny { reason } => self.deny(viewer, subject, action, resource, reason),
        }
    }

    /// Audit a denial and return it as an error.
    fn deny<T>(
        &self,
        viewer: &Viewer,
        subject: &UserId,
        action: &str,
        resource: &str,
        reason: String,
    ) -> SahaayResult<T> {
        warn!(
            viewer = %viewer.user_id,
            patient_id = %subject,
            action,
            resource,
            reason = %reason,
            "access denied"
        );
        self.audit.write(&AuditRecord::new(
            &viewer.user_id,
            subject,
            AuditAction::AccessDenied {
                action: action.to_string(),
                resource: resource.to_string(),
                reason: reason.clone(),
            },
        ))?;
        Err(SahaayError::AccessDenied { reason })
    }

    /// How `viewer` relates to `patient`. Admins have no data relationship.
    pub fn relationship(&self, viewer: &Viewer, patient: &PatientProfile) -> SahaayResult<Access> {
        let access = match viewer.role {
            Role::Patient if viewer.user_id == patient.id => Access::Owner,
            Role::Therapist => match self.store.therapist(&viewer.user_id)? {
                Some(therapist) if therapist.treats(&patient.id) => Access::CareTeam,
                _ => Access::None,
            },
            _ => Access::None,
        };
        Ok(access)
    }

    fn load_patient(&self, patient_id: &UserId) -> SahaayResult<PatientProfile> {
        self.store.patient(patient_id)?.ok_or_else(|| SahaayError::NotFound {
            kind: "patient",
            id: patient_id.to_string(),
        })
    }

    /// Load the patient and confirm `viewer` is on their care team.
    fn require_care_team(
        &self,
        viewer: &Viewer,
        patient_id: &UserId,
        action: &str,
        resource: &str,
    ) -> SahaayResult<PatientProfile> {
        let patient = self.load_patient(patient_id)?;
        if self.relationship(viewer, &patient)? != Access::CareTeam {
            return self.deny(viewer, patient_id, action, resource, "patient is not on this therapist's panel".to_string());
        }
        Ok(patient)
    }

    /// The caller must be acting as `owner`.
    fn require_owner(&self, viewer: &Viewer, owner: &UserId, action: &str, resource: &str) -> SahaayResult<()> {
        if viewer.role != Role::Patient || &viewer.user_id != owner {
            return self.deny(viewer, owner, action, resource, "only the patient may do this".to_string());
        }
        Ok(())
    }

    fn allowed(&self, viewer: &Viewer, subject: &UserId, category: DataCategory) -> SahaayResult<bool> {
        match self.authorize(viewer, "view", category.resource())? {
            PolicyVerdict::Allow => Ok(true),
            PolicyVerdict::Deny { reason } => {
                debug!(viewer = %viewer.user_id, resource = category.resource(), "category withheld by policy");
                self.audit.write(&AuditRecord::new(
                    &viewer.user_id,
                    subject,
                    AuditAction::AccessDenied {
                        action: "view".to_string(),
                        resource: category.resource().to_string(),
                        reason,
                    },
                ))?;
                Ok(false)
            }
        }
    }

    // ── Viewing ───────────────────────────────────────────────────────────────

    /// Assemble the view of `patient_id` that `viewer` is entitled to.
    ///
    /// A patient viewing themselves sees everything the policy allows. A
    /// therapist sees only their own patients, filtered by consent. Anyone
    /// else, including for an unknown patient id, gets an empty view: denial
    /// and absence look the same from outside.
    pub fn patient_view(&self, viewer: &Viewer, patient_id: &UserId) -> SahaayResult<PatientView> {
        let Some(patient) = self.store.patient(patient_id)? else {
            self.record_denied_view(viewer, patient_id, "unknown patient")?;
            return Ok(PatientView::empty(patient_id, Access::None));
        };

        let access = self.relationship(viewer, &patient)?;
        if access == Access::None {
            self.record_denied_view(viewer, patient_id, "no care relationship")?;
            return Ok(PatientView::empty(patient_id, Access::None));
        }

        let owner = access == Access::Owner;
        let mut view = PatientView::empty(patient_id, access);

        if self.allowed(viewer, patient_id, DataCategory::Journal)? {
            view.journal = self
                .store
                .journal_entries(patient_id)?
                .into_iter()
                .filter(|e| owner || can_view_journal_entry(&patient, e))
                .map(|entry| {
                    let summary = (!owner && includes_ai_summary(&entry)).then(|| summarize_entry(&entry));
                    SharedEntry { entry, summary }
                })
                .collect();
        }

        if self.allowed(viewer, patient_id, DataCategory::Mood)? && (owner || can_view_mood(&patient)) {
            view.mood = self
                .store
                .journal_entries(patient_id)?
                .into_iter()
                .map(|e| MoodPoint { emotion: e.emotion, recorded_at: e.created_at })
                .collect();
        }

        if self.allowed(viewer, patient_id, DataCategory::Assessments)?
            && (owner || can_view_assessments(&patient))
        {
            view.assessments = self
                .store
                .assessments(patient_id)?
                .into_iter()
                .map(|record| ScoredAssessment { band: interpret(&record), record })
                .collect();
        }

        // Flags are reviewer-facing; the patient's own view never carries them.
        if !owner && self.allowed(viewer, patient_id, DataCategory::RiskFlags)? {
            view.risk_flags = self.consented_flags(&patient)?;
        }

        info!(
            viewer = %viewer.user_id,
            patient_id = %patient_id,
            access = ?access,
            journal = view.journal.len(),
            assessments = view.assessments.len(),
            "patient view served"
        );
        self.audit.write(&AuditRecord::new(
            &viewer.user_id,
            patient_id,
            AuditAction::RecordViewed {
                shared: view.shared_categories(),
                journal_entries: view.journal.len(),
                assessments: view.assessments.len(),
            },
        ))?;
        Ok(view)
    }

    fn record_denied_view(&self, viewer: &Viewer, patient_id: &UserId, reason: &str) -> SahaayResult<()> {
        warn!(viewer = %viewer.user_id, patient_id = %patient_id, reason, "patient view denied");
        self.audit.write(&AuditRecord::new(
            &viewer.user_id,
            patient_id,
            AuditAction::AccessDenied {
                action: "view".to_string(),
                resource: "record".to_string(),
                reason: reason.to_string(),
            },
        ))
    }

    /// The audit trail of everything that happened to the viewer's own data.
    pub fn sharing_history(&self, viewer: &Viewer, patient_id: &UserId) -> SahaayResult<Vec<AuditRecord>> {
        self.require_owner(viewer, patient_id, "view", "audit")?;
        self.audit.records_for(patient_id)
    }

    // ── Consent ───────────────────────────────────────────────────────────────

    /// Set one of the viewer's own consent flags. Effective for the very next
    /// view.
    pub fn update_consent(&self, viewer: &Viewer, field: ConsentField, value: bool) -> SahaayResult<ConsentSettings> {
        let patient_id = &viewer.user_id;
        self.require_owner(viewer, patient_id, "update", "consent")?;
        self.require(viewer, patient_id, "update", "consent")?;

        let settings = self.store.update_consent(patient_id, field, value, Utc::now())?;
        info!(patient_id = %patient_id, field = %field, value, "consent changed");
        self.audit.write(&AuditRecord::new(
            patient_id,
            patient_id,
            AuditAction::ConsentChanged { field, value },
        ))?;
        Ok(settings)
    }

    // ── Journal ───────────────────────────────────────────────────────────────

    /// Store a new entry written by its owner. If the entry is visible to the
    /// care team and contains crisis language, a flag is raised with it.
    pub fn write_journal_entry(
        &self,
        viewer: &Viewer,
        entry: JournalEntry,
    ) -> SahaayResult<(JournalEntry, Option<RiskFlag>)> {
        self.require_owner(viewer, &entry.owner, "write", "journal")?;
        self.require(viewer, &entry.owner, "write", "journal")?;
        let patient = self.load_patient(&entry.owner)?;

        self.store.insert_journal_entry(entry.clone()).inspect_err(|e| {
            warn!(viewer = %viewer.user_id, entry_id = %entry.id, error = %e, "journal write rejected");
        })?;
        debug!(patient_id = %entry.owner, entry_id = %entry.id, scope = ?entry.scope, "journal entry stored");
        self.audit.write(&AuditRecord::new(
            &entry.owner,
            &entry.owner,
            AuditAction::JournalEntryWritten { entry_id: entry.id.to_string(), scope: entry.scope },
        ))?;

        let flag = if can_view_journal_entry(&patient, &entry) {
            self.raise_detected(flag_from_journal(&entry, entry.created_at))?
        } else {
            None
        };
        Ok((entry, flag))
    }

    /// Change the share scope of one of the viewer's entries. An entry that
    /// becomes visible is checked for crisis language at that point.
    pub fn set_entry_scope(
        &self,
        viewer: &Viewer,
        entry_id: &EntryId,
        scope: ShareScope,
    ) -> SahaayResult<(JournalEntry, Option<RiskFlag>)> {
        let before = self.store.journal_entry(entry_id)?.ok_or_else(|| SahaayError::NotFound {
            kind: "journal entry",
            id: entry_id.to_string(),
        })?;
        self.require_owner(viewer, &before.owner, "write", "journal")?;
        self.require(viewer, &before.owner, "write", "journal")?;
        let patient = self.load_patient(&before.owner)?;

        let now = Utc::now();
        let entry = self.store.rescope_journal_entry(entry_id, scope, now)?;
        self.audit.write(&AuditRecord::new(
            &entry.owner,
            &entry.owner,
            AuditAction::JournalEntryWritten { entry_id: entry.id.to_string(), scope },
        ))?;

        let newly_visible = !can_view_journal_entry(&patient, &before) && can_view_journal_entry(&patient, &entry);
        let flag = if newly_visible { self.raise_detected(flag_from_journal(&entry, now))? } else { None };
        Ok((entry, flag))
    }

    /// Delete one of the viewer's entries. Returns false if it was already gone.
    pub fn delete_journal_entry(&self, viewer: &Viewer, entry_id: &EntryId) -> SahaayResult<bool> {
        let Some(entry) = self.store.journal_entry(entry_id)? else {
            return Ok(false);
        };
        self.require_owner(viewer, &entry.owner, "delete", "journal")?;
        self.require(viewer, &entry.owner, "delete", "journal")?;

        let removed = self.store.delete_journal_entry(entry_id)?;
        if removed {
            self.audit.write(&AuditRecord::new(
                &entry.owner,
                &entry.owner,
                AuditAction::JournalEntryDeleted { entry_id: entry_id.to_string() },
            ))?;
        }
        Ok(removed)
    }

    // ── Assessments ───────────────────────────────────────────────────────────

    /// Score, classify and store the viewer's completed questionnaire.
    ///
    /// An incomplete or malformed response is rejected before anything is
    /// stored.
    pub fn submit_assessment(&self, viewer: &Viewer, response: AssessmentResponse) -> SahaayResult<SubmittedAssessment> {
        let patient_id = &viewer.user_id;
        self.require_owner(viewer, patient_id, "submit", "assessment")?;
        self.require(viewer, patient_id, "submit", "assessment")?;
        let patient = self.load_patient(patient_id)?;

        let record = create_record(patient_id.clone(), response, Utc::now())?;
        let band = interpret(&record);
        self.store.put_assessment(record.clone())?;
        info!(
            patient_id = %patient_id,
            instrument = %record.instrument,
            score = record.score,
            band = %band.label,
            "assessment submitted"
        );
        self.audit.write(&AuditRecord::new(
            patient_id,
            patient_id,
            AuditAction::AssessmentSubmitted { instrument: record.instrument, score: record.score },
        ))?;

        let flag = if can_view_assessments(&patient) {
            self.raise_detected(flag_from_assessment(&record, record.created_at))?
        } else {
            None
        };
        Ok(SubmittedAssessment { record, band, flag })
    }

    // ── Risk flags ────────────────────────────────────────────────────────────

    fn raise_detected(&self, flag: Option<RiskFlag>) -> SahaayResult<Option<RiskFlag>> {
        let Some(flag) = flag else {
            return Ok(None);
        };
        self.store.put_risk_flag(flag.clone())?;
        warn!(
            patient_id = %flag.patient_id,
            flag_id = %flag.id,
            severity = %flag.severity,
            "risk flag raised"
        );
        self.audit.write(&AuditRecord::new(
            &flag.patient_id,
            &flag.patient_id,
            AuditAction::FlagRaised { flag_id: flag.id.to_string() },
        ))?;
        Ok(Some(flag))
    }

    /// The patient's flags a care-team reviewer may see. An assessment flag's
    /// note carries the score and band, so it is withheld while assessment
    /// sharing is off.
    fn consented_flags(&self, patient: &PatientProfile) -> SahaayResult<Vec<RiskFlag>> {
        let share_assessments = can_view_assessments(patient);
        Ok(self
            .store
            .risk_flags(&patient.id)?
            .into_iter()
            .filter(|f| share_assessments || f.source != RiskSource::Assessment)
            .collect())
    }

    /// Flags across the therapist's panel matching `filter`, in review order.
    pub fn risk_queue(&self, viewer: &Viewer, filter: &TriageFilter) -> SahaayResult<Vec<RiskFlag>> {
        self.require(viewer, &viewer.user_id, "review", "risk-flags")?;
        let Some(therapist) = self.store.therapist(&viewer.user_id)? else {
            return Ok(Vec::new());
        };

        let mut flags = Vec::new();
        for patient_id in &therapist.patients {
            let Some(patient) = self.store.patient(patient_id)? else {
                continue;
            };
            flags.extend(self.consented_flags(&patient)?.into_iter().filter(|f| filter.matches(f)));
        }
        sort_for_review(&mut flags);
        debug!(viewer = %viewer.user_id, flags = flags.len(), "risk queue served");
        Ok(flags)
    }

    /// Headline counts over the viewer's whole queue.
    pub fn risk_summary(&self, viewer: &Viewer) -> SahaayResult<TriageSummary> {
        let flags = self.risk_queue(viewer, &TriageFilter::default())?;
        Ok(summarize(&flags, Utc::now()))
    }

    /// A therapist raises a flag by hand for one of their patients.
    pub fn raise_manual_flag(
        &self,
        viewer: &Viewer,
        patient_id: &UserId,
        severity: RiskLevel,
        note: &str,
    ) -> SahaayResult<RiskFlag> {
        self.require(viewer, patient_id, "raise", "risk-flags")?;
        self.require_care_team(viewer, patient_id, "raise", "risk-flags")?;

        let flag = RiskFlag::raise(patient_id.clone(), severity, RiskSource::Manual, note, Utc::now());
        self.store.put_risk_flag(flag.clone())?;
        info!(viewer = %viewer.user_id, patient_id = %patient_id, flag_id = %flag.id, "manual risk flag raised");
        self.audit.write(&AuditRecord::new(
            &viewer.user_id,
            patient_id,
            AuditAction::FlagRaised { flag_id: flag.id.to_string() },
        ))?;
        Ok(flag)
    }

    /// Acknowledge a pending flag. A flag that is already acknowledged is
    /// rejected and keeps its original reviewer.
    pub fn acknowledge_flag(&self, viewer: &Viewer, flag_id: &FlagId) -> SahaayResult<RiskFlag> {
        let flag = self.store.risk_flag(flag_id)?.ok_or_else(|| SahaayError::NotFound {
            kind: "risk flag",
            id: flag_id.to_string(),
        })?;
        self.require(viewer, &flag.patient_id, "acknowledge", "risk-flags")?;
        let patient = self.require_care_team(viewer, &flag.patient_id, "acknowledge", "risk-flags")?;
        // A withheld flag is indistinguishable from a missing one.
        if flag.source == RiskSource::Assessment && !can_view_assessments(&patient) {
            return Err(SahaayError::NotFound { kind: "risk flag", id: flag_id.to_string() });
        }

        let acknowledged = self.store.acknowledge_flag(flag_id, &viewer.user_id, Utc::now())?;
        self.audit.write(&AuditRecord::new(
            &viewer.user_id,
            &acknowledged.patient_id,
            AuditAction::FlagAcknowledged { flag_id: flag_id.to_string() },
        ))?;
        Ok(acknowledged)
    }

    // ── Messaging ─────────────────────────────────────────────────────────────

    /// The patient in a patient/therapist pair, if the pair is connected.
    fn care_pair_patient(&self, viewer: &Viewer, other: &UserId) -> SahaayResult<Option<UserId>> {
        let (patient_id, therapist_id) = match viewer.role {
            Role::Patient => (&viewer.user_id, other),
            Role::Therapist => (other, &viewer.user_id),
            Role::Admin => return Ok(None),
        };
        let connected = self
            .store
            .therapist(therapist_id)?
            .is_some_and(|t| t.treats(patient_id));
        Ok(connected.then(|| patient_id.clone()))
    }

    /// Send a direct message between a patient and their therapist.
    pub fn send_message(&self, viewer: &Viewer, to: &UserId, body: &str) -> SahaayResult<Message> {
        let Some(patient_id) = self.care_pair_patient(viewer, to)? else {
            return self.deny(viewer, to, "send", "message", "sender and recipient are not connected".to_string());
        };
        self.require(viewer, &patient_id, "send", "message")?;

        let message = Message::new(viewer.user_id.clone(), to.clone(), body, MessageKind::Direct, Utc::now());
        self.store.put_message(message.clone())?;
        debug!(from = %viewer.user_id, to = %to, message_id = %message.id, "message sent");
        self.audit.write(&AuditRecord::new(
            &viewer.user_id,
            &patient_id,
            AuditAction::MessageSent { message_id: message.id.to_string() },
        ))?;
        Ok(message)
    }

    /// Send a therapist-originated reminder. Requires the nudge capability,
    /// a care relationship, and the patient's nudge consent.
    pub fn send_nudge(&self, viewer: &Viewer, patient_id: &UserId, body: &str) -> SahaayResult<Message> {
        self.require(viewer, patient_id, "send", "nudge")?;
        let patient = self.require_care_team(viewer, patient_id, "send", "nudge")?;

        if !can_receive_nudges(&patient) {
            warn!(viewer = %viewer.user_id, patient_id = %patient_id, "nudge blocked by consent");
            self.audit.write(&AuditRecord::new(
                &viewer.user_id,
                patient_id,
                AuditAction::AccessDenied {
                    action: "send".to_string(),
                    resource: "nudge".to_string(),
                    reason: "patient does not accept nudges".to_string(),
                },
            ))?;
            return Err(SahaayError::NudgeNotPermitted { patient_id: patient_id.to_string() });
        }

        let message = Message::new(viewer.user_id.clone(), patient_id.clone(), body, MessageKind::Nudge, Utc::now());
        self.store.put_message(message.clone())?;
        info!(viewer = %viewer.user_id, patient_id = %patient_id, message_id = %message.id, "nudge sent");
        self.audit.write(&AuditRecord::new(
            &viewer.user_id,
            patient_id,
            AuditAction::NudgeSent { message_id: message.id.to_string() },
        ))?;
        Ok(message)
    }

    /// The conversation between the viewer and `other`, oldest first.
    pub fn thread(&self, viewer: &Viewer, other: &UserId) -> SahaayResult<Vec<Message>> {
        self.store.thread(&thread_key(&viewer.user_id, other))
    }

    /// Mark a message addressed to the viewer as read.
    pub fn mark_read(&self, viewer: &Viewer, message_id: &MessageId) -> SahaayResult<Message> {
        self.store.mark_read(message_id, &viewer.user_id, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;

    use sahaay_assessment::{BandLabel, SeverityTier};
    use sahaay_contracts::{
        assessment::Instrument,
        capability::CapabilitySet,
        identity::TherapistProfile,
        risk::FlagStatus,
    };

    use crate::store::InMemoryRecordStore;

    use super::*;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// Allows everything except the listed (role, action, resource) triples.
    struct MockPolicy {
        denied: Vec<(&'static str, &'static str, &'static str)>,
    }

    impl ViewPolicy for MockPolicy {
        fn evaluate(&self, ctx: &PolicyContext) -> SahaayResult<PolicyVerdict> {
            let denied = self
                .denied
                .iter()
                .any(|(role, action, resource)| *role == ctx.role && *action == ctx.action && *resource == ctx.resource);
            if denied {
                Ok(PolicyVerdict::Deny { reason: format!("{} may not {} {}", ctx.role, ctx.action, ctx.resource) })
            } else {
                Ok(PolicyVerdict::Allow)
            }
        }

        fn capabilities_for(&self, _role: Role) -> CapabilitySet {
            CapabilitySet::default()
        }
    }

    /// An audit writer that keeps every record for inspection.
    struct MockAudit {
        records: Arc<Mutex<Vec<AuditRecord>>>,
    }

    impl AuditWriter for MockAudit {
        fn write(&self, record: &AuditRecord) -> SahaayResult<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn records_for(&self, subject: &UserId) -> SahaayResult<Vec<AuditRecord>> {
            Ok(self.records.lock().unwrap().iter().filter(|r| &r.subject == subject).cloned().collect())
        }
    }

    struct Harness {
        gateway: CareGateway,
        store: Arc<InMemoryRecordStore>,
        audit: Arc<Mutex<Vec<AuditRecord>>>,
    }

    impl Harness {
        fn audited(&self) -> Vec<AuditAction> {
            self.audit.lock().unwrap().iter().map(|r| r.action.clone()).collect()
        }

        fn denials(&self) -> usize {
            self.audited().iter().filter(|a| matches!(a, AuditAction::AccessDenied { .. })).count()
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, day, 9, 0, 0).unwrap()
    }

    fn patient(id: &str, consent: ConsentSettings) -> PatientProfile {
        PatientProfile {
            id: UserId::new(id),
            name: id.to_string(),
            email: format!("{id}@example.com"),
            connected_therapist: Some(UserId::new("therapist-1")),
            consent,
            created_at: at(1),
        }
    }

    fn therapist(id: &str, patients: &[&str]) -> TherapistProfile {
        TherapistProfile {
            id: UserId::new(id),
            name: id.to_string(),
            email: format!("{id}@example.com"),
            license_id: None,
            clinic_name: None,
            patients: patients.iter().map(|p| UserId::new(*p)).collect(),
            created_at: at(1),
        }
    }

    /// patient-1 shares everything, patient-2 withholds text and nudges,
    /// patient-3 withholds assessments. therapist-1 treats all three;
    /// therapist-2 treats nobody.
    fn harness(denied: Vec<(&'static str, &'static str, &'static str)>) -> Harness {
        let store = Arc::new(InMemoryRecordStore::new());
        let all = ConsentSettings::all_shared(at(1));
        let mut no_text = all.clone();
        no_text.set(ConsentField::ShareText, false, at(1));
        no_text.set(ConsentField::AllowNudges, false, at(1));
        let mut no_assessments = all.clone();
        no_assessments.set(ConsentField::ShareAssessments, false, at(1));

        store.insert_patient(patient("patient-1", all)).unwrap();
        store.insert_patient(patient("patient-2", no_text)).unwrap();
        store.insert_patient(patient("patient-3", no_assessments)).unwrap();
        store.insert_therapist(therapist("therapist-1", &["patient-1", "patient-2", "patient-3"])).unwrap();
        store.insert_therapist(therapist("therapist-2", &[])).unwrap();

        let audit = Arc::new(Mutex::new(Vec::new()));
        let gateway = CareGateway::new(
            Box::new(MockPolicy { denied }),
            Box::new(MockAudit { records: Arc::clone(&audit) }),
            Box::new(Arc::clone(&store)),
        );
        Harness { gateway, store, audit }
    }

    fn seed_entry(h: &Harness, owner: &str, content: &str, scope: ShareScope, day: u32) -> JournalEntry {
        let entry = JournalEntry::new(UserId::new(owner), content, Emotion::Anxious, at(day)).with_scope(scope);
        h.store.insert_journal_entry(entry.clone()).unwrap();
        entry
    }

    fn seed_assessment(h: &Harness, owner: &str, values: &[u8], day: u32) {
        let response = AssessmentResponse::from_values(Instrument::Phq9, values).unwrap();
        h.store.put_assessment(create_record(UserId::new(owner), response, at(day)).unwrap()).unwrap();
    }

    fn t1() -> Viewer {
        Viewer::therapist("therapist-1")
    }

    // ── Patient view ─────────────────────────────────────────────────────────

    #[test]
    fn therapist_sees_only_consented_and_shared_entries() {
        let h = harness(vec![]);
        seed_entry(&h, "patient-1", "private thoughts", ShareScope::None, 2);
        seed_entry(&h, "patient-1", "Shared with you. More detail.", ShareScope::Therapist, 3);
        seed_entry(&h, "patient-1", "Summarize me. Then the rest.", ShareScope::TherapistAi, 4);

        let view = h.gateway.patient_view(&t1(), &UserId::new("patient-1")).unwrap();
        assert_eq!(view.access, Access::CareTeam);
        assert_eq!(view.journal.len(), 2);
        assert_eq!(view.journal[0].summary.as_deref(), Some("Summarize me."));
        assert_eq!(view.journal[1].summary, None);
        assert!(view.journal.iter().all(|s| s.entry.scope != ShareScope::None));
        // Mood covers every entry but carries no content.
        assert_eq!(view.mood.len(), 3);
    }

    #[test]
    fn text_consent_off_hides_every_entry_even_therapist_ai() {
        let h = harness(vec![]);
        seed_entry(&h, "patient-2", "a", ShareScope::Therapist, 2);
        seed_entry(&h, "patient-2", "b", ShareScope::TherapistAi, 3);

        let view = h.gateway.patient_view(&t1(), &UserId::new("patient-2")).unwrap();
        assert!(view.journal.is_empty());
        assert_eq!(view.mood.len(), 2);
    }

    #[test]
    fn assessments_consent_off_returns_no_records_at_all() {
        let h = harness(vec![]);
        seed_assessment(&h, "patient-3", &[1, 2, 1, 1, 0, 1, 1, 0, 0], 2);

        let view = h.gateway.patient_view(&t1(), &UserId::new("patient-3")).unwrap();
        assert!(view.assessments.is_empty());

        let own = h.gateway.patient_view(&Viewer::patient("patient-3"), &UserId::new("patient-3")).unwrap();
        assert_eq!(own.access, Access::Owner);
        assert_eq!(own.assessments.len(), 1);
        assert_eq!(own.assessments[0].band.label, BandLabel::Mild);
    }

    #[test]
    fn consent_change_applies_to_next_view_and_is_audited() {
        let h = harness(vec![]);
        seed_assessment(&h, "patient-1", &[2, 1, 2, 2, 1, 1, 1, 0, 0], 2);
        let p1 = UserId::new("patient-1");
        assert_eq!(h.gateway.patient_view(&t1(), &p1).unwrap().assessments.len(), 1);

        let settings = h
            .gateway
            .update_consent(&Viewer::patient("patient-1"), ConsentField::ShareAssessments, false)
            .unwrap();
        assert!(!settings.share_assessments);
        assert!(h.gateway.patient_view(&t1(), &p1).unwrap().assessments.is_empty());
        assert!(h.audited().contains(&AuditAction::ConsentChanged {
            field: ConsentField::ShareAssessments,
            value: false,
        }));
    }

    #[test]
    fn owner_sees_private_entries_without_summaries() {
        let h = harness(vec![]);
        seed_entry(&h, "patient-2", "just for me", ShareScope::None, 2);
        seed_entry(&h, "patient-2", "Shared. With AI.", ShareScope::TherapistAi, 3);

        let view = h.gateway.patient_view(&Viewer::patient("patient-2"), &UserId::new("patient-2")).unwrap();
        assert_eq!(view.journal.len(), 2);
        assert!(view.journal.iter().all(|s| s.summary.is_none()));
    }

    #[test]
    fn therapist_off_panel_gets_empty_view_and_denial_is_audited() {
        let h = harness(vec![]);
        seed_entry(&h, "patient-1", "shared", ShareScope::Therapist, 2);
        seed_assessment(&h, "patient-1", &[0; 9], 2);

        let view = h.gateway.patient_view(&Viewer::therapist("therapist-2"), &UserId::new("patient-1")).unwrap();
        assert_eq!(view.access, Access::None);
        assert!(view.is_empty());
        assert_eq!(h.denials(), 1);
    }

    #[test]
    fn unknown_patient_looks_like_hidden_data() {
        let h = harness(vec![]);
        let view = h.gateway.patient_view(&t1(), &UserId::new("patient-404")).unwrap();
        assert_eq!(view.access, Access::None);
        assert!(view.is_empty());
        assert_eq!(h.denials(), 1);
    }

    #[test]
    fn another_patient_cannot_view_a_record() {
        let h = harness(vec![]);
        seed_entry(&h, "patient-1", "shared", ShareScope::Therapist, 2);
        let view = h.gateway.patient_view(&Viewer::patient("patient-2"), &UserId::new("patient-1")).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn policy_denial_withholds_only_that_category() {
        let h = harness(vec![("therapist", "view", "journal")]);
        seed_entry(&h, "patient-1", "shared", ShareScope::Therapist, 2);
        seed_assessment(&h, "patient-1", &[0; 9], 2);

        let view = h.gateway.patient_view(&t1(), &UserId::new("patient-1")).unwrap();
        assert!(view.journal.is_empty());
        assert_eq!(view.assessments.len(), 1);
        assert_eq!(h.denials(), 1);
        match h.audited().last() {
            Some(AuditAction::RecordViewed { shared, journal_entries, assessments }) => {
                assert!(!shared.contains(&DataCategory::Journal));
                assert_eq!((*journal_entries, *assessments), (0, 1));
            }
            other => panic!("expected RecordViewed last, got {other:?}"),
        }
    }

    // ── Assessments and detection ────────────────────────────────────────────

    #[test]
    fn shared_urgent_assessment_raises_high_flag() {
        let h = harness(vec![]);
        let response = AssessmentResponse::from_values(Instrument::Phq9, &[3, 3, 3, 3, 2, 2, 2, 2, 2]).unwrap();
        let submitted = h.gateway.submit_assessment(&Viewer::patient("patient-1"), response).unwrap();
        assert_eq!(submitted.record.score, 22);
        assert_eq!(submitted.band.label, BandLabel::Severe);
        assert_eq!(submitted.band.tier, SeverityTier::Urgent);
        let flag = submitted.flag.unwrap();
        assert_eq!(flag.severity, RiskLevel::High);
        assert_eq!(h.store.risk_flags(&UserId::new("patient-1")).unwrap().len(), 1);
    }

    #[test]
    fn unshared_assessment_raises_nothing() {
        let h = harness(vec![]);
        let response = AssessmentResponse::from_values(Instrument::Phq9, &[3; 9]).unwrap();
        let submitted = h.gateway.submit_assessment(&Viewer::patient("patient-3"), response).unwrap();
        assert!(submitted.flag.is_none());
        assert!(h.store.risk_flags(&UserId::new("patient-3")).unwrap().is_empty());
    }

    #[test]
    fn incomplete_assessment_is_rejected_before_storage() {
        let h = harness(vec![]);
        let response = AssessmentResponse::from_pairs(Instrument::Gad7, [(0, 1), (1, 2)]).unwrap();
        let err = h.gateway.submit_assessment(&Viewer::patient("patient-1"), response).unwrap_err();
        assert!(matches!(err, SahaayError::IncompleteResponse { .. }));
        assert!(h.store.assessments(&UserId::new("patient-1")).unwrap().is_empty());
    }

    #[test]
    fn therapist_cannot_submit_for_a_patient() {
        let h = harness(vec![]);
        let response = AssessmentResponse::from_values(Instrument::Gad7, &[0; 7]).unwrap();
        let err = h.gateway.submit_assessment(&t1(), response).unwrap_err();
        assert!(matches!(err, SahaayError::AccessDenied { .. }));
    }

    #[test]
    fn crisis_language_flags_only_when_entry_is_visible() {
        let h = harness(vec![]);
        let p1 = Viewer::patient("patient-1");
        let private = JournalEntry::new(p1.user_id.clone(), "I can't go on", Emotion::Sad, at(5));
        let (stored, flag) = h.gateway.write_journal_entry(&p1, private).unwrap();
        assert!(flag.is_none(), "private entries are never scanned for the care team");

        let (_, flag) = h.gateway.set_entry_scope(&p1, &stored.id, ShareScope::Therapist).unwrap();
        assert_eq!(flag.unwrap().source, RiskSource::Journal);

        // Re-sharing with a summary does not raise a second flag.
        let (_, again) = h.gateway.set_entry_scope(&p1, &stored.id, ShareScope::TherapistAi).unwrap();
        assert!(again.is_none());
        assert_eq!(h.store.risk_flags(&p1.user_id).unwrap().len(), 1);
    }

    #[test]
    fn only_the_owner_writes_or_deletes_their_journal() {
        let h = harness(vec![]);
        let entry = seed_entry(&h, "patient-1", "mine", ShareScope::Therapist, 2);
        let forged = JournalEntry::new(UserId::new("patient-1"), "forged", Emotion::Happy, at(3));

        assert!(h.gateway.write_journal_entry(&Viewer::patient("patient-2"), forged).is_err());
        assert!(h.gateway.delete_journal_entry(&t1(), &entry.id).is_err());
        assert!(h.gateway.delete_journal_entry(&Viewer::patient("patient-1"), &entry.id).unwrap());
        assert!(!h.gateway.delete_journal_entry(&Viewer::patient("patient-1"), &entry.id).unwrap());
    }

    #[test]
    fn entry_id_collision_is_rejected_and_the_original_survives() {
        let h = harness(vec![]);
        let victim = seed_entry(&h, "patient-1", "only mine", ShareScope::None, 2);

        let mut forged = JournalEntry::new(UserId::new("patient-2"), "overwrite", Emotion::Happy, at(3));
        forged.id = victim.id.clone();
        let err = h.gateway.write_journal_entry(&Viewer::patient("patient-2"), forged).unwrap_err();
        assert!(matches!(err, SahaayError::AlreadyExists { .. }));

        let mut replay = JournalEntry::new(UserId::new("patient-1"), "rewritten", Emotion::Calm, at(4));
        replay.id = victim.id.clone();
        let err = h.gateway.write_journal_entry(&Viewer::patient("patient-1"), replay).unwrap_err();
        assert!(matches!(err, SahaayError::AlreadyExists { .. }));

        let left = h.store.journal_entries(&UserId::new("patient-1")).unwrap();
        assert_eq!(left, vec![victim]);
        assert!(h.store.journal_entries(&UserId::new("patient-2")).unwrap().is_empty());
        assert!(!h.audited().iter().any(|a| matches!(a, AuditAction::JournalEntryWritten { .. })));
    }

    #[test]
    fn another_patient_cannot_rescope_an_entry() {
        let h = harness(vec![]);
        let entry = seed_entry(&h, "patient-1", "I can't go on", ShareScope::None, 2);

        let err = h
            .gateway
            .set_entry_scope(&Viewer::patient("patient-2"), &entry.id, ShareScope::Therapist)
            .unwrap_err();
        assert!(matches!(err, SahaayError::AccessDenied { .. }));
        assert_eq!(h.denials(), 1);

        let stored = h.store.journal_entry(&entry.id).unwrap().unwrap();
        assert_eq!(stored.scope, ShareScope::None);
        assert!(h.store.risk_flags(&UserId::new("patient-1")).unwrap().is_empty());
    }

    #[test]
    fn revoking_assessments_withholds_existing_assessment_flags() {
        let h = harness(vec![]);
        let p1 = Viewer::patient("patient-1");
        let response = AssessmentResponse::from_values(Instrument::Phq9, &[3, 3, 3, 3, 3, 3, 2, 2, 0]).unwrap();
        let flag = h.gateway.submit_assessment(&p1, response).unwrap().flag.unwrap();
        assert!(flag.note.contains("22"));
        let manual = h
            .gateway
            .raise_manual_flag(&t1(), &p1.user_id, RiskLevel::Low, "missed a session")
            .unwrap();

        h.gateway.update_consent(&p1, ConsentField::ShareAssessments, false).unwrap();

        let view = h.gateway.patient_view(&t1(), &p1.user_id).unwrap();
        assert!(view.assessments.is_empty());
        let notes: Vec<&str> = view.risk_flags.iter().map(|f| f.note.as_str()).collect();
        assert_eq!(notes, vec![manual.note.as_str()]);

        let queue = h.gateway.risk_queue(&t1(), &TriageFilter::default()).unwrap();
        assert!(queue.iter().all(|f| f.id != flag.id));
        assert!(queue.iter().any(|f| f.id == manual.id));

        let ack = h.gateway.acknowledge_flag(&t1(), &flag.id);
        assert!(matches!(ack, Err(SahaayError::NotFound { .. })));
        assert!(h.store.risk_flag(&flag.id).unwrap().unwrap().is_pending());

        // Restoring consent brings the flag back.
        h.gateway.update_consent(&p1, ConsentField::ShareAssessments, true).unwrap();
        let view = h.gateway.patient_view(&t1(), &p1.user_id).unwrap();
        assert!(view.risk_flags.iter().any(|f| f.id == flag.id));
    }

    // ── Risk review ──────────────────────────────────────────────────────────

    #[test]
    fn second_acknowledgment_is_rejected_and_original_kept() {
        let h = harness(vec![]);
        let flag = h
            .gateway
            .raise_manual_flag(&t1(), &UserId::new("patient-1"), RiskLevel::Medium, "missed sessions")
            .unwrap();
        h.store.insert_therapist(therapist("therapist-3", &["patient-1"])).unwrap();

        let first = h.gateway.acknowledge_flag(&t1(), &flag.id).unwrap();
        assert_eq!(first.status(), FlagStatus::Acknowledged);

        let err = h.gateway.acknowledge_flag(&Viewer::therapist("therapist-3"), &flag.id).unwrap_err();
        assert!(matches!(err, SahaayError::AlreadyAcknowledged { .. }));
        let stored = h.store.risk_flag(&flag.id).unwrap().unwrap();
        assert_eq!(stored.acknowledged_by, Some(UserId::new("therapist-1")));
        assert_eq!(stored.acknowledged_at, first.acknowledged_at);
    }

    #[test]
    fn off_panel_therapist_cannot_acknowledge() {
        let h = harness(vec![]);
        let flag = h.gateway.raise_manual_flag(&t1(), &UserId::new("patient-2"), RiskLevel::High, "check in").unwrap();
        let err = h.gateway.acknowledge_flag(&Viewer::therapist("therapist-2"), &flag.id).unwrap_err();
        assert!(matches!(err, SahaayError::AccessDenied { .. }));
        assert!(h.store.risk_flag(&flag.id).unwrap().unwrap().is_pending());
    }

    #[test]
    fn patient_role_denied_by_policy_cannot_acknowledge() {
        let h = harness(vec![("patient", "acknowledge", "risk-flags")]);
        let flag = h.gateway.raise_manual_flag(&t1(), &UserId::new("patient-1"), RiskLevel::Low, "note").unwrap();
        let err = h.gateway.acknowledge_flag(&Viewer::patient("patient-1"), &flag.id).unwrap_err();
        assert!(matches!(err, SahaayError::AccessDenied { .. }));
        assert_eq!(h.denials(), 1);
    }

    #[test]
    fn risk_queue_spans_panel_pending_first() {
        let h = harness(vec![]);
        let low = h.gateway.raise_manual_flag(&t1(), &UserId::new("patient-1"), RiskLevel::Low, "a").unwrap();
        h.gateway.raise_manual_flag(&t1(), &UserId::new("patient-2"), RiskLevel::High, "b").unwrap();
        let done = h.gateway.raise_manual_flag(&t1(), &UserId::new("patient-3"), RiskLevel::High, "c").unwrap();
        h.gateway.acknowledge_flag(&t1(), &done.id).unwrap();

        let queue = h.gateway.risk_queue(&t1(), &TriageFilter::default()).unwrap();
        let severities: Vec<(RiskLevel, bool)> = queue.iter().map(|f| (f.severity, f.is_pending())).collect();
        assert_eq!(
            severities,
            vec![(RiskLevel::High, true), (RiskLevel::Low, true), (RiskLevel::High, false)]
        );
        assert_eq!(queue[1].id, low.id);

        let summary = h.gateway.risk_summary(&t1()).unwrap();
        assert_eq!((summary.pending, summary.acknowledged, summary.patients_affected), (2, 1, 3));

        assert!(h.gateway.risk_queue(&Viewer::therapist("therapist-2"), &TriageFilter::default()).unwrap().is_empty());
    }

    // ── Messaging ────────────────────────────────────────────────────────────

    #[test]
    fn nudge_requires_consent() {
        let h = harness(vec![]);
        let err = h.gateway.send_nudge(&t1(), &UserId::new("patient-2"), "time for a check-in").unwrap_err();
        assert!(matches!(err, SahaayError::NudgeNotPermitted { .. }));
        assert!(h.gateway.thread(&t1(), &UserId::new("patient-2")).unwrap().is_empty());

        let sent = h.gateway.send_nudge(&t1(), &UserId::new("patient-1"), "time for a check-in").unwrap();
        assert_eq!(sent.kind, MessageKind::Nudge);
    }

    #[test]
    fn nudge_capability_denied_by_policy() {
        let h = harness(vec![("therapist", "send", "nudge")]);
        let err = h.gateway.send_nudge(&t1(), &UserId::new("patient-1"), "hi").unwrap_err();
        assert!(matches!(err, SahaayError::AccessDenied { .. }));
    }

    #[test]
    fn direct_messages_flow_within_a_care_pair_only() {
        let h = harness(vec![]);
        let p1 = Viewer::patient("patient-1");
        let sent = h.gateway.send_message(&p1, &UserId::new("therapist-1"), "see you Friday").unwrap();
        h.gateway.send_message(&t1(), &p1.user_id, "confirmed").unwrap();

        let thread = h.gateway.thread(&t1(), &p1.user_id).unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id, sent.id);

        let read = h.gateway.mark_read(&t1(), &sent.id).unwrap();
        assert!(read.read_at.is_some());

        let err = h.gateway.send_message(&p1, &UserId::new("therapist-2"), "hello?").unwrap_err();
        assert!(matches!(err, SahaayError::AccessDenied { .. }));
    }

    // ── Audit history ────────────────────────────────────────────────────────

    #[test]
    fn sharing_history_is_owner_only() {
        let h = harness(vec![]);
        let p1 = UserId::new("patient-1");
        h.gateway.patient_view(&t1(), &p1).unwrap();

        let history = h.gateway.sharing_history(&Viewer::patient("patient-1"), &p1).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].actor, UserId::new("therapist-1"));

        assert!(h.gateway.sharing_history(&t1(), &p1).is_err());
    }
}

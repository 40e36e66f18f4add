//! Trait seams between the gateway and its collaborators.
//!
//! - `ViewPolicy`: trusted gate deciding whether a role may perform an action at all
//! - `AuditWriter`: trusted sink that records every decision immutably
//! - `RecordStore`: durable home of profiles, entries, assessments, flags,
//!   and messages
//!
//! The gateway wires them together. Consent is checked by the gateway itself
//! through the pure predicates in [`crate::visibility`], after the policy.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use sahaay_contracts::{
    assessment::AssessmentRecord,
    audit::AuditRecord,
    capability::CapabilitySet,
    consent::{ConsentField, ConsentSettings},
    error::SahaayResult,
    identity::{EntryId, FlagId, MessageId, PatientProfile, Role, TherapistProfile, UserId},
    journal::{JournalEntry, ShareScope},
    message::Message,
    policy::{PolicyContext, PolicyVerdict},
    risk::RiskFlag,
};

/// Role-to-capability view policy.
///
/// Implementations must be deterministic and fast: the gateway consults the
/// policy once per data category on every view.
pub trait ViewPolicy: Send + Sync {
    /// Decide whether the described action is permitted.
    fn evaluate(&self, ctx: &PolicyContext) -> SahaayResult<PolicyVerdict>;

    /// The capabilities a role holds under this policy.
    fn capabilities_for(&self, role: Role) -> CapabilitySet;
}

/// Append-only audit sink.
///
/// A failed write is fatal to the action being audited.
pub trait AuditWriter: Send + Sync {
    /// Append one record.
    fn write(&self, record: &AuditRecord) -> SahaayResult<()>;

    /// All records whose subject is `subject`, oldest first.
    fn records_for(&self, subject: &UserId) -> SahaayResult<Vec<AuditRecord>>;
}

/// The record store collaborator.
///
/// Reads return the latest written value. The two contended transitions,
/// `update_consent` and `acknowledge_flag`, must each be a single atomic
/// read-check-write so concurrent callers cannot lose an update or
/// acknowledge a flag twice.
pub trait RecordStore: Send + Sync {
    fn patient(&self, id: &UserId) -> SahaayResult<Option<PatientProfile>>;

    fn therapist(&self, id: &UserId) -> SahaayResult<Option<TherapistProfile>>;

    /// Entries owned by `owner`, newest first.
    fn journal_entries(&self, owner: &UserId) -> SahaayResult<Vec<JournalEntry>>;

    fn journal_entry(&self, id: &EntryId) -> SahaayResult<Option<JournalEntry>>;

    /// Store a new entry. Fails with `AlreadyExists` if the id is taken;
    /// existing entries change only through `rescope_journal_entry`.
    fn insert_journal_entry(&self, entry: JournalEntry) -> SahaayResult<()>;

    /// Change an entry's share scope, stamping `updated_at`.
    fn rescope_journal_entry(
        &self,
        id: &EntryId,
        scope: ShareScope,
        at: DateTime<Utc>,
    ) -> SahaayResult<JournalEntry>;

    /// Remove an entry. Returns false if it did not exist.
    fn delete_journal_entry(&self, id: &EntryId) -> SahaayResult<bool>;

    /// Assessments for `patient`, newest first.
    fn assessments(&self, patient: &UserId) -> SahaayResult<Vec<AssessmentRecord>>;

    fn put_assessment(&self, record: AssessmentRecord) -> SahaayResult<()>;

    /// Flags raised about `patient`, newest first.
    fn risk_flags(&self, patient: &UserId) -> SahaayResult<Vec<RiskFlag>>;

    fn risk_flag(&self, id: &FlagId) -> SahaayResult<Option<RiskFlag>>;

    fn put_risk_flag(&self, flag: RiskFlag) -> SahaayResult<()>;

    /// Atomically set one consent flag and return the new settings.
    fn update_consent(
        &self,
        patient: &UserId,
        field: ConsentField,
        value: bool,
        at: DateTime<Utc>,
    ) -> SahaayResult<ConsentSettings>;

    /// Atomically acknowledge a flag if, and only if, it is still pending.
    fn acknowledge_flag(
        &self,
        id: &FlagId,
        reviewer: &UserId,
        at: DateTime<Utc>,
    ) -> SahaayResult<RiskFlag>;

    fn put_message(&self, message: Message) -> SahaayResult<()>;

    /// Messages in a thread, oldest first.
    fn thread(&self, thread_key: &str) -> SahaayResult<Vec<Message>>;

    /// Set `read_at` on a message addressed to `reader`, once.
    fn mark_read(
        &self,
        id: &MessageId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> SahaayResult<Message>;
}

// Shared handles: lets a caller keep an `Arc` to inspect the store or audit
// trail while the gateway owns a boxed clone.

impl<T: AuditWriter + ?Sized> AuditWriter for Arc<T> {
    fn write(&self, record: &AuditRecord) -> SahaayResult<()> {
        (**self).write(record)
    }

    fn records_for(&self, subject: &UserId) -> SahaayResult<Vec<AuditRecord>> {
        (**self).records_for(subject)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn patient(&self, id: &UserId) -> SahaayResult<Option<PatientProfile>> {
        (**self).patient(id)
    }

    fn therapist(&self, id: &UserId) -> SahaayResult<Option<TherapistProfile>> {
        (**self).therapist(id)
    }

    fn journal_entries(&self, owner: &UserId) -> SahaayResult<Vec<JournalEntry>> {
        (**self).journal_entries(owner)
    }

    fn journal_entry(&self, id: &EntryId) -> SahaayResult<Option<JournalEntry>> {
        (**self).journal_entry(id)
    }

    fn insert_journal_entry(&self, entry: JournalEntry) -> SahaayResult<()> {
        (**self).insert_journal_entry(entry)
    }

    fn rescope_journal_entry(
        &self,
        id: &EntryId,
        scope: ShareScope,
        at: DateTime<Utc>,
    ) -> SahaayResult<JournalEntry> {
        (**self).rescope_journal_entry(id, scope, at)
    }

    fn delete_journal_entry(&self, id: &EntryId) -> SahaayResult<bool> {
        (**self).delete_journal_entry(id)
    }

    fn assessments(&self, patient: &UserId) -> SahaayResult<Vec<AssessmentRecord>> {
        (**self).assessments(patient)
    }

    fn put_assessment(&self, record: AssessmentRecord) -> SahaayResult<()> {
        (**self).put_assessment(record)
    }

    fn risk_flags(&self, patient: &UserId) -> SahaayResult<Vec<RiskFlag>> {
        (**self).risk_flags(patient)
    }

    fn risk_flag(&self, id: &FlagId) -> SahaayResult<Option<RiskFlag>> {
        (**self).risk_flag(id)
    }

    fn put_risk_flag(&self, flag: RiskFlag) -> SahaayResult<()> {
        (**self).put_risk_flag(flag)
    }

    fn update_consent(
        &self,
        patient: &UserId,
        field: ConsentField,
        value: bool,
        at: DateTime<Utc>,
    ) -> SahaayResult<ConsentSettings> {
        (**self).update_consent(patient, field, value, at)
    }

    fn acknowledge_flag(
        &self,
        id: &FlagId,
        reviewer: &UserId,
        at: DateTime<Utc>,
    ) -> SahaayResult<RiskFlag> {
        (**self).acknowledge_flag(id, reviewer, at)
    }

    fn put_message(&self, message: Message) -> SahaayResult<()> {
        (**self).put_message(message)
    }

    fn thread(&self, thread_key: &str) -> SahaayResult<Vec<Message>> {
        (**self).thread(thread_key)
    }

    fn mark_read(
        &self,
        id: &MessageId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> SahaayResult<Message> {
        (**self).mark_read(id, reader, at)
    }
}

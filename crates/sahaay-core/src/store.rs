//! In-memory implementation of `RecordStore`.
//!
//! All state sits behind a single `Mutex`, so every mutation is serialized
//! and the contended transitions (consent update, flag acknowledgment) run
//! their check and write inside one critical section. This is the
//! single-writer discipline the gateway relies on.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use sahaay_contracts::{
    assessment::AssessmentRecord,
    consent::{ConsentField, ConsentSettings},
    error::{SahaayError, SahaayResult},
    identity::{EntryId, FlagId, MessageId, PatientProfile, TherapistProfile, UserId},
    journal::{JournalEntry, ShareScope},
    message::Message,
    risk::RiskFlag,
};

use crate::traits::RecordStore;

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
struct StoreState {
    patients: HashMap<UserId, PatientProfile>,
    therapists: HashMap<UserId, TherapistProfile>,
    entries: HashMap<EntryId, JournalEntry>,
    assessments: Vec<AssessmentRecord>,
    flags: HashMap<FlagId, RiskFlag>,
    messages: Vec<Message>,
}

// ── Public store ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRecordStore {
    state: Mutex<StoreState>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> SahaayResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|e| SahaayError::Store {
            reason: format!("record store lock poisoned: {}", e),
        })
    }

    pub fn insert_patient(&self, patient: PatientProfile) -> SahaayResult<()> {
        self.lock()?.patients.insert(patient.id.clone(), patient);
        Ok(())
    }

    pub fn insert_therapist(&self, therapist: TherapistProfile) -> SahaayResult<()> {
        self.lock()?.therapists.insert(therapist.id.clone(), therapist);
        Ok(())
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

// ── RecordStore impl ──────────────────────────────────────────────────────────

impl RecordStore for InMemoryRecordStore {
    fn patient(&self, id: &UserId) -> SahaayResult<Option<PatientProfile>> {
        Ok(self.lock()?.patients.get(id).cloned())
    }

    fn therapist(&self, id: &UserId) -> SahaayResult<Option<TherapistProfile>> {
        Ok(self.lock()?.therapists.get(id).cloned())
    }

    fn journal_entries(&self, owner: &UserId) -> SahaayResult<Vec<JournalEntry>> {
        let state = self.lock()?;
        let mut entries: Vec<JournalEntry> =
            state.entries.values().filter(|e| &e.owner == owner).cloned().collect();
        newest_first(&mut entries, |e| e.created_at);
        Ok(entries)
    }

    fn journal_entry(&self, id: &EntryId) -> SahaayResult<Option<JournalEntry>> {
        Ok(self.lock()?.entries.get(id).cloned())
    }

    fn insert_journal_entry(&self, entry: JournalEntry) -> SahaayResult<()> {
        let mut state = self.lock()?;
        if state.entries.contains_key(&entry.id) {
            return Err(SahaayError::AlreadyExists { kind: "journal entry", id: entry.id.to_string() });
        }
        state.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    fn rescope_journal_entry(
        &self,
        id: &EntryId,
        scope: ShareScope,
        at: DateTime<Utc>,
    ) -> SahaayResult<JournalEntry> {
        let mut state = self.lock()?;
        let entry = state.entries.get_mut(id).ok_or_else(|| SahaayError::NotFound {
            kind: "journal entry",
            id: id.to_string(),
        })?;
        entry.rescope(scope, at);
        Ok(entry.clone())
    }

    fn delete_journal_entry(&self, id: &EntryId) -> SahaayResult<bool> {
        Ok(self.lock()?.entries.remove(id).is_some())
    }

    fn assessments(&self, patient: &UserId) -> SahaayResult<Vec<AssessmentRecord>> {
        let state = self.lock()?;
        let mut records: Vec<AssessmentRecord> = state
            .assessments
            .iter()
            .filter(|a| &a.patient_id == patient)
            .cloned()
            .collect();
        newest_first(&mut records, |a| a.created_at);
        Ok(records)
    }

    fn put_assessment(&self, record: AssessmentRecord) -> SahaayResult<()> {
        self.lock()?.assessments.push(record);
        Ok(())
    }

    fn risk_flags(&self, patient: &UserId) -> SahaayResult<Vec<RiskFlag>> {
        let state = self.lock()?;
        let mut flags: Vec<RiskFlag> =
            state.flags.values().filter(|f| &f.patient_id == patient).cloned().collect();
        newest_first(&mut flags, |f| f.created_at);
        Ok(flags)
    }

    fn risk_flag(&self, id: &FlagId) -> SahaayResult<Option<RiskFlag>> {
        Ok(self.lock()?.flags.get(id).cloned())
    }

    fn put_risk_flag(&self, flag: RiskFlag) -> SahaayResult<()> {
        self.lock()?.flags.insert(flag.id.clone(), flag);
        Ok(())
    }

    fn update_consent(
        &self,
        patient: &UserId,
        field: ConsentField,
        value: bool,
        at: DateTime<Utc>,
    ) -> SahaayResult<ConsentSettings> {
        let mut state = self.lock()?;
        let profile = state.patients.get_mut(patient).ok_or_else(|| SahaayError::NotFound {
            kind: "patient",
            id: patient.to_string(),
        })?;
        profile.consent.set(field, value, at);
        debug!(patient_id = %patient, field = %field, value, "consent updated");
        Ok(profile.consent.clone())
    }

    fn acknowledge_flag(
        &self,
        id: &FlagId,
        reviewer: &UserId,
        at: DateTime<Utc>,
    ) -> SahaayResult<RiskFlag> {
        let mut state = self.lock()?;
        let flag = state.flags.get_mut(id).ok_or_else(|| SahaayError::NotFound {
            kind: "risk flag",
            id: id.to_string(),
        })?;
        // Check-and-set under the same lock: a racing second reviewer sees
        // the first acknowledgment and is rejected.
        flag.acknowledge(reviewer, at)?;
        info!(flag_id = %id, reviewer = %reviewer, "risk flag acknowledged");
        Ok(flag.clone())
    }

    fn put_message(&self, message: Message) -> SahaayResult<()> {
        self.lock()?.messages.push(message);
        Ok(())
    }

    fn thread(&self, thread_key: &str) -> SahaayResult<Vec<Message>> {
        let state = self.lock()?;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.thread_key == thread_key)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    fn mark_read(
        &self,
        id: &MessageId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> SahaayResult<Message> {
        let mut state = self.lock()?;
        // Only the recipient can read a message; anyone else sees nothing.
        let message = state
            .messages
            .iter_mut()
            .find(|m| &m.id == id && &m.to == reader)
            .ok_or_else(|| SahaayError::NotFound { kind: "message", id: id.to_string() })?;
        if message.read_at.is_none() {
            message.read_at = Some(at);
        }
        Ok(message.clone())
    }
}

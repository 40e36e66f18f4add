//! In-memory implementation of `AuditWriter`.
//!
//! All events live in one `Vec` behind a `Mutex`. Use `records_for()` to
//! answer a patient's "who saw my data" question, `export_log()` for a sealed
//! copy, and `verify_integrity()` to confirm nothing was altered in memory.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use sahaay_contracts::{
    audit::AuditRecord,
    error::{SahaayError, SahaayResult},
    identity::UserId,
};
use sahaay_core::traits::AuditWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<AuditEvent>,

    /// The next sequence number to assign.
    pub(crate) sequence: u64,

    /// `this_hash` of the last event, or `GENESIS_HASH` before any write.
    pub(crate) last_hash: String,
}

// ── Public writer ─────────────────────────────────────────────────────────────

/// An append-only audit writer backed by a SHA-256 hash chain.
///
/// Every gateway decision lands here, so a patient's sharing history is the
/// subset of events whose record names them as subject.
pub struct InMemoryAuditWriter {
    trail_id: String,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAuditWriter {
    pub fn new(trail_id: impl Into<String>) -> Self {
        let state = InMemoryState {
            events: Vec::new(),
            sequence: 0,
            last_hash: AuditEvent::GENESIS_HASH.to_string(),
        };
        Self {
            trail_id: trail_id.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> SahaayResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| SahaayError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }

    pub fn len(&self) -> SahaayResult<usize> {
        Ok(self.lock()?.events.len())
    }

    pub fn is_empty(&self) -> SahaayResult<bool> {
        Ok(self.len()? == 0)
    }

    /// A sealed copy of every event written so far.
    pub fn export_log(&self) -> SahaayResult<AuditLog> {
        let state = self.lock()?;
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Ok(AuditLog {
            trail_id: self.trail_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    pub fn verify_integrity(&self) -> SahaayResult<bool> {
        Ok(verify_chain(&self.lock()?.events))
    }
}

// ── AuditWriter impl ──────────────────────────────────────────────────────────

impl AuditWriter for InMemoryAuditWriter {
    fn write(&self, record: &AuditRecord) -> SahaayResult<()> {
        let mut state = self.lock()?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(&self.trail_id, sequence, record, &prev_hash)?;

        state.events.push(AuditEvent {
            sequence,
            trail_id: self.trail_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        debug!(
            trail_id = %self.trail_id,
            sequence,
            actor = %record.actor,
            patient_id = %record.subject,
            "audit event appended"
        );
        Ok(())
    }

    fn records_for(&self, subject: &UserId) -> SahaayResult<Vec<AuditRecord>> {
        Ok(self
            .lock()?
            .events
            .iter()
            .filter(|e| &e.record.subject == subject)
            .map(|e| e.record.clone())
            .collect())
    }
}

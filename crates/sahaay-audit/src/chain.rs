//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. trail_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of the audit record

use sha2::{Digest, Sha256};

use sahaay_contracts::{
    audit::AuditRecord,
    error::{SahaayError, SahaayResult},
};

use crate::event::AuditEvent;

/// SHA-256 over (trail_id, sequence, prev_hash, record JSON), as lowercase
/// hex.
pub fn hash_event(
    trail_id: &str,
    sequence: u64,
    record: &AuditRecord,
    prev_hash: &str,
) -> SahaayResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| SahaayError::AuditWriteFailed {
        reason: format!("audit record could not be serialized: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(trail_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify both prev-hash linkage and per-event hash correctness.
///
/// Sequences must also run 0, 1, 2… without gaps, so dropping an event from
/// the middle is caught even if the remaining links were rewritten. An empty
/// chain is valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }

        match hash_event(&event.trail_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.clone();
    }

    true
}

//! # sahaay-audit
//!
//! Append-only, SHA-256 hash-chained sharing audit trail for Sahaay.
//!
//! ## Overview
//!
//! Every decision the care gateway makes about a patient's data (views,
//! denials, consent changes, acknowledgments, nudges) is wrapped in an
//! `AuditEvent` that links to the previous event via its SHA-256 hash.
//! Changing any byte of any event breaks the chain and `verify_chain`
//! reports it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sahaay_audit::InMemoryAuditWriter;
//! use sahaay_core::traits::AuditWriter;
//!
//! let writer = InMemoryAuditWriter::new("clinic-trail");
//! writer.write(&record)?;
//!
//! assert!(writer.verify_integrity()?);
//! let history = writer.records_for(&patient_id)?;
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────

//! # sahaay-core
//!
//! The consent-gated care gateway for Sahaay.
//!
//! This crate provides:
//! - The three trait seams (`ViewPolicy`, `AuditWriter`, `RecordStore`)
//! - The pure consent visibility predicates
//! - `CareGateway`, which wires policy, consent, store and audit together
//! - `InMemoryRecordStore`, the single-writer reference store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sahaay_core::{CareGateway, InMemoryRecordStore};
//!
//! let gateway = CareGateway::new(Box::new(policy), Box::new(audit), Box::new(store));
//! let view = gateway.patient_view(&Viewer::therapist("therapist-1"), &patient_id)?;
//! ```

pub mod gateway;
pub mod store;
pub mod traits;
pub mod visibility;

pub use gateway::{Access, CareGateway, MoodPoint, PatientView, ScoredAssessment, SharedEntry, SubmittedAssessment};
pub use store::InMemoryRecordStore;

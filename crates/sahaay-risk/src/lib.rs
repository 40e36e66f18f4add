//! # sahaay-risk
//!
//! Risk flag detection and reviewer triage.
//!
//! Flags come from three sources: scored assessments (band tier and the
//! PHQ-9 self-harm item), journal entries containing crisis language, and
//! therapists raising them by hand. The acknowledgment lifecycle itself
//! lives on [`RiskFlag`](sahaay_contracts::risk::RiskFlag).

pub mod detect;
pub mod triage;

pub use detect::{find_warning_phrase, flag_from_assessment, flag_from_journal, WARNING_PHRASES};
pub use triage::{sort_for_review, summarize, TriageFilter, TriageSummary};

// ── Tests ─────────────────────────────────────────────────────────────────────

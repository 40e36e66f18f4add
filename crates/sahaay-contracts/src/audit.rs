//! Audit records: what happened to a patient's data, by whom, and when.
//!
//! Every consent change, record view, denial, acknowledgment, and outgoing
//! message produces exactly one `AuditRecord`. The audit writer appends it to
//! its store; records are never modified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    assessment::Instrument,
    consent::ConsentField,
    identity::UserId,
    journal::ShareScope,
};

/// A category of patient data a view can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    Mood,
    Journal,
    Assessments,
    RiskFlags,
}

impl DataCategory {
    /// The resource name used in view policy rules.
    pub fn resource(&self) -> &'static str {
        match self {
            DataCategory::Mood => "mood",
            DataCategory::Journal => "journal",
            DataCategory::Assessments => "assessments",
            DataCategory::RiskFlags => "risk-flags",
        }
    }
}

/// The action an audit record describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditAction {
    ConsentChanged { field: ConsentField, value: bool },
    /// A viewer received a view of the subject's record.
    RecordViewed {
        /// Categories that carried data in the returned view.
        shared: Vec<DataCategory>,
        journal_entries: usize,
        assessments: usize,
    },
    AccessDenied { action: String, resource: String, reason: String },
    AssessmentSubmitted { instrument: Instrument, score: u32 },
    JournalEntryWritten { entry_id: String, scope: ShareScope },
    JournalEntryDeleted { entry_id: String },
    FlagRaised { flag_id: String },
    FlagAcknowledged { flag_id: String },
    NudgeSent { message_id: String },
    MessageSent { message_id: String },
}

/// An immutable record of one audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Who acted.
    pub actor: UserId,
    /// Whose data was touched.
    pub subject: UserId,
    pub action: AuditAction,
    /// Wall-clock time the record was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(actor: &UserId, subject: &UserId, action: AuditAction) -> Self {
        Self {
            actor: actor.clone(),
            subject: subject.clone(),
            action,
            timestamp: Utc::now(),
        }
    }
}

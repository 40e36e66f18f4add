//! Risk flags and their one-way acknowledgment lifecycle.
//!
//! ```text
//! Pending ──acknowledge(reviewer, at)──▶ Acknowledged
//! ```
//!
//! There is no way back and no second acknowledgment: a repeated call is
//! rejected and the original reviewer and timestamp are preserved.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{SahaayError, SahaayResult},
    identity::{FlagId, UserId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        })
    }
}

/// Where a flag came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSource {
    Assessment,
    Journal,
    Manual,
}

/// Lifecycle state, derived from whether `acknowledged_by` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagStatus {
    Pending,
    Acknowledged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub id: FlagId,
    pub patient_id: UserId,
    pub severity: RiskLevel,
    pub source: RiskSource,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub acknowledged_by: Option<UserId>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl RiskFlag {
    /// Raise a new, unacknowledged flag.
    pub fn raise(
        patient_id: UserId,
        severity: RiskLevel,
        source: RiskSource,
        note: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: FlagId::generate(),
            patient_id,
            severity,
            source,
            note: note.into(),
            created_at: at,
            acknowledged_by: None,
            acknowledged_at: None,
        }
    }

    pub fn status(&self) -> FlagStatus {
        if self.acknowledged_by.is_some() {
            FlagStatus::Acknowledged
        } else {
            FlagStatus::Pending
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status() == FlagStatus::Pending
    }

    /// Move the flag to `Acknowledged`, recording reviewer and time together.
    ///
    /// Returns `AlreadyAcknowledged` without touching the flag if a reviewer
    /// has already acted on it.
    pub fn acknowledge(&mut self, reviewer: &UserId, at: DateTime<Utc>) -> SahaayResult<()> {
        if let Some(existing) = &self.acknowledged_by {
            return Err(SahaayError::AlreadyAcknowledged {
                flag_id: self.id.to_string(),
                acknowledged_by: existing.to_string(),
            });
        }
        self.acknowledged_by = Some(reviewer.clone());
        self.acknowledged_at = Some(at);
        Ok(())
    }
}

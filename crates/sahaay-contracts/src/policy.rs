//! View policy verdict and evaluation context types.
//!
//! The view policy consumes a `PolicyContext` and produces a `PolicyVerdict`.
//! Sahaay is deny-by-default: anything other than `Allow` hides the data.

use serde::{Deserialize, Serialize};

/// The decision emitted by the view policy for one requested action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyVerdict {
    /// The action is permitted. Consent checks still apply afterwards.
    Allow,

    /// The action is denied.
    Deny {
        /// Human-readable explanation, written to the audit trail.
        reason: String,
    },
}

impl PolicyVerdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, PolicyVerdict::Allow)
    }
}

/// Everything the view policy needs to make a decision.
///
/// All fields are plain strings so policy rules can be written without
/// depending on the record type hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyContext {
    /// The requesting user's id.
    pub viewer_id: String,
    /// The requesting user's role (e.g. "therapist").
    pub role: String,
    /// What the viewer wants to do (e.g. "view", "acknowledge", "send").
    pub action: String,
    /// The data category the action targets (e.g. "journal", "risk-flags").
    pub resource: String,
    /// All capabilities the viewer's role holds.
    pub capabilities: Vec<String>,
}

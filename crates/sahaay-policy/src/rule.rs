//! View policy rule types and configuration schema.
//!
//! A `ViewPolicyConfig` is deserialized from TOML and holds an ordered list
//! of `ViewRule`s plus the capabilities granted to each role. Rules are
//! evaluated in declaration order and the first matching rule wins. If no
//! rule matches, the engine denies by default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The decision a rule produces when it matches.
///
/// ```toml
/// verdict = "allow"
/// verdict = "deny"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleVerdict {
    Allow,
    Deny,
}

/// A single rule loaded from TOML.
///
/// Both `action` and `resource` accept the wildcard `"*"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRule {
    /// Stable identifier used in logs and denial reasons.
    pub id: String,

    pub description: String,

    /// e.g. `"view"`, `"acknowledge"`, `"send"`, or `"*"`.
    pub action: String,

    /// e.g. `"journal"`, `"risk-flags"`, `"nudge"`, or `"*"`.
    pub resource: String,

    /// Capabilities the viewer's role must hold. A missing capability denies
    /// even when `verdict = "allow"`.
    #[serde(default)]
    pub required_capabilities: Vec<String>,

    pub verdict: RuleVerdict,

    /// Reason recorded in the audit trail when `verdict = "deny"`.
    pub deny_reason: Option<String>,
}

impl ViewRule {
    /// `"*"` matches anything; otherwise an exact, case-sensitive match.
    pub fn matches(&self, action: &str, resource: &str) -> bool {
        let action_matches = self.action == "*" || self.action == action;
        let resource_matches = self.resource == "*" || self.resource == resource;
        action_matches && resource_matches
    }
}

/// The top-level structure of a view policy file.
///
/// ```toml
/// [roles]
/// therapist = ["journal:read", "risk-flags:acknowledge"]
///
/// [[rules]]
/// id = "view-journal"
/// description = "Shared journal entries"
/// action = "view"
/// resource = "journal"
/// required_capabilities = ["journal:read"]
/// verdict = "allow"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewPolicyConfig {
    /// Role name (`patient`, `therapist`, `admin`) to granted capability
    /// names. A role absent from the table holds nothing.
    #[serde(default)]
    pub roles: HashMap<String, Vec<String>>,

    /// Ordered list of rules. First match wins.
    #[serde(default)]
    pub rules: Vec<ViewRule>,
}

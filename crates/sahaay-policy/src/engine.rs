//! TOML-driven view policy.
//!
//! `TomlViewPolicy` loads a `ViewPolicyConfig` and implements `ViewPolicy`
//! from sahaay-core.
//!
//! Evaluation:
//!
//! 1. Iterate rules in declaration order.
//! 2. For the first rule whose `action` and `resource` match:
//!    a. every `required_capabilities` entry must be held by the viewer's
//!       role, otherwise `Deny`;
//!    b. return the rule's verdict.
//! 3. No rule matched → `Deny` ("denied by default").

use std::path::Path;

use tracing::{debug, warn};

use sahaay_contracts::{
    capability::CapabilitySet,
    error::{SahaayError, SahaayResult},
    identity::Role,
    policy::{PolicyContext, PolicyVerdict},
};
use sahaay_core::traits::ViewPolicy;

use crate::rule::{RuleVerdict, ViewPolicyConfig};

/// A `ViewPolicy` read from a TOML document.
///
/// ```rust,ignore
/// use sahaay_policy::TomlViewPolicy;
///
/// let policy = TomlViewPolicy::from_file(Path::new("policies/care_team.toml"))?;
/// ```
#[derive(Debug)]
pub struct TomlViewPolicy {
    config: ViewPolicyConfig,
}

impl TomlViewPolicy {
    /// Returns `ConfigError` if the TOML is malformed or does not match the
    /// schema, or if a role name in `[roles]` is not a known role.
    pub fn from_toml_str(s: &str) -> SahaayResult<Self> {
        let config: ViewPolicyConfig = toml::from_str(s).map_err(|e| SahaayError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;

        if let Some(unknown) = config
            .roles
            .keys()
            .find(|name| ![Role::Patient, Role::Therapist, Role::Admin].iter().any(|r| r.as_str() == name.as_str()))
        {
            return Err(SahaayError::ConfigError {
                reason: format!("unknown role '{}' in [roles]", unknown),
            });
        }

        debug!(rules = config.rules.len(), roles = config.roles.len(), "view policy loaded");
        Ok(Self { config })
    }

    pub fn from_file(path: &Path) -> SahaayResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SahaayError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn config(&self) -> &ViewPolicyConfig {
        &self.config
    }
}

impl ViewPolicy for TomlViewPolicy {
    fn evaluate(&self, ctx: &PolicyContext) -> SahaayResult<PolicyVerdict> {
        debug!(
            viewer = %ctx.viewer_id,
            role = %ctx.role,
            action = %ctx.action,
            resource = %ctx.resource,
            "evaluating view policy"
        );

        for rule in &self.config.rules {
            if !rule.matches(&ctx.action, &ctx.resource) {
                continue;
            }

            debug!(rule_id = %rule.id, "rule matched");

            for required_cap in &rule.required_capabilities {
                if !ctx.capabilities.contains(required_cap) {
                    warn!(
                        rule_id = %rule.id,
                        capability = %required_cap,
                        role = %ctx.role,
                        "matched rule requires capability the role does not hold"
                    );
                    return Ok(PolicyVerdict::Deny {
                        reason: format!(
                            "rule '{}' requires capability '{}' which is not granted to role '{}'",
                            rule.id, required_cap, ctx.role
                        ),
                    });
                }
            }

            let verdict = match rule.verdict {
                RuleVerdict::Allow => PolicyVerdict::Allow,
                RuleVerdict::Deny => PolicyVerdict::Deny {
                    reason: rule
                        .deny_reason
                        .clone()
                        .unwrap_or_else(|| format!("denied by rule '{}'", rule.id)),
                },
            };
            return Ok(verdict);
        }

        warn!(
            action = %ctx.action,
            resource = %ctx.resource,
            role = %ctx.role,
            "no view rule matched; denying by default"
        );
        Ok(PolicyVerdict::Deny {
            reason: format!(
                "denied by default: no policy rule matched action '{}' on resource '{}'",
                ctx.action, ctx.resource
            ),
        })
    }

    fn capabilities_for(&self, role: Role) -> CapabilitySet {
        self.config
            .roles
            .get(role.as_str())
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }
}

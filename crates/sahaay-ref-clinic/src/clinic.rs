//! A fully wired clinic: policy, hash-chained audit trail, seeded store, and
//! the gateway over them.

use std::sync::Arc;

use tracing::info;

use sahaay_audit::InMemoryAuditWriter;
use sahaay_contracts::error::{SahaayError, SahaayResult};
use sahaay_core::{CareGateway, InMemoryRecordStore};
use sahaay_policy::TomlViewPolicy;

use crate::fixtures;

/// The reference care-team policy.
pub const CARE_TEAM_POLICY: &str = include_str!("../policies/care_team.toml");

/// The gateway plus shared handles to the store and audit trail behind it,
/// so scenarios can inspect state the gateway does not expose.
pub struct Clinic {
    pub gateway: CareGateway,
    pub store: Arc<InMemoryRecordStore>,
    pub audit: Arc<InMemoryAuditWriter>,
}

impl Clinic {
    /// Build a clinic under `policy_toml`, seeded with the fixture data.
    pub fn open(policy_toml: &str) -> SahaayResult<Self> {
        let policy = TomlViewPolicy::from_toml_str(policy_toml)?;
        let store = Arc::new(InMemoryRecordStore::new());
        fixtures::seed(&store)?;
        let audit = Arc::new(InMemoryAuditWriter::new("serenity-clinic"));

        let gateway = CareGateway::new(
            Box::new(policy),
            Box::new(Arc::clone(&audit)),
            Box::new(Arc::clone(&store)),
        );
        info!(trail_id = "serenity-clinic", "reference clinic opened");
        Ok(Self { gateway, store, audit })
    }

    /// One line describing the state of the audit trail.
    pub fn audit_line(&self) -> SahaayResult<String> {
        let log = self.audit.export_log()?;
        let verified = if self.audit.verify_integrity()? { "VERIFIED" } else { "FAILED" };
        Ok(format!("{} ({} event(s))", verified, log.events.len()))
    }

    /// The whole trail as pretty-printed JSON.
    pub fn export_audit_json(&self) -> SahaayResult<String> {
        let log = self.audit.export_log()?;
        serde_json::to_string_pretty(&log).map_err(|e| SahaayError::AuditWriteFailed {
            reason: format!("failed to serialize audit log: {}", e),
        })
    }
}

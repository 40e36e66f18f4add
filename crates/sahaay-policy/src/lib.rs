//! # sahaay-policy
//!
//! A TOML-driven, deny-by-default view policy for Sahaay.
//!
//! ## Overview
//!
//! [`TomlViewPolicy`] implements [`ViewPolicy`](sahaay_core::traits::ViewPolicy).
//! A policy file has two parts: a `[roles]` table granting capability names
//! to each role, and an ordered `[[rules]]` list matching `action` and
//! `resource` pairs. The first matching rule wins; if none matches, the
//! request is denied.
//!
//! ```rust,ignore
//! use std::path::Path;
//! use sahaay_policy::TomlViewPolicy;
//!
//! let policy = TomlViewPolicy::from_file(Path::new("policies/care_team.toml"))?;
//! // Pass `policy` to `sahaay_core::CareGateway::new(...)`.
//! ```

pub mod engine;
pub mod rule;

pub use engine::TomlViewPolicy;
pub use rule::{RuleVerdict, ViewPolicyConfig, ViewRule};

// ── Tests ─────────────────────────────────────────────────────────────────────

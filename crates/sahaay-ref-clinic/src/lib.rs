//! # sahaay-ref-clinic
//!
//! Reference clinic for Sahaay.
//!
//! Runs five scenarios against deterministic fixture data (three patients,
//! two therapists) under the care-team policy in `policies/care_team.toml`:
//!
//! 1. **Screening**: PHQ-9 / GAD-7 scoring, banding, rejection of incomplete
//!    responses, and flags from urgent or crisis-item results.
//! 2. **Therapist view**: what a therapist sees of each patient under their
//!    consent settings, and what an off-panel therapist sees (nothing).
//! 3. **Consent toggle**: a consent change takes effect on the very next view
//!    and appears in the patient's sharing history.
//! 4. **Risk review**: triage queue, filtering, acknowledgment, and
//!    rejection of a second acknowledgment.
//! 5. **Messaging**: direct messages and consent-gated nudges.
//!
//! All data is fictional.

pub mod clinic;
pub mod fixtures;
pub mod scenarios;

pub use clinic::{Clinic, CARE_TEAM_POLICY};

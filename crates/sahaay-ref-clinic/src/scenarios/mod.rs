//! Reference clinic scenarios.
//!
//! Each scenario opens its own seeded [`Clinic`](crate::Clinic) under the
//! given policy, drives the gateway as patients and therapists would, and
//! prints what each party saw.

pub mod consent_toggle;
pub mod messaging;
pub mod risk_review;
pub mod screening;
pub mod therapist_view;

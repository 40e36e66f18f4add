//! # sahaay-contracts
//!
//! Shared record types, capability contracts, and errors for Sahaay.
//!
//! All crates in the workspace import from here. The only behavior in this
//! crate is the invariant-preserving kind: answers that cannot leave [0, 3],
//! consent changes that always stamp `updated_at`, and the one-way risk flag
//! acknowledgment.

pub mod assessment;
pub mod audit;
pub mod capability;
pub mod consent;
pub mod error;
pub mod identity;
pub mod journal;
pub mod message;
pub mod policy;
pub mod risk;

//! Capability-based view permissions.
//!
//! A viewer may only reach patient data if their role holds the matching
//! capability. Capabilities are granted by the view policy at load time and
//! never elevated per request.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// An opaque capability token.
///
/// Names are namespaced by data category: e.g. "mood:read",
/// "journal:read", "risk-flags:acknowledge", "nudge:send".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability(pub String);

impl Capability {
    /// Construct a capability from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// The full set of capabilities a role holds.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    inner: HashSet<Capability>,
}

impl CapabilitySet {
    /// Grant a capability to this set.
    pub fn grant(&mut self, capability: Capability) {
        self.inner.insert(capability);
    }

    /// Return true if the set contains the given capability.
    pub fn has(&self, capability: &Capability) -> bool {
        self.inner.contains(capability)
    }

    /// Return an iterator over all granted capabilities.
    pub fn all(&self) -> impl Iterator<Item = &Capability> {
        self.inner.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = CapabilitySet::default();
        for name in iter {
            set.grant(Capability::new(name));
        }
        set
    }
}

//! User identity, roles, and profile types.
//!
//! Profiles are plain records; who may see what is decided by the view policy
//! and the visibility predicates, never by branching on a role here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consent::ConsentSettings;

/// Stable identifier for a user (patient, therapist, or admin).
///
/// Example: UserId("patient-1")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declares a string-backed record identifier with a random constructor.
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh, unique identifier.
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "-{}"), uuid::Uuid::new_v4()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a journal entry.
    EntryId,
    "entry"
);
record_id!(
    /// Identifier of an assessment record.
    AssessmentId,
    "assessment"
);
record_id!(
    /// Identifier of a risk flag.
    FlagId,
    "risk"
);
record_id!(
    /// Identifier of a message.
    MessageId,
    "message"
);

/// The role a user acts in. The view policy grants capabilities per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Therapist,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Therapist => "therapist",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity a request is made under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub user_id: UserId,
    pub role: Role,
}

impl Viewer {
    pub fn patient(id: impl Into<String>) -> Self {
        Self { user_id: UserId::new(id), role: Role::Patient }
    }

    pub fn therapist(id: impl Into<String>) -> Self {
        Self { user_id: UserId::new(id), role: Role::Therapist }
    }
}

/// A patient and the consent settings that govern what their therapist sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// The therapist this patient shares data with, if any.
    pub connected_therapist: Option<UserId>,
    pub consent: ConsentSettings,
    pub created_at: DateTime<Utc>,
}

/// A therapist and the panel of patients they are connected to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapistProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub license_id: Option<String>,
    pub clinic_name: Option<String>,
    pub patients: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl TherapistProfile {
    /// Return true if `patient` is on this therapist's panel.
    pub fn treats(&self, patient: &UserId) -> bool {
        self.patients.iter().any(|p| p == patient)
    }
}

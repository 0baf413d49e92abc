//! Server-owned records cached by the client.
//!
//! Each entity names the fields the client reads; every other field the
//! server sends is kept in `extra` and written back unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a string-valued enum that keeps unknown wire values.
///
/// Parsing from the wire is exact; [`std::str::FromStr`] (used by the CLI)
/// ignores ASCII case.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this client does not know, kept verbatim
            Other(String),
        }

        impl $name {
            /// Wire representation
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Other(value) => value,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $( $wire => Self::$variant, )+
                    _ => Self::Other(value),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(value) => value,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($wire) {
                        return Ok(Self::$variant);
                    }
                )+
                Ok(Self::Other(s.to_string()))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod attendance;
mod leave;
mod onboarding;
mod task;
mod user;

pub use attendance::{Attendance, AttendanceStatus, AttendanceSummary};
pub use leave::{Leave, LeaveCounts, LeaveStatus};
pub use onboarding::{Candidate, Stage};
pub use task::{Task, TaskCounts, TaskStatus};
pub use user::{Role, User};

/// Server-assigned identifier (`_id` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a raw identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Implements `Entity` for a record whose id lives in its `id` field.
macro_rules! impl_entity {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl staffdesk_core::entity::Entity for $ty {
                type Id = $crate::entities::EntityId;

                fn id(&self) -> &Self::Id {
                    &self.id
                }
            }
        )+
    };
}

impl_entity!(Task, Leave, Attendance, User, Candidate);

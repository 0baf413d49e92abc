//! User accounts and roles.

use super::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

wire_enum! {
    /// Access level of a user
    Role {
        /// Full administration
        Admin => "admin",
        /// Human resources
        Hr => "hr",
        /// Team manager
        Manager => "manager",
        /// Regular employee
        Employee => "employee",
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Employee
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned id
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Login email
    #[serde(default)]
    pub email: String,
    /// Access level
    #[serde(default)]
    pub role: Role,
    /// Department, if assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Whether the user may review other people's requests
    #[must_use]
    pub const fn is_reviewer(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Hr | Role::Manager)
    }
}

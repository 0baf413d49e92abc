//! Candidates in the onboarding pipeline.

use super::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

wire_enum! {
    /// Pipeline stage of a candidate
    Stage {
        /// Application received
        Applied => "Applied",
        /// Being screened
        Screening => "Screening",
        /// Interviewing
        Interview => "Interview",
        /// Offer extended
        Offer => "Offer",
        /// Joined
        Hired => "Hired",
        /// Dropped from the pipeline
        Rejected => "Rejected",
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Applied
    }
}

/// A candidate record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Server-assigned id
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Full name
    #[serde(default)]
    pub name: String,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Position applied for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Pipeline stage
    #[serde(default)]
    pub stage: Stage,
    /// Uploaded documents as described by the server
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Value>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

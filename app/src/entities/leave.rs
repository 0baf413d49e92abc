//! Leave requests.

use super::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

wire_enum! {
    /// Review state of a leave request
    LeaveStatus {
        /// Awaiting review
        Pending => "Pending",
        /// Granted
        Approved => "Approved",
        /// Declined
        Rejected => "Rejected",
    }
}

impl Default for LeaveStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A leave request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leave {
    /// Server-assigned id
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Requesting employee: an id, or the populated user record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<Value>,
    /// Kind of leave (sick, casual...)
    #[serde(default, rename = "leaveType", skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<String>,
    /// First day, as sent by the server
    #[serde(default, rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Last day, as sent by the server
    #[serde(default, rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Reason given by the employee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Review state
    #[serde(default)]
    pub status: LeaveStatus,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tab counts for the leave views.
///
/// `GET /leave/employee` returns these alongside the list; for other lists
/// they are derived with [`LeaveCounts::tally`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveCounts {
    /// Requests awaiting review
    #[serde(rename = "Pending", default)]
    pub pending: u32,
    /// Granted requests
    #[serde(rename = "Approved", default)]
    pub approved: u32,
    /// Declined requests
    #[serde(rename = "Rejected", default)]
    pub rejected: u32,
    /// All requests
    #[serde(default)]
    pub total: u32,
}

impl LeaveCounts {
    /// Count leave requests by status
    #[must_use]
    pub fn tally<'a>(leaves: impl IntoIterator<Item = &'a Leave>) -> Self {
        leaves.into_iter().fold(Self::default(), |mut counts, leave| {
            match leave.status {
                LeaveStatus::Pending => counts.pending += 1,
                LeaveStatus::Approved => counts.approved += 1,
                LeaveStatus::Rejected => counts.rejected += 1,
                LeaveStatus::Other(_) => {},
            }
            counts.total += 1;
            counts
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_counts_use_capitalized_keys() {
        let counts: LeaveCounts =
            serde_json::from_value(json!({"Pending": 2, "Approved": 1, "Rejected": 0, "total": 3})).unwrap();

        assert_eq!(
            counts,
            LeaveCounts {
                pending: 2,
                approved: 1,
                rejected: 0,
                total: 3,
            }
        );
    }

    #[test]
    fn tally_of_nothing_is_all_zero() {
        assert_eq!(LeaveCounts::tally(&Vec::<Leave>::new()), LeaveCounts::default());
    }

    #[test]
    fn tally_matches_statuses() {
        let leaves: Vec<Leave> = serde_json::from_value(json!([
            {"_id": "l1", "status": "Pending"},
            {"_id": "l2", "status": "Approved"},
            {"_id": "l3", "status": "Approved"},
            {"_id": "l4", "status": "Rejected"}
        ]))
        .unwrap();

        let counts = LeaveCounts::tally(&leaves);
        assert_eq!((counts.pending, counts.approved, counts.rejected, counts.total), (1, 2, 1, 4));
    }
}

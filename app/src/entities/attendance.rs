//! Daily attendance records.

use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

wire_enum! {
    /// Attendance outcome for a day
    AttendanceStatus {
        /// Checked in on time
        Present => "Present",
        /// Did not check in
        Absent => "Absent",
        /// Checked in late
        Late => "Late",
        /// Worked part of the day
        HalfDay => "Half Day",
    }
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        Self::Present
    }
}

/// An attendance record for one employee and one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    /// Server-assigned id
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Employee: an id, or the populated user record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<Value>,
    /// Day the record covers, as sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Check-in time
    #[serde(default, rename = "checkIn", skip_serializing_if = "Option::is_none")]
    pub check_in: Option<DateTime<Utc>>,
    /// Check-out time; absent while the day is open
    #[serde(default, rename = "checkOut", skip_serializing_if = "Option::is_none")]
    pub check_out: Option<DateTime<Utc>>,
    /// Outcome
    #[serde(default)]
    pub status: AttendanceStatus,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attendance {
    /// Checked in and not yet checked out
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_none()
    }

    /// Time between check-in and check-out
    #[must_use]
    pub fn worked(&self) -> Option<chrono::Duration> {
        Some(self.check_out? - self.check_in?)
    }
}

/// Summary of a set of attendance records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    /// Days marked present
    pub present: usize,
    /// Days marked absent
    pub absent: usize,
    /// Days marked late
    pub late: usize,
    /// Days marked half day
    pub half_day: usize,
    /// Records still open (checked in, not out)
    pub open: usize,
    /// All records
    pub total: usize,
}

impl AttendanceSummary {
    /// Summarize records
    #[must_use]
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a Attendance>) -> Self {
        records.into_iter().fold(Self::default(), |mut summary, record| {
            match record.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::Late => summary.late += 1,
                AttendanceStatus::HalfDay => summary.half_day += 1,
                AttendanceStatus::Other(_) => {},
            }
            if record.is_open() {
                summary.open += 1;
            }
            summary.total += 1;
            summary
        })
    }
}

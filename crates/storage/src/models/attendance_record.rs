use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Period, RollNumber};

/// Label of the n-th late mark: `L1`, `L2`, ...
pub fn mark_label(sequence: u32) -> String {
    format!("L{}", sequence)
}

/// Tally of late marks for one roll number.
///
/// The same shape is used for the live record of a department and for the
/// month-keyed archive copy kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(value_type = String, example = "12345")]
    pub roll_number: RollNumber,
    pub department: String,
    pub count: u32,
    pub paid_fine: i64,
    pub unpaid_fine: i64,
    /// Mark label (`L1`, `L2`, ...) to the moment the mark was recorded
    pub timestamps: BTreeMap<String, DateTime<Utc>>,
    pub last_marked_date: Option<NaiveDate>,
    /// Period of the first mark, never changed afterwards
    #[schema(value_type = String, example = "3 2025")]
    pub created_at: Period,
    pub paid_at: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl AttendanceRecord {
    /// An empty tally, used when a roll number is marked for the first time
    pub fn empty(
        roll_number: RollNumber,
        department: impl Into<String>,
        created_at: Period,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            roll_number,
            department: department.into(),
            count: 0,
            paid_fine: 0,
            unpaid_fine: 0,
            timestamps: BTreeMap::new(),
            last_marked_date: None,
            created_at,
            paid_at: None,
            last_updated: now,
        }
    }

    pub fn timestamp_of(&self, sequence: u32) -> Option<DateTime<Utc>> {
        self.timestamps.get(&mark_label(sequence)).copied()
    }

    pub fn is_marked_on(&self, date: NaiveDate) -> bool {
        self.last_marked_date == Some(date)
    }
}

/// Identity of the staff member performing an operation.
///
/// Supplied by the authentication layer and trusted as-is; it only decides which
/// department bucket is read and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffContext {
    department: String,
}

impl StaffContext {
    pub fn new(department: impl Into<String>) -> Self {
        Self {
            department: department.into().trim().to_string(),
        }
    }

    pub fn department(&self) -> &str {
        &self.department
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::AttendanceRecord;
use crate::services::late_comers::PendingFines;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LateComerQuery {
    /// Case-insensitive roll number substring
    pub search: Option<String>,
}

/// One student with an outstanding fine
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingFineEntry {
    pub roll_number: String,
    pub department: String,
    pub count: u32,
    pub unpaid_fine: i64,
    pub paid_fine: i64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingFinesResponse {
    pub department: String,
    pub total_pending: i64,
    pub showing: usize,
    pub students: Vec<PendingFineEntry>,
}

impl From<AttendanceRecord> for PendingFineEntry {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            roll_number: record.roll_number.to_string(),
            department: record.department,
            count: record.count,
            unpaid_fine: record.unpaid_fine,
            paid_fine: record.paid_fine,
            last_updated: record.last_updated,
        }
    }
}

impl From<PendingFines> for PendingFinesResponse {
    fn from(pending: PendingFines) -> Self {
        let students: Vec<PendingFineEntry> = pending
            .students
            .into_iter()
            .map(PendingFineEntry::from)
            .collect();

        Self {
            department: pending.department,
            total_pending: pending.total_pending,
            showing: students.len(),
            students,
        }
    }
}

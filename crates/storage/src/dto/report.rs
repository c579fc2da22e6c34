use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::AttendanceRecord;

/// One row of the external student roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct RosterEntry {
    #[serde(rename = "RollNo")]
    #[validate(length(min = 1, max = 50, message = "RollNo is required"))]
    pub roll_no: String,

    #[serde(rename = "Name")]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(rename = "Dept")]
    #[validate(length(min = 1, max = 255, message = "Dept is required"))]
    pub department: String,

    #[serde(rename = "Semister")]
    #[validate(length(min = 1, max = 50, message = "Semister is required"))]
    pub semester: String,
}

/// Request payload for matching a month's records against a roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MatchReportRequest {
    #[validate(length(min = 1, message = "Roster must not be empty"), nested)]
    pub roster: Vec<RosterEntry>,
}

/// An archive record joined with roster identity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportRow {
    pub roll_number: String,
    pub name: String,
    pub department: String,
    pub semester: String,
    /// Whether the roll number was found in the roster
    pub matched: bool,
    pub record: AttendanceRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyReportResponse {
    pub period: String,
    pub total: usize,
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchedReportResponse {
    pub period: String,
    pub matched: usize,
    pub unmatched: usize,
    pub rows: Vec<ReportRow>,
}

impl MatchedReportResponse {
    pub fn new(period: String, rows: Vec<ReportRow>) -> Self {
        let matched = rows.iter().filter(|r| r.matched).count();

        Self {
            period,
            matched,
            unmatched: rows.len() - matched,
            rows,
        }
    }
}

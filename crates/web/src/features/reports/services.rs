use storage::{
    dto::report::{ReportRow, RosterEntry},
    error::Result,
    models::{AttendanceRecord, Period},
    services::report_match,
};

use crate::state::AppState;

/// Archive records of a month across all departments
pub async fn monthly_report(state: &AppState, period: Period) -> Result<Vec<AttendanceRecord>> {
    report_match::monthly_records(state.store(), period).await
}

/// Archive records of a month joined with the supplied roster
pub async fn match_report(
    state: &AppState,
    period: Period,
    roster: &[RosterEntry],
) -> Result<Vec<ReportRow>> {
    let records = report_match::monthly_records(state.store(), period).await?;
    Ok(report_match::match_roster(records, roster))
}

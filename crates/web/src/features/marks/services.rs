use chrono::Utc;
use storage::{
    error::Result,
    models::StaffContext,
    services::{AttendanceRecorder, MarkOutcome},
};

use crate::state::AppState;

/// Record a late mark for the current moment
pub async fn mark_late(
    state: &AppState,
    actor: &StaffContext,
    roll_number: &str,
) -> Result<MarkOutcome> {
    let recorder = AttendanceRecorder::new(state.store(), state.offset());
    recorder
        .record_late_mark(actor, roll_number, Utc::now())
        .await
}

use chrono::Utc;
use storage::{
    dto::payment::PaymentReceipt,
    error::Result,
    models::{AttendanceRecord, StaffContext},
    services::{
        AttendanceRecorder,
        late_comers::{self, PendingFines},
    },
};

use crate::state::AppState;

/// List students of the actor's department with unpaid fines
pub async fn list_pending(
    state: &AppState,
    actor: &StaffContext,
    search: Option<&str>,
) -> Result<PendingFines> {
    late_comers::pending_fines(state.store(), actor, search).await
}

/// Get the live record of a roll number
pub async fn get_record(
    state: &AppState,
    actor: &StaffContext,
    roll_number: &str,
) -> Result<AttendanceRecord> {
    late_comers::get_record(state.store(), actor, roll_number).await
}

/// Settle the outstanding fine of a roll number
pub async fn mark_paid(
    state: &AppState,
    actor: &StaffContext,
    roll_number: &str,
) -> Result<PaymentReceipt> {
    let recorder = AttendanceRecorder::new(state.store(), state.offset());
    recorder
        .reconcile_payment(actor, roll_number, Utc::now())
        .await
}

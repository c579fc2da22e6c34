use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        late_comers::{LateComerQuery, PendingFinesResponse},
        payment::PaymentReceipt,
    },
    models::{AttendanceRecord, StaffContext},
};

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/late-comers",
    params(LateComerQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Students of the department with unpaid fines", body = PendingFinesResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "late-comers"
)]
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(actor): Extension<StaffContext>,
    Query(query): Query<LateComerQuery>,
) -> Result<Response, WebError> {
    let pending = services::list_pending(&state, &actor, query.search.as_deref()).await?;

    Ok(Json(PendingFinesResponse::from(pending)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/late-comers/{roll_number}",
    params(
        ("roll_number" = String, Path, description = "Student roll number")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current record", body = AttendanceRecord),
        (status = 400, description = "Invalid roll number"),
        (status = 404, description = "No record for this roll number")
    ),
    tag = "late-comers"
)]
pub async fn get_record(
    State(state): State<AppState>,
    Extension(actor): Extension<StaffContext>,
    Path(roll_number): Path<String>,
) -> Result<Response, WebError> {
    let record = services::get_record(&state, &actor, &roll_number).await?;

    Ok(Json(record).into_response())
}

#[utoipa::path(
    post,
    path = "/api/late-comers/{roll_number}/payment",
    params(
        ("roll_number" = String, Path, description = "Student roll number")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Fine settled", body = PaymentReceipt),
        (status = 400, description = "Invalid roll number"),
        (status = 404, description = "No outstanding fine"),
        (status = 409, description = "Concurrent update, retry")
    ),
    tag = "late-comers"
)]
pub async fn mark_paid(
    State(state): State<AppState>,
    Extension(actor): Extension<StaffContext>,
    Path(roll_number): Path<String>,
) -> Result<Response, WebError> {
    let receipt = services::mark_paid(&state, &actor, &roll_number).await?;

    Ok(Json(receipt).into_response())
}

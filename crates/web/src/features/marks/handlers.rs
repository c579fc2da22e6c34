use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::marks::{MarkRequest, MarkResponse},
    models::StaffContext,
};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/marks",
    request_body = MarkRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Late mark recorded", body = MarkResponse),
        (status = 400, description = "Invalid roll number"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already marked today, or a concurrent update; retry the latter")
    ),
    tag = "marks"
)]
pub async fn mark_late(
    State(state): State<AppState>,
    Extension(actor): Extension<StaffContext>,
    Json(req): Json<MarkRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let outcome = services::mark_late(&state, &actor, &req.roll_number).await?;

    Ok((StatusCode::CREATED, Json(MarkResponse::from(outcome))).into_response())
}

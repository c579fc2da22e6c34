use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::report::{MatchReportRequest, MatchedReportResponse, MonthlyReportResponse},
    models::Period,
};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

fn parse_period(year: i32, month: u32) -> Result<Period, WebError> {
    Period::new(year, month).map_err(|_| {
        WebError::BadRequest(format!("month must be between 1 and 12, got {}", month))
    })
}

#[utoipa::path(
    get,
    path = "/api/reports/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Report year"),
        ("month" = u32, Path, description = "Report month, 1-12")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Archive records of the month", body = MonthlyReportResponse),
        (status = 400, description = "Invalid month")
    ),
    tag = "reports"
)]
pub async fn monthly_report(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Response, WebError> {
    let period = parse_period(year, month)?;

    let records = services::monthly_report(&state, period).await?;

    Ok(Json(MonthlyReportResponse {
        period: period.label(),
        total: records.len(),
        records,
    })
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/reports/{year}/{month}/match",
    params(
        ("year" = i32, Path, description = "Report year"),
        ("month" = u32, Path, description = "Report month, 1-12")
    ),
    request_body = MatchReportRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Archive records joined with the roster", body = MatchedReportResponse),
        (status = 400, description = "Invalid month or roster")
    ),
    tag = "reports"
)]
pub async fn match_report(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Json(payload): Json<MatchReportRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;
    let period = parse_period(year, month)?;

    let rows = services::match_report(&state, period, &payload.roster).await?;

    tracing::info!(
        period = %period,
        rows = rows.len(),
        "Matched monthly report against roster"
    );

    Ok(Json(MatchedReportResponse::new(period.label(), rows)).into_response())
}

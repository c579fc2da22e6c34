use std::time::Duration;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::WebError;
use crate::features::{late_comers, marks, reports};
use crate::middleware::auth::ApiKeys;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        marks::handlers::mark_late,
        late_comers::handlers::list_pending,
        late_comers::handlers::get_record,
        late_comers::handlers::mark_paid,
        reports::handlers::monthly_report,
        reports::handlers::match_report,
    ),
    components(
        schemas(
            storage::dto::marks::MarkRequest,
            storage::dto::marks::MarkResponse,
            storage::dto::late_comers::PendingFineEntry,
            storage::dto::late_comers::PendingFinesResponse,
            storage::dto::payment::PaymentReceipt,
            storage::dto::report::RosterEntry,
            storage::dto::report::MatchReportRequest,
            storage::dto::report::ReportRow,
            storage::dto::report::MonthlyReportResponse,
            storage::dto::report::MatchedReportResponse,
            storage::models::AttendanceRecord,
        )
    ),
    tags(
        (name = "marks", description = "Recording late arrivals"),
        (name = "late-comers", description = "Department records and fine payments"),
        (name = "reports", description = "Monthly archive reports"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> WebError {
    WebError::NotFound
}

pub fn router(state: AppState, api_keys: ApiKeys) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health))
        .nest("/api/marks", marks::routes::routes(api_keys.clone()))
        .nest(
            "/api/late-comers",
            late_comers::routes::routes(api_keys.clone()),
        )
        .nest("/api/reports", reports::routes::routes(api_keys))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

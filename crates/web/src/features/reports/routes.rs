use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{match_report, monthly_report};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/:year/:month", get(monthly_report))
        .route("/:year/:month/match", post(match_report))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}

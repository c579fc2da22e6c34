use axum::{Router, middleware, routing::post};

use super::handlers::mark_late;
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/", post(mark_late))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}

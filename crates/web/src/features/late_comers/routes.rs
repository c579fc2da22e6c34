use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{get_record, list_pending, mark_paid};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/", get(list_pending))
        .route("/:roll_number", get(get_record))
        .route("/:roll_number/payment", post(mark_paid))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}

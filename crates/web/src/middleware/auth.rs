use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use storage::models::StaffContext;

use crate::error::WebError;

/// Resolves a bearer token to the staff context of its department and puts it
/// into the request extensions.
pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(WebError::Unauthorized)?;

    let Some(department) = api_keys.department_for(token) else {
        tracing::warn!("Invalid API key attempt");
        return Err(WebError::Unauthorized);
    };

    request
        .extensions_mut()
        .insert(StaffContext::new(department));

    Ok(next.run(request).await)
}

/// API keys, each bound to one department
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: Arc<HashMap<String, String>>,
}

impl ApiKeys {
    /// Parses `department:key` pairs separated by commas
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|pair| match pair.split_once(':') {
                Some((department, key))
                    if !department.trim().is_empty() && !key.trim().is_empty() =>
                {
                    Some((key.trim().to_string(), department.trim().to_string()))
                }
                _ => {
                    tracing::warn!("Ignoring API key entry without a department");
                    None
                }
            })
            .collect();

        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn department_for(&self, key: &str) -> Option<&str> {
        self.keys.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

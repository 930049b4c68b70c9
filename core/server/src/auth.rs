//! Opaque bearer-token request guard.
//!
//! Stands in for the external authentication collaborator: it answers
//! "is this an authenticated principal" and nothing else. Credential
//! management lives outside this system.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::debug;

use crate::state::AppState;

/// Admit the request when no token is configured, or when the bearer token
/// matches; reject with 401 otherwise.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(request).await;
    };

    match bearer_token(request.headers()) {
        Some(token) if token == expected => next.run(request).await,
        _ => {
            debug!(path = %request.uri().path(), "Request rejected by auth guard");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "msg": "Authorization denied" })),
            )
                .into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer sekrit"),
        );
        assert_eq!(bearer_token(&headers), Some("sekrit"));
    }

    #[test]
    fn test_missing_or_malformed_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}

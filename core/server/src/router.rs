//! Route table.

use axum::extract::DefaultBodyLimit;
use axum::response::Json;
use axum::routing::{delete, get};
use axum::{middleware, Router};
use serde_json::json;

use crate::state::AppState;
use crate::{auth, backup, members};

/// Request-body ceiling: the 10 MB upload cap plus multipart overhead.
/// Anything inside the ceiling but over the cap is rejected by the vault
/// with a client-visible validation error.
const UPLOAD_BODY_LIMIT: usize = 12 * 1024 * 1024;

/// Build the axum router with all docuvault endpoints.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/members", get(members::list).post(members::create))
        .route(
            "/members/{id}",
            get(members::get_one)
                .put(members::update)
                .delete(members::delete),
        )
        .route(
            "/members/{id}/documents",
            get(members::list_documents).post(members::upload_document),
        )
        .route("/members/documents/{id}", delete(members::delete_document))
        .route("/members/{id}/download-all", get(members::download_all))
        .route("/members/{id}/pdf", get(members::profile_report))
        .route("/backup/database", get(backup::database))
        .route("/backup/database-file", get(backup::database_file))
        .route("/backup/files", get(backup::files))
        .route("/backup/full", get(backup::full))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
}

/// Unauthenticated liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "name": "docuvault",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

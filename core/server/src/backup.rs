//! Backup and export handlers.

use axum::body::Body;
use axum::extract::State;
use axum::response::Response;

use docuvault_common::Error;

use crate::download::{attachment, now_ms};
use crate::error::ApiResult;
use crate::state::AppState;

/// All records as one JSON document, admin secrets excluded.
pub async fn database(State(state): State<AppState>) -> ApiResult<Response> {
    let snapshot = state.exports.raw_snapshot()?;
    let bytes =
        serde_json::to_vec(&snapshot).map_err(|e| Error::Serialization(e.to_string()))?;

    let filename = format!("database-backup-{}.json", now_ms());
    Ok(attachment("application/json", filename, Body::from(bytes)))
}

/// The storage backend file, verbatim.
pub async fn database_file(State(state): State<AppState>) -> ApiResult<Response> {
    let stream = state.exports.storage_file().await?;

    let filename = format!("database-backup-{}.sqlite", now_ms());
    Ok(attachment(
        "application/octet-stream",
        filename,
        Body::from_stream(stream),
    ))
}

/// Compressed archive of every vault file.
pub async fn files(State(state): State<AppState>) -> ApiResult<Response> {
    let stream = state.exports.files_archive().await?;

    let filename = format!("files-backup-{}.zip", now_ms());
    Ok(attachment("application/zip", filename, Body::from_stream(stream)))
}

/// Files archive plus the storage backend file.
pub async fn full(State(state): State<AppState>) -> ApiResult<Response> {
    let stream = state.exports.full_bundle().await?;

    let filename = format!("full-backup-{}.zip", now_ms());
    Ok(attachment("application/zip", filename, Body::from_stream(stream)))
}

//! Member and document handlers.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::response::{Json, Response};
use serde_json::{json, Value};
use tracing::warn;

use docuvault_common::{DocumentId, Error, MemberId};
use docuvault_records::{DocumentRecord, MemberAttrs, MemberRecord};

use crate::download::{attachment, file_label, now_ms};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<MemberRecord>>> {
    Ok(Json(state.registry.list()?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(attrs): Json<MemberAttrs>,
) -> ApiResult<Json<MemberRecord>> {
    Ok(Json(state.registry.create(attrs)?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MemberRecord>> {
    Ok(Json(state.registry.get(MemberId(id))?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(attrs): Json<MemberAttrs>,
) -> ApiResult<Json<MemberRecord>> {
    Ok(Json(state.registry.update(MemberId(id), attrs)?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let report = state
        .registry
        .delete(MemberId(id), &state.documents)
        .await?;

    if !report.failed_files.is_empty() {
        warn!(
            member = id,
            failed = ?report.failed_files,
            "Some files could not be deleted during cascade"
        );
    }
    Ok(Json(json!({ "msg": "Member removed" })))
}

/// Multipart upload: file field `document`, optional `title` and `docType`.
///
/// The member is checked first, the file is written second, and the record
/// is created last, so a rejected request never leaves a document row
/// pointing at nothing.
pub async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<DocumentRecord>> {
    let member_id = MemberId(id);
    state.registry.get(member_id)?;

    let mut title = None;
    let mut doc_type = None;
    let mut upload: Option<(Vec<u8>, String, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "document" => {
                let original = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_err)?;
                upload = Some((data.to_vec(), original, content_type));
            }
            "title" => title = Some(field.text().await.map_err(multipart_err)?),
            "docType" => doc_type = Some(field.text().await.map_err(multipart_err)?),
            _ => {}
        }
    }

    let (data, original, content_type) =
        upload.ok_or_else(|| Error::Validation("No file uploaded".to_string()))?;

    let stored = state.vault.store(&data, &original, &content_type).await?;
    let record = state
        .documents
        .create(member_id, title, doc_type, stored)?;

    Ok(Json(record))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<DocumentRecord>>> {
    Ok(Json(state.documents.list_for_member(MemberId(id))?))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let removal = state.documents.delete(DocumentId(id)).await?;

    if !removal.file_removed {
        warn!(document = id, file = %removal.record.file_path,
            "Document removed but its file could not be deleted");
    }
    Ok(Json(json!({ "msg": "Document removed" })))
}

/// Per-member bundle of every owned document, named by doc type.
pub async fn download_all(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let member_id = MemberId(id);
    let member = state.registry.get(member_id)?;
    let stream = state.exports.member_bundle(member_id).await?;

    let filename = format!(
        "{}-documents-{}.zip",
        file_label(member.name.as_deref()),
        now_ms()
    );
    Ok(attachment("application/zip", filename, Body::from_stream(stream)))
}

/// Streamed profile report.
pub async fn profile_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let member_id = MemberId(id);
    let member = state.registry.get(member_id)?;

    let reports = state.reports.clone();
    let stream = tokio::task::spawn_blocking(move || reports.stream(member_id))
        .await
        .map_err(|e| Error::Internal(format!("Report task failed: {e}")))??;

    let filename = format!(
        "{}-profile-{}.pdf",
        file_label(member.name.as_deref()),
        now_ms()
    );
    Ok(attachment("application/pdf", filename, Body::from_stream(stream)))
}

fn multipart_err(e: axum::extract::multipart::MultipartError) -> Error {
    Error::Validation(format!("Invalid upload request: {e}"))
}

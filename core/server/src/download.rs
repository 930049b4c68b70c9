//! Helpers for attachment (download) responses.

use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

/// Build a download response with content type and attachment filename.
pub(crate) fn attachment(content_type: &'static str, filename: String, body: Body) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename={filename}"))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// Millisecond timestamp used in download filenames (cosmetic only).
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Reduce a member name to a safe ASCII filename label.
pub(crate) fn file_label(name: Option<&str>) -> String {
    let label: String = name
        .unwrap_or("member")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if label.is_empty() {
        "member".to_string()
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_label_replaces_whitespace() {
        assert_eq!(file_label(Some("Asha Rana")), "Asha_Rana");
        assert_eq!(file_label(Some("  spaced   out ")), "spaced_out");
    }

    #[test]
    fn test_file_label_falls_back() {
        assert_eq!(file_label(None), "member");
        assert_eq!(file_label(Some("???")), "member");
    }
}

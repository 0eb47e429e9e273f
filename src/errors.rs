use crate::models::EntryId;
use reqwest::StatusCode;
use thiserror::Error;

/// Failure taxonomy for remote store calls. Timeouts are surfaced
/// separately from other transport failures so a hung request never
/// masquerades as a connection problem.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} returned {status}: {detail}")]
    Http {
        url: String,
        status: StatusCode,
        detail: String,
    },
    #[error("invalid response body from {url}: {source}")]
    Format {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl StoreError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            StoreError::Timeout { url }
        } else if source.is_decode() {
            StoreError::Format { url, source }
        } else {
            StoreError::Transport { url, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Http { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// Errors from board mutations: either a remote failure (after the
/// optimistic patch has been rolled back) or a local addressing problem
/// that never reached the wire.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("no board entry with id {0:?}")]
    UnknownEntry(EntryId),
    #[error("an update cannot move an entry between the task and daily collections")]
    KindMismatch,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reduces an error response body to one display string. The store
/// reports failures in a JSON `detail` field that may be a bare string,
/// a list of validation entries, or a nested object; all three shapes
/// flatten to their string leaves joined with commas.
pub(crate) fn error_detail(body: &str, status: StatusCode) -> String {
    let flattened = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => flatten_detail(value.get("detail").unwrap_or(&value)),
        Err(_) => body.trim().to_string(),
    };
    if flattened.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        flattened
    }
}

fn flatten_detail(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Array(items) => join_parts(items.iter().map(flatten_detail)),
        serde_json::Value::Object(map) => join_parts(map.values().map(flatten_detail)),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn join_parts(parts: impl Iterator<Item = String>) -> String {
    parts
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_passes_through() {
        let body = r#"{"detail":"Member name already exists"}"#;
        assert_eq!(
            error_detail(body, StatusCode::BAD_REQUEST),
            "Member name already exists"
        );
    }

    #[test]
    fn validation_list_is_flattened() {
        let body = r#"{"detail":[{"loc":["body","taskname"],"msg":"field required","type":"value_error.missing"}]}"#;
        let detail = error_detail(body, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(detail.contains("taskname"), "{detail}");
        assert!(detail.contains("field required"), "{detail}");
    }

    #[test]
    fn nested_object_detail_is_flattened() {
        let body = r#"{"detail":{"username":"already taken","email":{"msg":"invalid"}}}"#;
        let detail = error_detail(body, StatusCode::BAD_REQUEST);
        assert!(detail.contains("already taken"), "{detail}");
        assert!(detail.contains("invalid"), "{detail}");
    }

    #[test]
    fn non_json_body_falls_back_to_raw_text() {
        assert_eq!(
            error_detail("  gateway exploded  ", StatusCode::BAD_GATEWAY),
            "gateway exploded"
        );
    }

    #[test]
    fn empty_body_falls_back_to_status_reason() {
        assert_eq!(error_detail("", StatusCode::NOT_FOUND), "Not Found");
    }
}

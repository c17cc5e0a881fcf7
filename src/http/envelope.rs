//! Canonical response envelope written for every request.
//!
//! ```text
//! {
//!   "message":    { "title", "body" },                 localized, user-facing
//!   "metadata":   { "path", "statusCode", "status",
//!                   "message", "error"? },             machine-facing
//!   "data"?:      <already-encoded JSON>,
//!   "pagination"?: { ... }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Top-level response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub message: Message,
    #[serde(rename = "metadata")]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Localized text shown to end users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub path: String,
    pub status_code: u16,
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MetaError>,
}

/// Diagnostic error detail for machine consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaError {
    pub code: u32,
    pub message: String,
}

/// Page descriptor for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub current_elements: i64,
    pub total_pages: i64,
    pub total_elements: i64,
    pub sort_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_end: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names() {
        let envelope = ResponseEnvelope {
            message: Message {
                title: "Success".into(),
                body: "ok".into(),
            },
            meta: Meta {
                path: "/ping".into(),
                status_code: 200,
                status: "OK".into(),
                message: "GET /ping [200] OK".into(),
                error: None,
            },
            data: None,
            pagination: Some(Pagination {
                current_page: 1,
                sort_by: vec!["created_at".into()],
                cursor_end: Some("abc".into()),
                ..Pagination::default()
            }),
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["metadata"]["statusCode"], 200);
        assert!(value["metadata"].get("error").is_none());
        assert!(value.get("data").is_none());
        assert_eq!(value["pagination"]["currentPage"], 1);
        assert_eq!(value["pagination"]["sortBy"][0], "created_at");
        assert_eq!(value["pagination"]["cursorEnd"], "abc");
        assert!(value["pagination"].get("cursorStart").is_none());
    }
}

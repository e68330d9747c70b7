#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the surveillance map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the record types to allow independent evolution of the API
//! contract.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Records in the current snapshot.
    pub records: usize,
    /// Whether district boundaries were loaded at startup.
    pub boundaries_loaded: bool,
}

/// `POST /api/chat` request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question. Missing and empty are treated alike.
    #[serde(default)]
    pub message: String,
}

/// `POST /api/chat` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated answer or summary fallback.
    pub response: String,
}

/// Outcome status of a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    /// The source was read successfully.
    Success,
    /// The refresh failed or was rejected.
    Error,
}

/// `/api/refresh-data` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// Success or error.
    pub status: RefreshStatus,
    /// Rows in the published snapshot, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    /// What went wrong, on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RefreshResponse {
    /// A successful refresh leaving `rows` rows published.
    #[must_use]
    pub const fn success(rows: usize) -> Self {
        Self {
            status: RefreshStatus::Success,
            rows: Some(rows),
            message: None,
        }
    }

    /// A failed refresh.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: RefreshStatus::Error,
            rows: None,
            message: Some(message.into()),
        }
    }
}

/// Generic error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_success_shape() {
        let json = serde_json::to_value(RefreshResponse::success(42)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "rows": 42}));
    }

    #[test]
    fn refresh_error_shape() {
        let json = serde_json::to_value(RefreshResponse::error("boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "error", "message": "boom"})
        );
    }

    #[test]
    fn chat_message_defaults_to_empty() {
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(request.message.is_empty());
    }

    #[test]
    fn health_is_camel_case() {
        let json = serde_json::to_value(ApiHealth {
            healthy: true,
            version: "0.1.0".to_string(),
            records: 3,
            boundaries_loaded: false,
        })
        .unwrap();
        assert_eq!(json["boundariesLoaded"], false);
        assert_eq!(json["records"], 3);
    }
}

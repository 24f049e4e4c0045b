//! Uniform response envelope.
//!
//! Every endpoint in the workspace responds with the same JSON shape:
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Events retrieved successfully",
//!   "data": { "...": "..." }
//! }
//! ```
//!
//! Failures carry `success: false` and an `error` string instead of `data`.

use serde::Serialize;
use utoipa::ToSchema;

/// Standard response envelope for all API endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was handled successfully
    pub success: bool,
    /// Human-readable outcome message
    pub message: String,
    /// Response payload, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error detail, present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Failed response with a human-readable message and an error detail.
    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_shape() {
        let response = ApiResponse::ok("Done", json!({"count": 3}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "message": "Done", "data": {"count": 3}})
        );
    }

    #[test]
    fn test_error_envelope_shape() {
        let response = ApiResponse::<serde_json::Value>::error("Invalid page", "page must be >= 1");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "message": "Invalid page", "error": "page must be >= 1"})
        );
    }

    #[test]
    fn test_data_omitted_on_error() {
        let response = ApiResponse::<serde_json::Value>::error("nope", "nope");
        let text = serde_json::to_string(&response).unwrap();
        assert!(!text.contains("\"data\""));
    }
}

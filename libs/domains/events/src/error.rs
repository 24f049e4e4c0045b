//! Event domain error types

use axum_helpers::AppError;
use std::fmt;
use std::time::Duration;

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Event domain errors
#[derive(Debug)]
pub enum EventError {
    /// Invalid query parameters or request payload
    Validation { message: String },

    /// MongoDB error
    Database {
        message: String,
        source: Option<mongodb::error::Error>,
    },

    /// A store call exceeded the configured query timeout
    Timeout { limit: Duration },

    /// Serialization error
    Serialization { message: String },

    /// Internal error
    Internal { message: String },
}

impl EventError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { message } => write!(f, "Validation error: {}", message),
            Self::Database { message, .. } => write!(f, "Database error: {}", message),
            Self::Timeout { limit } => write!(f, "Query timed out after {:?}", limit),
            Self::Serialization { message } => write!(f, "Serialization error: {}", message),
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for EventError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database {
                source: Some(e), ..
            } => Some(e),
            _ => None,
        }
    }
}

impl From<mongodb::error::Error> for EventError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<mongodb::bson::ser::Error> for EventError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Self::Serialization {
            message: format!("BSON serialization error: {}", err),
        }
    }
}

impl From<mongodb::bson::de::Error> for EventError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        Self::Serialization {
            message: format!("BSON deserialization error: {}", err),
        }
    }
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for EventError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation {
            message: err.to_string(),
        }
    }
}

// Convert to axum_helpers::AppError for HTTP responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation { message } => AppError::BadRequest(message),
            EventError::Database { message, .. } => AppError::InternalServerError(message),
            EventError::Timeout { limit } => {
                AppError::ServiceUnavailable(format!("Query timed out after {:?}", limit))
            }
            EventError::Serialization { message } => AppError::InternalServerError(message),
            EventError::Internal { message } => AppError::InternalServerError(message),
        }
    }
}

impl axum::response::IntoResponse for EventError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = EventError::validation("Invalid sort field").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_timeout_maps_to_service_unavailable() {
        let response = EventError::Timeout {
            limit: Duration::from_secs(30),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_database_maps_to_internal() {
        let response = EventError::Database {
            message: "boom".into(),
            source: None,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

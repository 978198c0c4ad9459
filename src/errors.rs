use crate::behavior::MetaError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<MetaError> for AppError {
    fn from(err: MetaError) -> Self {
        let status = match &err {
            MetaError::Authorization { .. } => StatusCode::FORBIDDEN,
            MetaError::NotFound(_) => StatusCode::NOT_FOUND,
            MetaError::MissingIdentity { .. } => StatusCode::BAD_REQUEST,
            MetaError::Configuration(_)
            | MetaError::Inconsistent { .. }
            | MetaError::Database(_) => {
                tracing::error!(error = %err, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError::new(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Operation;

    #[test]
    fn test_status_mapping() {
        let denied = AppError::from(MetaError::Authorization {
            operation: Operation::Update,
            model: "Page".into(),
            id: 1,
            role: "Editor".into(),
        });
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let missing = AppError::from(MetaError::NotFound("Page #1".into()));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let setup = AppError::from(MetaError::Configuration("x".into()));
        assert_eq!(setup.status, StatusCode::INTERNAL_SERVER_ERROR);

        let gone = AppError::from(MetaError::Database(sqlx::Error::RowNotFound));
        assert_eq!(gone.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::bad_request("bad").status, StatusCode::BAD_REQUEST);
    }
}

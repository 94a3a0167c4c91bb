//! Error type returned by HTTP handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lookout_db::DatabaseError;
use lookout_engine::EngineError;
use serde_json::json;

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler error rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status to answer with
    pub status: StatusCode,
    /// Machine-readable error code, logged but not sent
    pub code: &'static str,
    /// User-facing message
    pub message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 400 with a user-facing message.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// 404 with a user-facing message.
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    /// 500; the message is logged, the client sees a generic one.
    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(code = self.code, error = %self.message, "request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(code = self.code, error = %self.message, "request rejected");
            self.message
        };

        (self.status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        Self::internal("DATABASE_ERROR", format!("Database error: {err}"))
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Store(err) => err.into(),
            other => Self::internal("ENGINE_ERROR", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_client_error_carries_message() {
        let response = ApiError::bad_request("EMAIL_REQUIRED", "Email is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Email is required"})
        );
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let err: ApiError = DatabaseError::Decode("bad row".to_string()).into();
        assert_eq!(err.code, "DATABASE_ERROR");
        assert!(err.message.contains("bad row"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Internal server error"})
        );
    }

    #[test]
    fn test_engine_store_error_maps_to_database_error() {
        let err: ApiError = EngineError::Store(DatabaseError::NotFound {
            job_id: "x".to_string(),
        })
        .into();
        assert_eq!(err.code, "DATABASE_ERROR");
    }
}

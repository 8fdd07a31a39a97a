#[cfg(feature = "server")]
use crate::error::AppError;
#[cfg(feature = "server")]
use crate::scripts::runner::ScriptKind;
#[cfg(feature = "server")]
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
#[cfg(feature = "server")]
use axum::http::StatusCode;
#[cfg(feature = "server")]
use axum::response::{IntoResponse, Response};

/// API-specific error wrapper that converts AppError into HTTP responses.
#[cfg(feature = "server")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::UnknownScript(name) => {
                tracing::debug!("Rejected unknown script '{}'", name);
                let body = serde_json::json!({
                    "success": false,
                    "error": "Script not found",
                    "available_scripts": ScriptKind::ALL
                        .iter()
                        .map(|kind| kind.as_str())
                        .collect::<Vec<_>>(),
                });
                return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
            }
            AppError::RateLimited { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Rate limit exceeded");
                let body = serde_json::json!({
                    "error": "Rate limit exceeded",
                    "message": format!("Please try again in {retry_after_secs} seconds"),
                });
                return (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Retrieval(msg) => {
                tracing::error!("Article retrieval failed: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The knowledge base is currently unavailable. Please try again later."
                        .to_string(),
                )
            }
            AppError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Storage(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage error: {}", msg),
            ),
            AppError::Config(msg) | AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(feature = "server")]
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[cfg(feature = "server")]
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("Invalid query parameters: {}", rejection.body_text()))
    }
}

#[cfg(feature = "server")]
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;

    async fn body_of(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let (status, body) = body_of(AppError::RateLimited {
            retry_after_secs: 42,
        })
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Rate limit exceeded");
        assert_eq!(body["message"], "Please try again in 42 seconds");
    }

    #[tokio::test]
    async fn test_validation_response() {
        let (status, body) = body_of(AppError::Validation("Missing required fields: rating".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Missing required fields: rating"}));
    }
}

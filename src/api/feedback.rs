use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Request body of `POST /api/submit-feedback`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: String,
    pub article_id: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
    pub feedback_id: String,
}

/// Validate and record user feedback.
///
/// Feedback is written to the log only.
pub fn process_feedback(
    request: FeedbackRequest,
    user_agent: Option<&str>,
) -> Result<FeedbackResponse, AppError> {
    let rating = request
        .rating
        .ok_or_else(|| AppError::Validation("Missing required fields: rating".into()))?;

    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }

    let feedback_id = uuid::Uuid::new_v4().to_string();

    tracing::info!(
        feedback_id = %feedback_id,
        rating,
        article_id = ?request.article_id,
        comment = %request.comment,
        user_agent = user_agent.unwrap_or_default(),
        "Feedback received"
    );

    Ok(FeedbackResponse {
        success: true,
        message: "Thank you for your feedback!".to_string(),
        feedback_id,
    })
}

/// Axum handler for `POST /api/submit-feedback`.
#[cfg(feature = "server")]
pub async fn submit_feedback_handler(
    headers: axum::http::HeaderMap,
    request: Result<axum::Json<FeedbackRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<axum::Json<FeedbackResponse>, AppError> {
    let axum::Json(request) = request?;
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    Ok(axum::Json(process_feedback(request, user_agent)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_accepted() {
        let request = FeedbackRequest {
            rating: Some(5),
            comment: "Fixed my VPN".to_string(),
            article_id: Some(3),
        };
        let response = process_feedback(request, Some("curl/8.0")).unwrap();
        assert!(response.success);
        assert!(uuid::Uuid::parse_str(&response.feedback_id).is_ok());
    }

    #[test]
    fn test_feedback_requires_rating() {
        match process_feedback(FeedbackRequest::default(), None) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("rating")),
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_feedback_rating_range() {
        for rating in [0, 6, 255] {
            let request = FeedbackRequest {
                rating: Some(rating),
                ..Default::default()
            };
            assert!(matches!(
                process_feedback(request, None),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_feedback_request_defaults() {
        let request: FeedbackRequest = serde_json::from_str(r#"{"rating": 4}"#).unwrap();
        assert_eq!(request.rating, Some(4));
        assert!(request.comment.is_empty());
        assert!(request.article_id.is_none());
    }
}

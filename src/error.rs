use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized access")]
    Unauthorized,

    /// Assistant features are not enabled for the church or user.
    #[error("AI assistant is available on the premium plan")]
    PremiumRequired,

    /// The caller exhausted today's AI execution allowance.
    #[error("Daily AI assistant limit reached")]
    LimitReached,

    /// The upstream AI gateway throttled us.
    #[error("Too many AI requests, try again in a few minutes")]
    UpstreamRateLimited,

    /// The upstream AI gateway refused for billing reasons.
    #[error("AI credits exhausted")]
    UpstreamPaymentRequired,

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),
}

impl AppError {
    /// Machine-readable code for the AI endpoints' wire contract, where the
    /// caller branches on the code rather than the display text.
    fn ai_error_code(&self) -> Option<&'static str> {
        match self {
            AppError::PremiumRequired => Some("premium_required"),
            AppError::LimitReached => Some("limit_reached"),
            AppError::UpstreamRateLimited => Some("rate_limit"),
            AppError::UpstreamPaymentRequired => Some("payment_required"),
            _ => None,
        }
    }

    pub fn internal_server_error_message(message: impl Into<String>) -> Self {
        AppError::InternalServerError(Some(message.into()))
    }

    pub fn internal_server_error() -> Self {
        AppError::InternalServerError(None)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PremiumRequired => StatusCode::FORBIDDEN,
            AppError::LimitReached => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamPaymentRequired => StatusCode::PAYMENT_REQUIRED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        log::error!(
            "Request failed with status {}: {}",
            status_code,
            error_message
        );

        // AI endpoints speak {"error": code, "message": text} so clients can
        // branch on the code; everything else uses the standard envelope.
        if let Some(code) = self.ai_error_code() {
            return HttpResponse::build(status_code).json(serde_json::json!({
                "error": code,
                "message": error_message,
            }));
        }

        let response_body = ApiResponse::<()>::error(&error_message);

        HttpResponse::build(status_code).json(response_body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::DatabaseError(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        log::error!("Anyhow error: {}", error);

        // Check if this is a sqlx::Error and handle it appropriately
        if error.is::<sqlx::Error>() {
            match error.downcast::<sqlx::Error>() {
                Ok(sqlx_err) => return AppError::DatabaseError(sqlx_err),
                Err(original_error) => {
                    return AppError::InternalServerError(Some(original_error.to_string()));
                }
            }
        }

        AppError::InternalServerError(Some(error.to_string()))
    }
}

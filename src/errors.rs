use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Order not found")]
    OrderNotFound,

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Store unavailable, please retry")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidPincodeFormat
            | DomainError::EmptyCart
            | DomainError::InvalidDeliveryAddress
            | DomainError::InvalidInput(_) => AppError::Validation(e.to_string()),
            DomainError::UnknownOrder => AppError::OrderNotFound,
            DomainError::NotFound => AppError::NotFound,
            DomainError::InvalidTransition { .. } | DomainError::Conflict(_) => {
                AppError::Conflict(e.to_string())
            }
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Store(msg) => AppError::Unavailable(msg),
            DomainError::DuplicateOrderId => AppError::Internal(e.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::OrderNotFound | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Bad credentials on login.
    #[error("Auth error: {0}")]
    AuthError(String),

    /// No usable session token on a protected route.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid API key.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Too many requests")]
    RateLimited,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::AuthError(_) => (StatusCode::BAD_REQUEST, "AUTH_ERROR"),
            AppError::Unauthorized(_) | AppError::JwtError(_) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::PermissionDenied => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            AppError::ExternalApiError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Message shown to the client. Business-rule messages pass through
    /// verbatim, infrastructure failures are replaced by a generic text.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg) => msg.clone(),
            AppError::PermissionDenied => "Permission denied".to_string(),
            AppError::RateLimited => "Too many requests, try again later".to_string(),
            AppError::ExternalApiError(_) => "Failed to reach an upstream service".to_string(),
            AppError::JwtError(_) => "Invalid or expired token".to_string(),
            AppError::DatabaseError(_) => "Database error".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

/// True when the error is a unique or exclusion constraint hit.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains("UNIQUE constraint failed")
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code) = self.status_and_code();
        if status_code.is_server_error() {
            log::error!("{error_code}: {self}");
        } else {
            log::warn!("{error_code}: {self}");
        }

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": self.public_message()
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::PermissionDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ExternalApiError("sms down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_messages_do_not_leak_internals() {
        let err = AppError::DatabaseError(DbErr::Custom("relation users missing".into()));
        assert_eq!(err.public_message(), "Database error");

        let err = AppError::ExternalApiError("gateway said 502 at 10.0.0.3".into());
        assert!(!err.public_message().contains("10.0.0.3"));

        let err = AppError::ValidationError("Phone number is invalid".into());
        assert_eq!(err.public_message(), "Phone number is invalid");
    }

    #[test]
    fn test_jwt_errors_are_normalized() {
        let jwt_err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidSignature,
        );
        let err = AppError::from(jwt_err);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.public_message(), "Invalid or expired token");
    }
}

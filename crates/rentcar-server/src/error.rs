use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use rentcar_core::error::AppError;
use rentcar_core::token::TokenError;
use rentcar_core::validation::FieldErrors;

use crate::envelope::Envelope;

pub const VALIDATION_FAILED: &str = "Validation Failed";
pub const INTERNAL_ERROR: &str = "Internal Server Error";
pub const TOKEN_PARSE_FAILURE: &str = "An error occurred while parsing the token";
pub const FORBIDDEN: &str = "You are not authorized to access this endpoint";

/// An error rendered as a failure envelope.
///
/// Handlers return `Result<Envelope<T>, ApiError>` and propagate with `?`;
/// domain errors convert through `From<AppError>` and `From<TokenError>`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    data: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// 400 carrying field-level messages under `data`.
    pub fn invalid(message: impl Into<String>, errors: FieldErrors) -> Self {
        let data = serde_json::to_value(errors).unwrap_or(Value::Null);
        Self::new(StatusCode::BAD_REQUEST, message).with_data(data)
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self::invalid(VALIDATION_FAILED, errors)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, FORBIDDEN)
    }

    /// 500 with a caller-chosen message. The cause is logged, never sent.
    pub fn internal(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let message = message.into();
        tracing::error!(error = %cause, "{message}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(errors) => Self::validation(errors),
            AppError::NotFound(what) => Self::not_found(what),
            AppError::Conflict(what) => Self::bad_request(what),
            other => Self::internal(INTERNAL_ERROR, other),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid | TokenError::Malformed => {
                tracing::warn!(reason = %err, "Rejected bearer token");
                Self::unauthorized(format!("Unauthorized: {err}"))
            }
            TokenError::Encoding(_) | TokenError::Denylist(_) => {
                Self::internal(TOKEN_PARSE_FAILURE, err)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Envelope::new(self.status, self.message, self.data).into_response()
    }
}

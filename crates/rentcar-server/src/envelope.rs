//! The uniform response wrapper shared by every API endpoint.
//!
//! ```json
//! { "status": { "code": 200, "is_success": true }, "message": "Success", "data": ... }
//! ```
//!
//! The HTTP status always mirrors `status.code`. A `204 No Content` envelope
//! is sent as a bare status with an empty body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct EnvelopeStatus {
    pub code: u16,
    pub is_success: bool,
}

impl From<StatusCode> for EnvelopeStatus {
    fn from(status: StatusCode) -> Self {
        Self {
            code: status.as_u16(),
            is_success: status.is_success(),
        }
    }
}

/// A response envelope carrying an optional payload.
#[derive(Debug)]
pub struct Envelope<T> {
    status: StatusCode,
    message: String,
    data: Option<T>,
}

#[derive(Serialize)]
struct Body<'a, T> {
    status: EnvelopeStatus,
    message: &'a str,
    data: Option<&'a T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, Some(data))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

impl Envelope<()> {
    /// Success with `data: null`.
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, None)
    }

    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, "", None)
    }
}

impl<T> Envelope<Vec<T>> {
    /// 200 with the list, or 200 with `data: null` and `empty_message` when
    /// nothing matched.
    pub fn list_or_null(
        message: impl Into<String>,
        empty_message: impl Into<String>,
        items: Vec<T>,
    ) -> Self {
        if items.is_empty() {
            Self {
                status: StatusCode::OK,
                message: empty_message.into(),
                data: None,
            }
        } else {
            Self {
                status: StatusCode::OK,
                message: message.into(),
                data: Some(items),
            }
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NO_CONTENT {
            return StatusCode::NO_CONTENT.into_response();
        }
        let body = Body {
            status: self.status.into(),
            message: &self.message,
            data: self.data.as_ref(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// OpenAPI shape of [`Envelope`]. `data` depends on the endpoint.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EnvelopeDoc {
    pub status: EnvelopeStatus,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

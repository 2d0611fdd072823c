//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Carry a handler's status code and body back to axum
//! - Map handler failures to appropriate HTTP status codes
//!
//! # Design Decisions
//! - Lookup misses render as `{ "error": <message> }`
//! - Every other failure renders the `{ statusCode, error, message }` envelope
//! - Upstream generation failures become 502, upstream timeouts 504

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::services::ai::GenerationError;

/// Body of a handler response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

/// Status code and body produced by a route handler.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl RouteResponse {
    /// 200 with a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(Self {
            status: StatusCode::OK,
            body: ResponseBody::Json(value),
        })
    }

    /// 200 with a plain-text body.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::Text(text.into()),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl From<Value> for RouteResponse {
    fn from(value: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::Json(value),
        }
    }
}

impl IntoResponse for RouteResponse {
    fn into_response(self) -> Response {
        match self.body {
            ResponseBody::Json(value) => (self.status, Json(value)).into_response(),
            ResponseBody::Text(text) => (self.status, text).into_response(),
            ResponseBody::Empty => self.status.into_response(),
        }
    }
}

/// Failures a route handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Entity lookup had no match.
    #[error("{0}")]
    NotFound(String),

    /// Request was malformed or failed body validation.
    #[error("{0}")]
    BadRequest(String),

    /// The structured generation service failed.
    /// The body exceeded the route's size limit (bytes).
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("upstream generation failed: {0}")]
    Upstream(#[source] GenerationError),

    /// The handler or an upstream call exceeded its deadline.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream(GenerationError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(error: GenerationError) -> Self {
        ApiError::Upstream(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = match &self {
            ApiError::NotFound(message) => json!({ "error": message }),
            other => json!({
                "statusCode": status.as_u16(),
                "error": status.canonical_reason().unwrap_or("Error"),
                "message": other.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

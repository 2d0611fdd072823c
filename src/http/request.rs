//! Request extraction for route handlers.
//!
//! # Responsibilities
//! - Decode the body as JSON (or keep it as text when it is not JSON)
//! - Expose path parameters by name
//! - Hand handlers a transport-independent request value
//!
//! # Design Decisions
//! - Empty bodies decode to `None`, never to an empty string
//! - A body declared as JSON that fails to parse is a 400

use axum::http::{header, HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use crate::http::response::ApiError;

/// Structured request handed to route handlers.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    pub params: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RouteRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            params: HashMap::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a path parameter captured by the route pattern.
    pub fn param(&self, name: &str) -> Result<&str, ApiError> {
        self.params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::BadRequest(format!("missing path parameter '{name}'")))
    }

    /// Deserialize the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body = self.body.clone().unwrap_or(Value::Null);
        serde_json::from_value(body).map_err(|e| ApiError::BadRequest(format!("invalid body: {e}")))
    }

    /// The body as received, `null` when absent.
    pub fn body_or_null(&self) -> Value {
        self.body.clone().unwrap_or(Value::Null)
    }
}

/// Decode raw body bytes according to the request's content type.
pub fn decode_body(headers: &HeaderMap, bytes: &[u8]) -> Result<Option<Value>, ApiError> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let declared_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);

    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) if declared_json => Err(ApiError::BadRequest(format!("invalid JSON body: {e}"))),
        Err(_) => Ok(Some(Value::String(String::from_utf8_lossy(bytes).into_owned()))),
    }
}

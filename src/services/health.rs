//! Application health.
//!
//! The probe is a trait so the server can be exercised with a failing one;
//! any probe failure is rendered as a fixed 500 envelope rather than an error.

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::http::RouteResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Error)]
#[error("health probe failed: {0}")]
pub struct HealthError(pub String);

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn status(&self) -> Result<HealthStatus, HealthError>;
}

/// Reports OK whenever the process can answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessProbe;

#[async_trait]
impl HealthProbe for ProcessProbe {
    async fn status(&self) -> Result<HealthStatus, HealthError> {
        Ok(HealthStatus {
            status: "OK".to_string(),
            timestamp: now(),
        })
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Run the probe and render the result; never fails.
pub async fn health_response(probe: &dyn HealthProbe) -> RouteResponse {
    let body = match probe.status().await {
        Ok(status) => serde_json::to_value(&status).map_err(|e| HealthError(e.to_string())),
        Err(e) => Err(e),
    };

    match body {
        Ok(body) => RouteResponse::from(body),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            RouteResponse::from(json!({
                "status": "ERROR",
                "timestamp": now(),
                "error": "Health check failed",
            }))
            .with_status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

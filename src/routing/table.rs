//! Route table and dispatch.
//!
//! # Responsibilities
//! - Store registrations (verb, pattern, handler, options)
//! - Refuse duplicate and conflicting registrations
//! - Compile into an axum `Router` that adapts requests for handlers
//!
//! # Design Decisions
//! - Duplicate (verb, pattern) registrations are rejected; the first one stays
//! - Patterns that differ only in parameter names conflict and are rejected
//! - Immutable once compiled (thread-safe without locks)

use axum::extract::{FromRequestParts, Path, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::Router;
use http_body_util::LengthLimitError;
use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::http::request::decode_body;
use crate::http::{ApiError, RouteRequest};
use crate::observability::metrics;
use crate::routing::module::{Handler, RouteOptions, Verb};
use crate::routing::pattern::RoutePattern;

/// Default maximum body size accepted by route handlers.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("{verb} {pattern} is already registered")]
    Duplicate { verb: Verb, pattern: String },

    #[error("{pattern} conflicts with already registered {existing}")]
    Conflict { pattern: String, existing: String },
}

/// One registered route.
#[derive(Clone)]
pub struct Registration {
    pub verb: Verb,
    pub pattern: RoutePattern,
    pub handler: Handler,
    pub options: RouteOptions,
}

/// All registered routes, grouped by pattern.
#[derive(Default)]
pub struct RouteTable {
    routes: BTreeMap<RoutePattern, BTreeMap<Verb, Registration>>,
    shapes: HashMap<String, RoutePattern>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Fails if the (verb, pattern) pair is taken.
    pub fn register(
        &mut self,
        verb: Verb,
        pattern: RoutePattern,
        handler: Handler,
        options: RouteOptions,
    ) -> Result<(), RegistrationError> {
        if let Some(existing) = self.shapes.get(&pattern.shape()) {
            if existing != &pattern {
                return Err(RegistrationError::Conflict {
                    pattern: pattern.to_string(),
                    existing: existing.to_string(),
                });
            }
        }

        let verbs = self.routes.entry(pattern.clone()).or_default();
        if verbs.contains_key(&verb) {
            return Err(RegistrationError::Duplicate {
                verb,
                pattern: pattern.to_string(),
            });
        }

        self.shapes.insert(pattern.shape(), pattern.clone());
        verbs.insert(
            verb,
            Registration {
                verb,
                pattern,
                handler,
                options,
            },
        );
        Ok(())
    }

    pub fn contains(&self, verb: Verb, pattern: &str) -> bool {
        self.routes
            .iter()
            .any(|(p, verbs)| p.as_str() == pattern && verbs.contains_key(&verb))
    }

    pub fn get(&self, verb: Verb, pattern: &str) -> Option<&Registration> {
        self.routes
            .iter()
            .find(|(p, _)| p.as_str() == pattern)
            .and_then(|(_, verbs)| verbs.get(&verb))
    }

    /// Every registered (verb, pattern) pair, sorted by pattern.
    pub fn entries(&self) -> Vec<(Verb, &RoutePattern)> {
        self.routes
            .iter()
            .flat_map(|(pattern, verbs)| verbs.keys().map(move |verb| (*verb, pattern)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compile into an axum router.
    pub fn into_router(self) -> Router {
        let mut router = Router::new();
        for (pattern, verbs) in self.routes {
            let mut method_router = MethodRouter::new();
            for (verb, registration) in verbs {
                let registration = Arc::new(registration);
                method_router = method_router.on(verb.filter(), move |request: Request| {
                    let registration = registration.clone();
                    async move { dispatch(registration, request).await }
                });
            }
            router = router.route(&pattern.to_axum_path(), method_router);
        }
        router
    }
}

async fn dispatch(registration: Arc<Registration>, request: Request) -> Response {
    let start = Instant::now();
    let route = registration.pattern.to_string();
    let method = registration.verb.as_str();

    let response = match run(&registration, request).await {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    };

    metrics::record_request(method, &route, response.status().as_u16(), start);
    response
}

async fn run(
    registration: &Registration,
    request: Request,
) -> Result<crate::http::RouteResponse, ApiError> {
    let (mut parts, body) = request.into_parts();

    let params = if registration.pattern.params().is_empty() {
        HashMap::new()
    } else {
        Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
            .0
    };

    let limit = registration.options.body_limit.unwrap_or(DEFAULT_BODY_LIMIT);
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
        let e = e.into_inner();
        if exceeds_limit(&*e) {
            ApiError::PayloadTooLarge(limit)
        } else {
            ApiError::BadRequest(format!("could not read body: {e}"))
        }
    })?;
    let body = decode_body(&parts.headers, &bytes)?;

    if let Some(schema) = &registration.options.schema.body {
        schema.validate(body.as_ref().unwrap_or(&serde_json::Value::Null))?;
    }

    let request = RouteRequest {
        method: parts.method,
        params,
        headers: parts.headers,
        body,
    };

    let call = (registration.handler)(request);
    match registration.options.timeout {
        Some(deadline) => tokio::time::timeout(deadline, call)
            .await
            .map_err(|_| ApiError::Timeout(deadline.as_secs()))?,
        None => call.await,
    }
}

fn exceeds_limit(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Fallback for unmatched paths.
pub async fn not_found(request: Request) -> Response {
    let message = format!("Route {}:{} not found", request.method(), request.uri().path());
    (
        StatusCode::NOT_FOUND,
        axum::Json(serde_json::json!({
            "message": message,
            "error": "Not Found",
            "statusCode": 404,
        })),
    )
        .into_response()
}

//! Route module capabilities.
//!
//! A route file compiles to a type implementing [`RouteModule`]. The loader
//! asks it, verb by verb, whether it handles GET, POST, and so on, and which
//! options apply. Nothing is reflected over; a module that handles no verb is
//! simply empty.

use axum::http::Method;
use axum::routing::MethodFilter;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::context::AppContext;
use crate::http::{ApiError, RouteRequest, RouteResponse};
use crate::routing::discovery::RouteFile;

/// Result of running a handler.
pub type HandlerResult = Result<RouteResponse, ApiError>;

/// A request handler registered for one verb on one pattern.
pub type Handler = Arc<dyn Fn(RouteRequest) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Wrap an async function or closure as a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// The seven HTTP verbs a route module may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Verb {
    pub const ALL: [Verb; 7] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Delete,
        Verb::Patch,
        Verb::Head,
        Verb::Options,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Patch => "PATCH",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
            Verb::Patch => Method::PATCH,
            Verb::Head => Method::HEAD,
            Verb::Options => Method::OPTIONS,
        }
    }

    pub fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Delete => MethodFilter::DELETE,
            Verb::Patch => MethodFilter::PATCH,
            Verb::Head => MethodFilter::HEAD,
            Verb::Options => MethodFilter::OPTIONS,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared shape of a request body.
///
/// The body must deserialize into the declared type; anything else is a 400
/// before the handler runs.
#[derive(Clone)]
pub struct BodySchema {
    name: &'static str,
    check: fn(&Value) -> Result<(), serde_json::Error>,
}

fn deserializes_as<T: DeserializeOwned>(value: &Value) -> Result<(), serde_json::Error> {
    T::deserialize(value).map(|_| ())
}

impl BodySchema {
    pub fn of<T: DeserializeOwned>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            check: deserializes_as::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn validate(&self, body: &Value) -> Result<(), ApiError> {
        (self.check)(body).map_err(|e| ApiError::BadRequest(format!("body does not match schema: {e}")))
    }
}

impl fmt::Debug for BodySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodySchema").field("name", &self.name).finish()
    }
}

/// Validation schemas attached to a route.
#[derive(Debug, Clone, Default)]
pub struct RouteSchema {
    pub body: Option<BodySchema>,
}

/// Per-route configuration.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub schema: RouteSchema,

    /// Deadline for the handler; the server-wide timeout still applies.
    pub timeout: Option<Duration>,

    /// Maximum accepted body size in bytes.
    pub body_limit: Option<usize>,
}

impl RouteOptions {
    pub fn with_body_schema(mut self, schema: BodySchema) -> Self {
        self.schema.body = Some(schema);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }
}

/// Capabilities a route file provides.
///
/// Every accessor defaults to "not implemented".
pub trait RouteModule: Send + Sync {
    fn get(&self) -> Option<Handler> {
        None
    }

    fn post(&self) -> Option<Handler> {
        None
    }

    fn put(&self) -> Option<Handler> {
        None
    }

    fn delete(&self) -> Option<Handler> {
        None
    }

    fn patch(&self) -> Option<Handler> {
        None
    }

    fn head(&self) -> Option<Handler> {
        None
    }

    fn options(&self) -> Option<Handler> {
        None
    }

    /// Options shared by every verb of this module.
    fn route_options(&self) -> Option<RouteOptions> {
        None
    }

    /// Options for one verb; these replace the shared options entirely.
    fn method_options(&self, _verb: Verb) -> Option<RouteOptions> {
        None
    }
}

impl dyn RouteModule {
    /// The handler for `verb`, if this module implements it.
    pub fn handler_for(&self, verb: Verb) -> Option<Handler> {
        match verb {
            Verb::Get => self.get(),
            Verb::Post => self.post(),
            Verb::Put => self.put(),
            Verb::Delete => self.delete(),
            Verb::Patch => self.patch(),
            Verb::Head => self.head(),
            Verb::Options => self.options(),
        }
    }

    /// Effective options for `verb`: method-specific, then shared, then empty.
    /// GET never carries a body schema.
    pub fn effective_options(&self, verb: Verb) -> RouteOptions {
        let mut options = self
            .method_options(verb)
            .or_else(|| self.route_options())
            .unwrap_or_default();
        if verb == Verb::Get {
            options.schema.body = None;
        }
        options
    }
}

/// Why a route file could not be loaded.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("no route module is compiled for '{0}'")]
    Unregistered(String),

    #[error("module initialisation failed: {0}")]
    Init(String),
}

/// Resolves discovered route files to loaded modules.
pub trait ModuleSource: Send + Sync {
    /// `Ok(None)` means the file exists but is not a route module.
    fn load(
        &self,
        file: &RouteFile,
        ctx: &AppContext,
    ) -> Result<Option<Arc<dyn RouteModule>>, ModuleError>;
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Register the built-in routes, then the file-based routes
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Bind the router to a listener and serve until shutdown

use axum::http::{HeaderName, StatusCode};
use axum::Router;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::http::RouteResponse;
use crate::routing::table::not_found;
use crate::routing::{
    handler, load_routes, LoadReport, ModuleSource, RouteOptions, RoutePattern, RouteTable, Verb,
};
use crate::services::health_response;

const X_REQUEST_ID: &str = "x-request-id";

/// HTTP server for the game backend.
pub struct HttpServer {
    router: Router,
    report: LoadReport,
}

impl HttpServer {
    /// Build the server: built-in routes first, then everything under the
    /// configured routes directory.
    pub fn new(config: &AppConfig, ctx: &AppContext, source: &dyn ModuleSource) -> Self {
        let mut table = RouteTable::new();
        register_builtin(&mut table, ctx);

        let report = load_routes(&config.routes.dir, source, ctx, &mut table);
        for (verb, pattern) in table.entries() {
            tracing::debug!(method = %verb, pattern = %pattern, "Route available");
        }

        let router = Self::build_router(config, table);
        Self { router, report }
    }

    fn build_router(config: &AppConfig, table: RouteTable) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        table
            .into_router()
            .fallback(not_found)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The compiled router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Serve on `listener` until `shutdown` resolves, then drain.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `GET /health` and `GET /ping`, registered ahead of the route tree so a
/// route file cannot shadow them.
fn register_builtin(table: &mut RouteTable, ctx: &AppContext) {
    let probe = ctx.health.clone();
    let health = handler(move |_| {
        let probe = probe.clone();
        async move { Ok(health_response(probe.as_ref()).await) }
    });
    let ping = handler(|_| async { Ok(RouteResponse::text("pong")) });

    for (file, route) in [("health.rs", health), ("ping.rs", ping)] {
        let registered = RoutePattern::from_file_path(file)
            .map_err(|e| e.to_string())
            .and_then(|pattern| {
                table
                    .register(Verb::Get, pattern, route, RouteOptions::default())
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = registered {
            tracing::error!(file, error = %e, "Built-in route not registered");
        }
    }
}

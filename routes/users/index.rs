//! `/users`: list users, create (echo) a user.

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::http::{RouteRequest, RouteResponse};
use crate::routing::{handler, Handler, ModuleError, RouteModule};
use crate::services::all_users;

struct Users;

impl RouteModule for Users {
    fn get(&self) -> Option<Handler> {
        Some(handler(|_| async { RouteResponse::json(&all_users()) }))
    }

    fn post(&self) -> Option<Handler> {
        Some(handler(|request: RouteRequest| async move {
            tracing::info!("Creating user");
            Ok(RouteResponse::from(json!({
                "message": "User created successfully",
                "user": request.body_or_null(),
            }))
            .with_status(StatusCode::CREATED))
        }))
    }
}

pub fn load(_ctx: &AppContext) -> Result<Arc<dyn RouteModule>, ModuleError> {
    Ok(Arc::new(Users))
}

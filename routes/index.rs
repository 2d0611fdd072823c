//! `/`: greeting, and an echo of whatever was posted.

use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::http::{RouteRequest, RouteResponse};
use crate::routing::{handler, Handler, ModuleError, RouteModule};

struct Root;

impl RouteModule for Root {
    fn get(&self) -> Option<Handler> {
        Some(handler(|_| async { Ok(RouteResponse::from(json!({ "hello": "world" }))) }))
    }

    fn post(&self) -> Option<Handler> {
        Some(handler(|request: RouteRequest| async move {
            Ok(RouteResponse::from(json!({ "received": request.body_or_null() })))
        }))
    }
}

pub fn load(_ctx: &AppContext) -> Result<Arc<dyn RouteModule>, ModuleError> {
    Ok(Arc::new(Root))
}

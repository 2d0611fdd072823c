//! Route modules compiled into the binary.
//!
//! Every file under `routes/` is built as a module of this crate and listed
//! here against its path relative to the routes root. Loading a discovered
//! file is a lookup in this table followed by the module's own `load`, which
//! receives the injected [`AppContext`].

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::AppContext;
use crate::routing::{ModuleError, ModuleSource, RouteFile, RouteModule};

#[path = "../routes/index.rs"]
mod root;

#[path = "../routes/users/index.rs"]
mod users;

#[path = "../routes/users/[id]/index.rs"]
mod user_by_id;

#[path = "../routes/ai/narrate.rs"]
mod ai_narrate;

#[path = "../routes/ai/gsm/create-session.rs"]
mod ai_gsm_create_session;

/// Builds a route module once its dependencies are available.
pub type ModuleFactory = fn(&AppContext) -> Result<Arc<dyn RouteModule>, ModuleError>;

/// Maps route file paths to the modules compiled for them.
#[derive(Default, Clone)]
pub struct RouteCatalog {
    modules: BTreeMap<String, ModuleFactory>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `factory` for the route file at `relative_path`.
    pub fn module(mut self, relative_path: &str, factory: ModuleFactory) -> Self {
        self.modules.insert(relative_path.to_string(), factory);
        self
    }

    /// Every route module shipped in `routes/`.
    pub fn builtin() -> Self {
        Self::new()
            .module("index.rs", root::load)
            .module("users/index.rs", users::load)
            .module("users/[id]/index.rs", user_by_id::load)
            .module("ai/narrate.rs", ai_narrate::load)
            .module("ai/gsm/create-session.rs", ai_gsm_create_session::load)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

impl ModuleSource for RouteCatalog {
    fn load(
        &self,
        file: &RouteFile,
        ctx: &AppContext,
    ) -> Result<Option<Arc<dyn RouteModule>>, ModuleError> {
        let factory = self
            .modules
            .get(file.relative_path())
            .ok_or_else(|| ModuleError::Unregistered(file.relative_path().to_string()))?;
        factory(ctx).map(Some)
    }
}

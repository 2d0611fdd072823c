//! Route registration from the file-based route tree.
//!
//! # Responsibilities
//! - Discover route files under the routes root
//! - Translate each path into a pattern and load its module
//! - Register every implemented verb with the route table
//!
//! # Design Decisions
//! - A file that fails to translate or load is logged and skipped; one bad
//!   file never stops the others from registering
//! - Registration runs once, sequentially, before the listener starts

use std::path::Path;

use crate::context::AppContext;
use crate::observability::metrics;
use crate::routing::discovery::{find_route_files, RouteFile};
use crate::routing::module::{ModuleSource, Verb};
use crate::routing::pattern::RoutePattern;
use crate::routing::table::RouteTable;

/// Outcome of a load pass, for startup logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Route files discovered under the root.
    pub files_found: usize,
    /// Routes (verb + pattern) registered.
    pub routes_registered: usize,
    /// Files that failed to translate or load, or were not route modules.
    pub files_skipped: Vec<String>,
    /// Files that loaded but implement no verb.
    pub files_empty: Vec<String>,
    /// Registrations refused by the route table.
    pub routes_rejected: usize,
}

/// Load and register all routes under `root`.
pub fn load_routes(
    root: &Path,
    source: &dyn ModuleSource,
    ctx: &AppContext,
    table: &mut RouteTable,
) -> LoadReport {
    let files = find_route_files(root);
    tracing::info!(dir = %root.display(), count = files.len(), "Found route files");

    let mut report = LoadReport {
        files_found: files.len(),
        ..LoadReport::default()
    };
    for file in &files {
        register_file(file, source, ctx, table, &mut report);
    }

    tracing::info!(
        routes = report.routes_registered,
        rejected = report.routes_rejected,
        skipped = report.files_skipped.len(),
        "Route loading complete"
    );
    report
}

fn register_file(
    file: &RouteFile,
    source: &dyn ModuleSource,
    ctx: &AppContext,
    table: &mut RouteTable,
    report: &mut LoadReport,
) {
    let path = file.relative_path();

    let pattern = match RoutePattern::from_file_path(path) {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::error!(file = %path, error = %e, "Error loading route file");
            report.files_skipped.push(path.to_string());
            return;
        }
    };

    let module = match source.load(file, ctx) {
        Ok(Some(module)) => module,
        Ok(None) => {
            tracing::warn!(file = %path, "Route file does not export a valid module");
            report.files_skipped.push(path.to_string());
            return;
        }
        Err(e) => {
            tracing::error!(file = %path, error = %e, "Error loading route file");
            report.files_skipped.push(path.to_string());
            return;
        }
    };

    let mut implemented = 0;
    for verb in Verb::ALL {
        let Some(handler) = module.handler_for(verb) else {
            continue;
        };
        implemented += 1;
        let options = module.effective_options(verb);

        match table.register(verb, pattern.clone(), handler, options) {
            Ok(()) => {
                report.routes_registered += 1;
                metrics::record_registration(verb.as_str(), "registered");
                tracing::info!(method = %verb, pattern = %pattern, file = %path, "Registered route");
            }
            Err(e) => {
                report.routes_rejected += 1;
                metrics::record_registration(verb.as_str(), "rejected");
                tracing::error!(file = %path, error = %e, "Route registration rejected");
            }
        }
    }

    if implemented == 0 {
        tracing::warn!(file = %path, "Route file does not export any valid HTTP method handlers");
        report.files_empty.push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;
    use crate::http::RouteResponse;
    use crate::routing::module::{handler, BodySchema, Handler, ModuleError, RouteModule, RouteOptions};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Arc;

    struct Echo;

    impl RouteModule for Echo {
        fn get(&self) -> Option<Handler> {
            Some(handler(|_| async { Ok(RouteResponse::text("get")) }))
        }

        fn post(&self) -> Option<Handler> {
            Some(handler(|_| async { Ok(RouteResponse::text("post")) }))
        }

        fn route_options(&self) -> Option<RouteOptions> {
            Some(RouteOptions::default().with_body_schema(BodySchema::of::<HashMap<String, Value>>()))
        }
    }

    struct Empty;

    impl RouteModule for Empty {}

    enum Entry {
        Module(fn() -> Arc<dyn RouteModule>),
        Failing,
        NotAModule,
    }

    struct MapSource(HashMap<&'static str, Entry>);

    impl ModuleSource for MapSource {
        fn load(
            &self,
            file: &RouteFile,
            _ctx: &AppContext,
        ) -> Result<Option<Arc<dyn RouteModule>>, ModuleError> {
            match self.0.get(file.relative_path()) {
                Some(Entry::Module(make)) => Ok(Some(make())),
                Some(Entry::Failing) => Err(ModuleError::Init("boom".into())),
                Some(Entry::NotAModule) => Ok(None),
                None => Err(ModuleError::Unregistered(file.relative_path().into())),
            }
        }
    }

    fn tree(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        dir
    }

    fn echo() -> Arc<dyn RouteModule> {
        Arc::new(Echo)
    }

    fn empty() -> Arc<dyn RouteModule> {
        Arc::new(Empty)
    }

    #[test]
    fn test_bad_file_does_not_block_good_file() {
        let dir = tree(&["bad.rs", "good/index.rs"]);
        let source = MapSource(HashMap::from([
            ("bad.rs", Entry::Failing),
            ("good/index.rs", Entry::Module(echo)),
        ]));
        let mut table = RouteTable::new();

        let report = load_routes(dir.path(), &source, &AppContext::offline(), &mut table);

        assert_eq!(report.files_found, 2);
        assert_eq!(report.routes_registered, 2);
        assert_eq!(report.files_skipped, vec!["bad.rs".to_string()]);
        assert!(table.contains(Verb::Get, "/good"));
        assert!(table.contains(Verb::Post, "/good"));
    }

    #[test]
    fn test_unregistered_and_invalid_files_are_skipped() {
        let dir = tree(&["index.rs", "orphan.rs", "helper.rs", "users/[].rs"]);
        let source = MapSource(HashMap::from([
            ("index.rs", Entry::Module(echo)),
            ("helper.rs", Entry::NotAModule),
        ]));
        let mut table = RouteTable::new();

        let report = load_routes(dir.path(), &source, &AppContext::offline(), &mut table);

        assert_eq!(report.routes_registered, 2);
        assert_eq!(report.files_skipped.len(), 3);
        assert!(table.contains(Verb::Get, "/"));
    }

    #[test]
    fn test_capture_syntax_param_is_skipped_and_router_builds() {
        let dir = tree(&["[a}b].rs", "files/[*rest].rs", "index.rs"]);
        let source = MapSource(HashMap::from([
            ("[a}b].rs", Entry::Module(echo)),
            ("files/[*rest].rs", Entry::Module(echo)),
            ("index.rs", Entry::Module(echo)),
        ]));
        let mut table = RouteTable::new();

        let report = load_routes(dir.path(), &source, &AppContext::offline(), &mut table);

        assert_eq!(report.files_skipped.len(), 2);
        assert_eq!(report.routes_registered, 2);
        let _router = table.into_router();
    }

    #[test]
    fn test_empty_module_is_reported_not_failed() {
        let dir = tree(&["nothing.rs"]);
        let source = MapSource(HashMap::from([("nothing.rs", Entry::Module(empty))]));
        let mut table = RouteTable::new();

        let report = load_routes(dir.path(), &source, &AppContext::offline(), &mut table);

        assert_eq!(report.files_empty, vec!["nothing.rs".to_string()]);
        assert!(report.files_skipped.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_get_registration_has_no_body_schema() {
        let dir = tree(&["items.rs"]);
        let source = MapSource(HashMap::from([("items.rs", Entry::Module(echo))]));
        let mut table = RouteTable::new();

        load_routes(dir.path(), &source, &AppContext::offline(), &mut table);

        let get = table.get(Verb::Get, "/items").unwrap();
        assert!(get.options.schema.body.is_none());
        let post = table.get(Verb::Post, "/items").unwrap();
        assert!(post.options.schema.body.is_some());
    }

    #[test]
    fn test_duplicate_pattern_keeps_first_registration() {
        let dir = tree(&["users/[id].rs", "users/[id]/index.rs"]);
        let source = MapSource(HashMap::from([
            ("users/[id].rs", Entry::Module(echo)),
            ("users/[id]/index.rs", Entry::Module(echo)),
        ]));
        let mut table = RouteTable::new();

        let report = load_routes(dir.path(), &source, &AppContext::offline(), &mut table);

        assert_eq!(report.routes_registered, 2);
        assert_eq!(report.routes_rejected, 2);
        assert!(report.files_empty.is_empty());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_root_registers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = MapSource(HashMap::new());
        let mut table = RouteTable::new();

        let report = load_routes(&dir.path().join("routes"), &source, &AppContext::offline(), &mut table);

        assert_eq!(report, LoadReport::default());
    }
}

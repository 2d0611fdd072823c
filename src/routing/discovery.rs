//! Route file discovery.
//!
//! Walks the routes root and returns every `.rs` file at any depth as a path
//! relative to the root. A missing or unreadable root yields no files and a
//! warning so the server still starts with its built-in routes.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::routing::pattern::ROUTE_EXTENSION;

/// A discovered route file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RouteFile {
    relative: String,
    absolute: PathBuf,
}

impl RouteFile {
    pub fn new(root: &Path, relative: impl Into<String>) -> Self {
        let relative = relative.into().replace('\\', "/");
        let absolute = root.join(&relative);
        Self { relative, absolute }
    }

    /// Path relative to the routes root, always `/`-separated.
    pub fn relative_path(&self) -> &str {
        &self.relative
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute
    }
}

/// Find all route files under `root`.
///
/// Results are sorted by relative path, which is also registration order.
pub fn find_route_files(root: &Path) -> Vec<RouteFile> {
    if !root.is_dir() {
        tracing::warn!(dir = %root.display(), "Could not read routes directory");
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %root.display(), error = %e, "Skipping unreadable routes entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_route_extension(entry.path()) {
            continue;
        }

        match entry.path().strip_prefix(root) {
            Ok(relative) => {
                let relative = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                files.push(RouteFile::new(root, relative));
            }
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "Route file outside routes root");
            }
        }
    }

    files.sort();
    files
}

fn has_route_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ROUTE_EXTENSION)
}

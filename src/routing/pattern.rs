//! File path to URL pattern translation.
//!
//! # Rules (applied in order)
//! 1. Strip the `.rs` extension
//! 2. Drop a trailing `index` segment (case-sensitive); nothing left means `/`
//! 3. Normalize `\` separators to `/`
//! 4. Rewrite whole-segment `[name]` to `:name`
//! 5. Prefix with `/`
//!
//! ```text
//! index.rs                  -> /
//! users/index.rs            -> /users
//! users/[id]/index.rs       -> /users/:id
//! ai/gsm/create-session.rs  -> /ai/gsm/create-session
//! ```

use std::fmt;
use thiserror::Error;

/// Extension of route source files.
pub const ROUTE_EXTENSION: &str = "rs";

/// Final segment that maps a file onto its directory.
pub const INDEX_SEGMENT: &str = "index";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty parameter name in '{0}'")]
    EmptyParam(String),

    #[error("segment '{segment}' in '{path}' cannot be routed")]
    Unroutable { path: String, segment: String },
}

/// URL template derived from a route file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoutePattern(String);

impl RoutePattern {
    /// Translate a path relative to the routes root.
    pub fn from_file_path(file_path: &str) -> Result<Self, PatternError> {
        let normalized = file_path.replace('\\', "/");
        let stem = normalized
            .strip_suffix(&format!(".{ROUTE_EXTENSION}"))
            .unwrap_or(&normalized);

        let mut segments: Vec<&str> = stem.split('/').filter(|s| !s.is_empty()).collect();
        if segments.last() == Some(&INDEX_SEGMENT) {
            segments.pop();
        }

        let mut pattern = String::with_capacity(stem.len() + 1);
        for segment in segments {
            pattern.push('/');
            match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                Some("") => return Err(PatternError::EmptyParam(file_path.to_string())),
                Some(name) if is_routable_param(name) => {
                    pattern.push(':');
                    pattern.push_str(name);
                }
                None if is_routable_literal(segment) => pattern.push_str(segment),
                Some(_) | None => {
                    return Err(PatternError::Unroutable {
                        path: file_path.to_string(),
                        segment: segment.to_string(),
                    })
                }
            }
        }

        if pattern.is_empty() {
            pattern.push('/');
        }
        Ok(Self(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Names of the `:name` segments, in order.
    pub fn params(&self) -> Vec<&str> {
        self.segments().filter_map(|s| s.strip_prefix(':')).collect()
    }

    /// Render for axum's router, which captures with `{name}`.
    pub fn to_axum_path(&self) -> String {
        if self.0 == "/" {
            return self.0.clone();
        }
        self.segments()
            .map(|s| match s.strip_prefix(':') {
                Some(name) => format!("/{{{name}}}"),
                None => format!("/{s}"),
            })
            .collect()
    }

    /// The pattern with parameter names erased. Two patterns with the same
    /// shape match the same requests.
    pub fn shape(&self) -> String {
        if self.0 == "/" {
            return self.0.clone();
        }
        self.segments()
            .map(|s| if s.starts_with(':') { "/:".to_string() } else { format!("/{s}") })
            .collect()
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

fn is_routable_literal(segment: &str) -> bool {
    !segment.starts_with([':', '*']) && !segment.contains(['{', '}'])
}

fn is_routable_param(name: &str) -> bool {
    !name.contains(['{', '}', '*', ':', '/', '[', ']'])
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(path: &str) -> String {
        RoutePattern::from_file_path(path).unwrap().to_string()
    }

    #[test]
    fn test_root_index() {
        assert_eq!(translate("index.rs"), "/");
    }

    #[test]
    fn test_nested_index() {
        assert_eq!(translate("users/index.rs"), "/users");
        assert_eq!(translate("users/[id]/index.rs"), "/users/:id");
    }

    #[test]
    fn test_single_segment() {
        assert_eq!(translate("about.rs"), "/about");
        assert_eq!(translate("ai/gsm/create-session.rs"), "/ai/gsm/create-session");
    }

    #[test]
    fn test_multiple_params() {
        assert_eq!(
            translate("users/[userId]/posts/[postId]/index.rs"),
            "/users/:userId/posts/:postId"
        );
    }

    #[test]
    fn test_windows_separators() {
        assert_eq!(translate("users\\[id]\\index.rs"), "/users/:id");
    }

    #[test]
    fn test_index_is_case_sensitive() {
        assert_eq!(translate("users/Index.rs"), "/users/Index");
    }

    #[test]
    fn test_index_only_dropped_as_final_segment() {
        assert_eq!(translate("index/about.rs"), "/index/about");
    }

    #[test]
    fn test_partial_brackets_stay_literal() {
        assert_eq!(translate("post-[id].rs"), "/post-[id]");
    }

    #[test]
    fn test_empty_param_rejected() {
        assert_eq!(
            RoutePattern::from_file_path("users/[].rs"),
            Err(PatternError::EmptyParam("users/[].rs".into()))
        );
    }

    #[test]
    fn test_capture_syntax_in_literals_rejected() {
        assert!(matches!(
            RoutePattern::from_file_path("users/{id}.rs"),
            Err(PatternError::Unroutable { .. })
        ));
        assert!(matches!(
            RoutePattern::from_file_path("files/*rest.rs"),
            Err(PatternError::Unroutable { .. })
        ));
    }

    #[test]
    fn test_capture_syntax_in_param_names_rejected() {
        for path in ["[a}b].rs", "files/[*rest].rs", "users/[:id].rs", "[{id}].rs"] {
            assert!(
                matches!(
                    RoutePattern::from_file_path(path),
                    Err(PatternError::Unroutable { .. })
                ),
                "{path}"
            );
        }
        assert_eq!(translate("users/[user_id].rs"), "/users/:user_id");
    }

    #[test]
    fn test_literal_patterns_are_stable() {
        for path in ["about.rs", "users/index.rs", "ai/gsm/create-session.rs"] {
            let once = translate(path);
            let twice = translate(once.trim_start_matches('/'));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_never_empty() {
        for path in ["index.rs", "", "index", "/index.rs"] {
            let pattern = translate(path);
            assert!(pattern.starts_with('/'));
            assert!(!pattern.is_empty());
        }
    }

    #[test]
    fn test_params_and_axum_path() {
        let pattern = RoutePattern::from_file_path("users/[userId]/posts/[postId].rs").unwrap();
        assert_eq!(pattern.params(), vec!["userId", "postId"]);
        assert_eq!(pattern.to_axum_path(), "/users/{userId}/posts/{postId}");
        assert_eq!(RoutePattern::from_file_path("index.rs").unwrap().to_axum_path(), "/");
    }

    #[test]
    fn test_shape_erases_param_names() {
        let a = RoutePattern::from_file_path("users/[id].rs").unwrap();
        let b = RoutePattern::from_file_path("users/[userId].rs").unwrap();
        let c = RoutePattern::from_file_path("users/new.rs").unwrap();
        assert_eq!(a.shape(), b.shape());
        assert_ne!(a.shape(), c.shape());
    }
}

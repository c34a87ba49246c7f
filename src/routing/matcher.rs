//! Path matching logic.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive)
//! - Recognise framework internals and static assets
//! - Combine matchers with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex; the static matcher scans each `.` once

/// Trait for matching request paths against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Extension prefixes served as static files by the application.
///
/// An extension only has to start with one of these, so `htm` covers `html`
/// and `woff` covers `woff2`. `js` is the exception: `json` stays dynamic.
const STATIC_EXTENSIONS: &[&str] = &[
    "htm", "css", "js", "jpg", "jpeg", "webp", "png", "gif", "svg", "ttf", "woff", "ico",
    "csv", "doc", "xls", "zip", "webmanifest",
];

/// Matches framework build output and static asset files.
///
/// Anything starting with `/_next` is framework output. Otherwise a path is
/// static when any `.` in it is followed by a static extension, wherever
/// that dot sits.
#[derive(Debug, Clone, Default)]
pub struct StaticAssetMatcher;

impl Matcher for StaticAssetMatcher {
    fn matches(&self, path: &str) -> bool {
        let rest = path.strip_prefix('/').unwrap_or(path);
        if rest.starts_with("_next") {
            return true;
        }

        rest.match_indices('.')
            .any(|(dot, _)| has_static_extension(&rest[dot + 1..]))
    }
}

fn has_static_extension(after_dot: &str) -> bool {
    STATIC_EXTENSIONS.iter().any(|ext| {
        let Some(tail) = strip_prefix_ignore_case(after_dot, ext) else {
            return false;
        };
        *ext != "js" || strip_prefix_ignore_case(tail, "on").is_none()
    })
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

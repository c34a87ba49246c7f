//! Route classification.
//!
//! # Responsibilities
//! - Store compiled path rules
//! - Classify a path as API, protected, static or public
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - API rule wins over the static bypass: API traffic is always gated

use crate::config::RoutesConfig;
use crate::routing::matcher::{AnyMatcher, Matcher, PathPrefixMatcher, StaticAssetMatcher};

/// Class of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Subject to origin and rate checks.
    Api,
    /// Subject to the authentication gate.
    Protected,
    /// Framework internals and static assets, never gated.
    Static,
    /// Neither API nor protected.
    Public,
}

impl RouteClass {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Api => "api",
            RouteClass::Protected => "protected",
            RouteClass::Static => "static",
            RouteClass::Public => "public",
        }
    }
}

/// Compiled route rules.
#[derive(Debug)]
pub struct RouteClassifier {
    api: PathPrefixMatcher,
    protected: AnyMatcher,
    static_assets: Option<StaticAssetMatcher>,
}

impl RouteClassifier {
    pub fn from_config(config: &RoutesConfig) -> Self {
        let protected = config
            .protected_prefixes
            .iter()
            .map(|p| Box::new(PathPrefixMatcher::new(p.clone())) as Box<dyn Matcher>)
            .collect();

        Self {
            api: PathPrefixMatcher::new(config.api_prefix.clone()),
            protected: AnyMatcher::new(protected),
            static_assets: config.static_bypass.then_some(StaticAssetMatcher),
        }
    }

    pub fn is_api(&self, path: &str) -> bool {
        self.api.matches(path)
    }

    pub fn is_static(&self, path: &str) -> bool {
        !self.is_api(path)
            && self
                .static_assets
                .as_ref()
                .is_some_and(|m| m.matches(path))
    }

    pub fn is_protected(&self, path: &str) -> bool {
        !self.is_static(path) && self.protected.matches(path)
    }

    /// Most specific class of `path`.
    ///
    /// A path matching both the API prefix and a protected prefix is
    /// reported as `Api`; use `is_protected` to learn it is also protected.
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_api(path) {
            RouteClass::Api
        } else if self.is_static(path) {
            RouteClass::Static
        } else if self.protected.matches(path) {
            RouteClass::Protected
        } else {
            RouteClass::Public
        }
    }
}

impl Default for RouteClassifier {
    fn default() -> Self {
        Self::from_config(&RoutesConfig::default())
    }
}

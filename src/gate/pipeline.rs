//! The per-request decision pipeline.
//!
//! Stage order is fixed: origin, then rate, then auth. The first stage to
//! object ends the pipeline. Only the rate stage has a side effect, and it
//! records the request whether or not the request is then rejected.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::request::Parts;
use axum::response::Response;

use crate::config::GateConfig;
use crate::gate::rejection::GateRejection;
use crate::observability::metrics;
use crate::routing::RouteClassifier;
use crate::security::auth::{self, AuthGate, AuthOutcome};
use crate::security::{ClientKeyExtractor, OriginPolicy, SlidingWindowLimiter};

/// Reloadable part of the gate: route rules, origins and the auth capability.
pub struct GatePolicy {
    pub classifier: RouteClassifier,
    pub origins: OriginPolicy,
    pub auth: Arc<dyn AuthGate>,
}

impl GatePolicy {
    pub fn new(classifier: RouteClassifier, origins: OriginPolicy, auth: Arc<dyn AuthGate>) -> Self {
        Self {
            classifier,
            origins,
            auth,
        }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(
            RouteClassifier::from_config(&config.routes),
            OriginPolicy::new(config.origins.allowed.clone()),
            auth::from_config(&config.auth),
        )
    }
}

/// Pipeline outcome.
#[derive(Debug)]
pub enum Verdict {
    /// Continue normal handling.
    Pass,
    /// Rejected by the origin or rate stage.
    Reject(GateRejection),
    /// The auth gate answered on its own terms.
    Terminate(Response),
}

/// Origin check, rate check and auth gate composed into one decision.
pub struct Gatekeeper {
    policy: ArcSwap<GatePolicy>,
    limiter: Arc<SlidingWindowLimiter>,
    client_keys: ClientKeyExtractor,
    emit_retry_after: bool,
}

impl Gatekeeper {
    pub fn new(policy: GatePolicy, limiter: Arc<SlidingWindowLimiter>) -> Self {
        Self {
            policy: ArcSwap::from_pointee(policy),
            limiter,
            client_keys: ClientKeyExtractor::default(),
            emit_retry_after: false,
        }
    }

    /// Build a gate and its limiter from configuration.
    pub fn from_config(config: &GateConfig) -> Self {
        let limiter = Arc::new(SlidingWindowLimiter::new(
            std::time::Duration::from_millis(config.rate_limit.window_ms),
            config.rate_limit.max_requests,
        ));
        Self::new(GatePolicy::from_config(config), limiter)
            .with_client_keys(ClientKeyExtractor::with_real_ip(
                config.rate_limit.trust_real_ip,
            ))
            .with_retry_after(config.rate_limit.emit_retry_after)
    }

    pub fn with_client_keys(mut self, client_keys: ClientKeyExtractor) -> Self {
        self.client_keys = client_keys;
        self
    }

    /// Attach a `Retry-After` hint to 429 responses.
    pub fn with_retry_after(mut self, enabled: bool) -> Self {
        self.emit_retry_after = enabled;
        self
    }

    pub fn limiter(&self) -> &Arc<SlidingWindowLimiter> {
        &self.limiter
    }

    /// Swap in route rules, origins and auth from a newly loaded config.
    /// Limiter state is kept.
    pub fn reload(&self, config: &GateConfig) {
        self.policy.store(Arc::new(GatePolicy::from_config(config)));
        tracing::info!(
            allowed_origins = config.origins.allowed.len(),
            auth_mode = ?config.auth.mode,
            "Gate policy reloaded"
        );
    }

    /// Run the pipeline for one request.
    pub async fn evaluate(&self, parts: &Parts) -> Verdict {
        let policy = self.policy.load_full();
        let path = parts.uri.path();
        metrics::record_request(policy.classifier.classify(path).as_str());

        if policy.classifier.is_api(path) {
            if !policy.origins.check_request(parts) {
                return self.reject(parts, GateRejection::OriginRejected, None);
            }

            let key = self.client_keys.extract(parts);
            let decision = self.limiter.check(&key);
            metrics::set_tracked_clients(self.limiter.tracked_keys());
            if !decision.allowed {
                let retry_after = decision.retry_after.filter(|_| self.emit_retry_after);
                return self.reject(
                    parts,
                    GateRejection::RateLimitExceeded { retry_after },
                    Some(key.as_str()),
                );
            }
        }

        if policy.classifier.is_protected(path) {
            if let AuthOutcome::Terminate(response) = policy.auth.authorize(parts).await {
                metrics::record_rejection("auth");
                return Verdict::Terminate(response);
            }
        }

        Verdict::Pass
    }

    fn reject(&self, parts: &Parts, rejection: GateRejection, client: Option<&str>) -> Verdict {
        let origin = parts
            .headers
            .get(axum::http::header::ORIGIN)
            .and_then(|v| v.to_str().ok());
        tracing::warn!(
            path = %parts.uri.path(),
            origin = ?origin,
            client = ?client,
            reason = rejection.reason(),
            "Request rejected"
        );
        metrics::record_rejection(rejection.reason());
        Verdict::Reject(rejection)
    }
}

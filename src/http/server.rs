//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (tracing, request ID, timeout, gatekeeper)
//! - Bind server to listener
//! - Forward passed requests to the upstream application
//! - Apply policy reloads and run the limiter sweeper

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        header,
        uri::{Authority, InvalidUri, PathAndQuery, Scheme},
        HeaderMap, HeaderValue, Request, StatusCode, Uri, Version,
    },
    middleware,
    response::{IntoResponse, Json, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GateConfig;
use crate::gate::Gatekeeper;
use crate::http::middleware::gatekeeper_middleware;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::security::rate_limit::spawn_sweeper;

/// Headers that describe one hop and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// State injected into the forwarding handler.
#[derive(Clone)]
pub struct UpstreamState {
    pub client: Client<HttpConnector, Body>,
    pub authority: Authority,
}

/// HTTP server for the edge gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
    gate: Arc<Gatekeeper>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Result<Self, InvalidUri> {
        let gate = Arc::new(Gatekeeper::from_config(&config));
        Self::with_gate(config, gate)
    }

    /// Create a server around an existing gatekeeper, e.g. one with a
    /// custom auth gate.
    pub fn with_gate(config: GateConfig, gate: Arc<Gatekeeper>) -> Result<Self, InvalidUri> {
        let upstream = UpstreamState {
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
            authority: Authority::from_str(&config.upstream.address)?,
        };

        let router = Self::build_router(&config, gate.clone(), upstream);
        Ok(Self {
            router,
            config,
            gate,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, gate: Arc<Gatekeeper>, upstream: UpstreamState) -> Router {
        Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(upstream)
            .layer(middleware::from_fn_with_state(gate, gatekeeper_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.upstream.timeout_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configs received on `config_updates` replace the gate policy.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GateConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        if let Some(secs) = self.config.rate_limit.sweep_interval_secs {
            spawn_sweeper(
                self.gate.limiter().clone(),
                Duration::from_secs(secs),
                shutdown.resubscribe(),
            );
        }

        let gate = self.gate.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                gate.reload(&config);
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward a request that passed the gate to the upstream application.
async fn forward_handler(State(upstream): State<UpstreamState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request).to_string();
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream.authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream URI");
            return upstream_failure();
        }
    };
    parts.version = Version::HTTP_11;

    strip_hop_by_hop(&mut parts.headers);
    if let Some(ConnectInfo(peer)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        append_forwarded_for(&mut parts.headers, peer.ip());
    }

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding request"
    );

    match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_upstream(response.status().as_u16(), start_time);
            response.map(Body::new)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream(StatusCode::BAD_GATEWAY.as_u16(), start_time);
            upstream_failure()
        }
    }
}

fn upstream_failure() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": "Upstream request failed" })),
    )
        .into_response()
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in Connection are hop-by-hop too.
    let named: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
        .collect();

    for name in HOP_BY_HOP.iter().copied().chain(named.iter().map(String::as_str)) {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, peer: IpAddr) {
    let value = match headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        Some(existing) if !existing.trim().is_empty() => format!("{}, {}", existing, peer),
        _ => peer.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert("x-forwarded-for", value);
    }
}

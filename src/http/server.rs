//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, concurrency limit)
//! - Bind server to listener
//! - Dispatch each request to a single Livestatus query

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::request::{apply_params, table_query, UuidRequestId, X_REQUEST_ID};
use crate::livestatus::{GatewayError, LivestatusClient, QueryRequest};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<LivestatusClient>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let client = LivestatusClient::new(config.livestatus.endpoint(), &config.timeouts);
        let state = AppState {
            client: Arc::new(client),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections));

        Router::new()
            .route("/health", get(health_handler))
            .route("/hosts", get(hosts_handler))
            .route("/hostgroups", get(hostgroups_handler))
            .route("/hostgroups/{hostgroup}", get(hostgroup_handler))
            .route("/{table}", get(table_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            livestatus = %self.config.livestatus.endpoint(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /{table}`: generic query.
async fn table_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let request = table_query(&table, raw.as_deref())?;
    execute(&state, request).await
}

/// `GET /hosts`: names and aliases of all hosts.
async fn hosts_handler(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let base = QueryRequest::new("hosts").columns(["name", "alias"]);
    execute(&state, apply_params(base, raw.as_deref())?).await
}

/// `GET /hostgroups`: names and members of all host groups.
async fn hostgroups_handler(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let base = QueryRequest::new("hostgroups").columns(["name", "members"]);
    execute(&state, apply_params(base, raw.as_deref())?).await
}

/// `GET /hostgroups/{hostgroup}`: a single host group.
async fn hostgroup_handler(
    State(state): State<AppState>,
    Path(hostgroup): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let base = QueryRequest::new("hostgroups")
        .columns(["name", "members"])
        .filter(format!("name = {}", hostgroup));
    execute(&state, apply_params(base, raw.as_deref())?).await
}

async fn execute(state: &AppState, request: QueryRequest) -> Result<Response, GatewayError> {
    let start = Instant::now();

    match state.client.execute(&request).await {
        Ok(reply) => {
            metrics::record_query(&request.table, reply.status, start);
            if !reply.is_json {
                tracing::info!(
                    table = %request.table,
                    status = reply.status,
                    "Livestatus returned an error status"
                );
            }
            Ok(reply.into_response())
        }
        Err(e) => {
            metrics::record_error(e.kind());
            tracing::error!(
                table = %request.table,
                endpoint = %state.client.endpoint(),
                error = %e,
                "Livestatus query failed"
            );
            Err(e)
        }
    }
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tokio::net::TcpListener;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

// Import from the library instead of local modules
use whois_resolver::{Config, WhoisError, WhoisResolver, WhoisResponse};

// Import metrics module locally (API-only)
mod metrics;

const RADB_PATH_PREFIX: &str = "RADB/";

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<WhoisResolver>,
    config: Arc<Config>,
}

#[derive(Deserialize)]
struct WhoisForm {
    #[serde(default)]
    target: String,
}

#[derive(Deserialize)]
struct ApiQuery {
    /// Domain, IP address or AS number to resolve
    target: String,
    /// Optional fixed server; root discovery is skipped when present
    #[serde(default)]
    server: Option<String>,
}

#[derive(Serialize)]
struct ApiResponse {
    #[serde(flatten)]
    response: WhoisResponse,
    query_time_ms: u64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "whois_resolver=info,tower_http=debug".into()),
        )
        .init();

    // Load configuration
    let config = Arc::new(Config::load()?);
    info!("Configuration loaded successfully");

    let resolver = Arc::new(WhoisResolver::new(config.clone()));

    // Initialize metrics
    metrics::init_metrics();

    let app = build_router(AppState { resolver, config: config.clone() });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Whois resolver listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("Metrics: http://{}/metrics", addr);

    // Graceful shutdown handling
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install CTRL+C signal handler: {}", e);
            return std::future::pending().await;
        }
        info!("Received shutdown signal, gracefully shutting down...");
    };

    let app = axum::ServiceExt::<axum::extract::Request>::into_make_service(app);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

// Trailing slashes are trimmed before routing, so `POST /whois/` reaches the form handler
fn build_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/whois", post(whois_form))
        .route("/whois/*target", get(whois_path))
        .route("/api/whois", get(whois_api))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .fallback(page_not_available)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

// `/whois/RADB/<target>` pins the lookup to the RADB server
async fn whois_path(
    Path(target): Path<String>,
    State(state): State<AppState>,
) -> Result<String, WhoisError> {
    let response = match target.strip_prefix(RADB_PATH_PREFIX) {
        Some(rest) => run_lookup(&state, rest, Some(state.config.radb_server.as_str())).await?,
        None => run_lookup(&state, &target, None).await?,
    };
    Ok(response.raw_data)
}

async fn whois_form(
    State(state): State<AppState>,
    Form(form): Form<WhoisForm>,
) -> Result<String, WhoisError> {
    let response = run_lookup(&state, &form.target, None).await?;
    Ok(response.raw_data)
}

async fn whois_api(
    Query(params): Query<ApiQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse>, WhoisError> {
    let start_time = Instant::now();
    let response = run_lookup(&state, &params.target, params.server.as_deref()).await?;

    Ok(Json(ApiResponse {
        response,
        query_time_ms: start_time.elapsed().as_millis() as u64,
    }))
}

// Shared by every lookup route: metrics, timing and error tracking
async fn run_lookup(
    state: &AppState,
    target: &str,
    server: Option<&str>,
) -> Result<WhoisResponse, WhoisError> {
    let start_time = Instant::now();
    metrics::increment_requests(if server.is_some() { "pinned" } else { "auto" });

    let result = state.resolver.lookup(target, server).await;
    metrics::record_query_time(start_time.elapsed().as_millis() as u64);

    if let Err(e) = &result {
        warn!("Lookup for {:?} failed: {}", target, e);
        metrics::increment_errors(e.kind());
    }
    result
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.config.start_time.elapsed().as_secs(),
    })
}

async fn page_not_available() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "page not available")
}

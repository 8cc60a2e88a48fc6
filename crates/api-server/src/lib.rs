use analysis_orchestrator::AnalysisOrchestrator;
use anyhow::Context;
use axum::{body::Body, http::Request, middleware, Router};
use google_news_client::GoogleNewsClient;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use yahoo_client::YahooFinanceClient;

pub mod analyze_routes;
pub mod config;
pub mod error;
pub mod request_id;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

/// All routes with request ids, tracing and permissive CORS applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(analyze_routes::analyze_routes())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        "Cache TTL {}s, capacity {}, {} headlines per symbol",
        config.cache_ttl_secs,
        config.cache_max_entries,
        config.news_limit
    );

    let yahoo_config = config.yahoo_config();
    let yahoo = Arc::new(YahooFinanceClient::new(yahoo_config));
    let google_news = Arc::new(GoogleNewsClient::new(yahoo_config.news_timeout));
    let orchestrator = AnalysisOrchestrator::new(yahoo.clone(), yahoo, config.orchestrator_config())
        .with_fallback_news(google_news);
    let app = build_router(AppState {
        orchestrator: Arc::new(orchestrator),
    });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("TradePulse API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

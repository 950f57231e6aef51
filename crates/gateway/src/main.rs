//! ADS Demo Gateway
//!
//! HTTP entry point for the comparison demo.
//! Handles:
//! - Configuration and logging setup
//! - Corpus loading and backend selection
//! - Request routing
//! - Observability (logging, metrics, request ids)

mod handlers;

use adsdemo_common::{
    config::{AppConfig, ObservabilityConfig},
    errors::{AppError, Result},
    llm::select_backend,
    metrics, Comparator, CorpusStore,
};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub comparator: Comparator,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (.env, config files, APP__ environment)
    let config = AppConfig::load()?;

    init_tracing(&config.observability);
    info!(
        service = %config.observability.service_name,
        "Starting ADS demo gateway v{}",
        adsdemo_common::VERSION
    );

    // Initialize metrics
    if config.observability.metrics_port != 0 {
        install_metrics_exporter(config.observability.metrics_port)?;
    }
    metrics::register_metrics();

    // Load data and pick the backend once
    let store = Arc::new(CorpusStore::load(&config.data));
    let backend = Arc::new(select_backend(&config.llm));
    let state = AppState {
        comparator: Comparator::new(backend, store),
    };

    let app = create_router(state);

    let addr = parse_bind_address(&config)?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn parse_bind_address(config: &AppConfig) -> Result<SocketAddr> {
    let address = config.bind_address();
    address.parse().map_err(|e| AppError::Configuration {
        message: format!("invalid server address '{address}': {e}"),
    })
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Serve Prometheus metrics on their own port
fn install_metrics_exporter(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            metrics::GENERATION_BUCKETS,
        )?
        .install()?;
    info!(port, "Prometheus exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/questions", get(handlers::demo::questions))
        .route("/demo/run", post(handlers::demo::run_demo))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsdemo_common::{llm::MockBackend, PrecomputedEntry};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(precomputed: Vec<PrecomputedEntry>) -> Router {
        let store = CorpusStore::new(Vec::new(), precomputed);
        create_router(AppState {
            comparator: Comparator::new(Arc::new(MockBackend::new()), Arc::new(store)),
        })
    }

    fn wisdom_entry() -> PrecomputedEntry {
        PrecomputedEntry {
            question: "what is wisdom".to_string(),
            baseline: "B".to_string(),
            ads: "A".to_string(),
            context_bullets: vec!["x".to_string()],
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_loaded_data() {
        let response = app(vec![wisdom_entry()])
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["nodes_loaded"], 0);
        assert_eq!(body["precomputed_loaded"], 1);
        assert_eq!(body["provider"], "mock");
    }

    #[tokio::test]
    async fn test_questions_endpoint() {
        let response = app(Vec::new())
            .oneshot(Request::get("/questions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(
            body["questions"].as_array().map(Vec::len),
            Some(adsdemo_common::corpus::DEFAULT_QUESTIONS.len())
        );
    }

    #[tokio::test]
    async fn test_demo_run_uses_precomputed_answers() {
        let response = app(vec![wisdom_entry()])
            .oneshot(post_json("/demo/run", json!({"question": "what is wisdom?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["question"], "what is wisdom?");
        assert_eq!(body["baseline"]["answer"], "B");
        assert_eq!(body["ads"]["answer"], "A");
        assert_eq!(body["ads"]["nodes_used"], 1);
        assert_eq!(body["baseline"]["input_tokens"], 0);
    }

    #[tokio::test]
    async fn test_blank_question_uses_first_demo_question() {
        let response = app(vec![wisdom_entry()])
            .oneshot(post_json("/demo/run", json!({"question": "   "})))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["question"], adsdemo_common::corpus::DEFAULT_QUESTIONS[0]);
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let request = Request::post("/demo/run")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"question\": "))
            .unwrap();
        let response = app(Vec::new()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_bad_bind_address_is_configuration_error() {
        let mut config = AppConfig::default();
        assert!(parse_bind_address(&config).is_ok());

        config.server.host = "not a host".to_string();
        let err = parse_bind_address(&config).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_oversized_question_is_rejected() {
        let response = app(Vec::new())
            .oneshot(post_json(
                "/demo/run",
                json!({"question": "why ".repeat(handlers::demo::MAX_QUESTION_CHARS)}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["field"], "question");
    }
}

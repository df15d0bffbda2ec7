//! kline 캐시 프록시 서버.
//!
//! 설정을 읽고 캐시 저장소, 업스트림 커넥터, 폴링/플러시 파이프라인을 띄운 뒤
//! Axum 서버를 시작합니다.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use kline_api::metrics::setup_metrics_recorder;
use kline_api::middleware::metrics_layer;
use kline_api::routes::create_api_router;
use kline_api::service::MarketService;
use kline_api::state::AppState;
use kline_core::{init_logging, AppConfig, CacheBackend, LogConfig, ServerConfig};
use kline_data::{CacheStore, MemoryCache, RedisCache};
use kline_exchange::{BinanceClient, KlineSource};

/// 명령줄 인자.
#[derive(Debug, Parser)]
#[command(name = "kline-api", version, about = "Cache-aside kline proxy")]
struct Args {
    /// 설정 파일 경로 (없으면 기본값과 환경 변수만 사용)
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,
}

/// CORS 레이어. 조회 전용 API라 GET만 허용합니다.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([axum::http::header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    config: &ServerConfig,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router().with_state(state))
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(cors_layer())
}

/// 설정된 캐시 백엔드 연결.
async fn connect_cache(config: &AppConfig) -> Result<Arc<dyn CacheStore>, kline_data::DataError> {
    match config.cache.backend {
        CacheBackend::Redis => {
            let cache = RedisCache::connect(&config.redis).await?;
            Ok(Arc::new(cache))
        }
        CacheBackend::Memory => {
            warn!("메모리 캐시 사용 중 (프로세스 재시작 시 데이터 유실)");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;

    init_logging(LogConfig::from(&config.logging))?;

    info!(config = %args.config.display(), "Starting kline proxy...");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let cache = connect_cache(&config).await.map_err(|e| {
        error!(backend = ?config.cache.backend, error = %e, "캐시 연결 실패");
        e
    })?;

    let binance: Arc<dyn KlineSource> = Arc::new(BinanceClient::new(&config.binance)?);
    info!(url = %config.binance.klines_url, "Binance connector ready");

    // 전역 종료 토큰 (폴링 루프와 플러시 파이프라인이 구독)
    let shutdown_token = CancellationToken::new();

    let service = Arc::new(MarketService::start(
        cache,
        config.pipeline.channel_capacity,
        vec![binance],
        shutdown_token.clone(),
    ));

    let state = Arc::new(AppState::new(Arc::clone(&service)));
    info!(version = %state.version, "Application state initialized");

    let app = create_router(state, metrics_handle, &config.server);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");

    // 백그라운드 태스크 종료 대기 (최대 10초)
    let cleanup = tokio::time::timeout(Duration::from_secs(10), service.shutdown()).await;
    if cleanup.is_err() {
        warn!("Cleanup timeout, forcing shutdown");
    }

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C 핸들러 설치 실패");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    // 모든 백그라운드 태스크에 종료 시그널 전파
    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}

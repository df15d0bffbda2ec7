//! 캐시 우선 kline HTTP 프록시.
//!
//! # 모듈 구성
//!
//! - [`service`]: 캐시 조회와 폴링 시작을 묶는 `MarketService`
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{ApiResult, ErrorBody, ServiceError};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use service::MarketService;
pub use state::AppState;

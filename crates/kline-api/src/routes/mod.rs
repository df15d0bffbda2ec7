//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/kline` - 캐시 우선 kline 조회
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//!
//! `/metrics`는 별도 상태(Prometheus 핸들)를 쓰므로 바이너리에서 합칩니다.

pub mod health;
pub mod kline;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use kline::{kline_router, KlineQuery};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new().merge(kline_router()).merge(health_router())
}

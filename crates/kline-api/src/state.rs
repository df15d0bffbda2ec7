//! 모든 핸들러에서 공유되는 애플리케이션 상태.

use std::sync::Arc;

use crate::service::MarketService;

/// 애플리케이션 공유 상태.
///
/// `Arc`로 감싸 Axum의 State extractor로 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 캐시 우선 조회 서비스
    pub service: Arc<MarketService>,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(service: Arc<MarketService>) -> Self {
        Self {
            service,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

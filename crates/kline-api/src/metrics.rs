//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 캐시 읽기 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.
//! 폴링/플러시 메트릭은 각 crate에서 같은 레코더로 기록됩니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// 라우트에 매칭되지 않은 요청의 path 라벨.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Prometheus 메트릭 레코더를 설치하고 렌더링 핸들을 반환합니다.
///
/// # Errors
///
/// 레코더가 이미 설치되어 있거나 버킷 설정이 잘못되면 `BuildError`를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 캐시 메트릭
// ============================================================================

/// 캐시 읽기 결과 기록 (`hit` | `miss` | `error`).
pub fn record_cache_read(result: &'static str) {
    counter!("kline_cache_reads_total", "result" => result).increment(1);
}

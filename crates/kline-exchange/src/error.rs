//! 업스트림 에러 타입.

use thiserror::Error;

/// 업스트림 kline 조회 에러.
///
/// 모든 variant는 폴링 루프 안에서 로그만 남기고 해당 tick을 건너뜁니다.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 업스트림이 비정상 상태 코드와 함께 돌려준 에러
    #[error("API error {code}: {message}")]
    ApiError { code: i32, message: String },

    /// 파싱/스키마 검증 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            ExchangeError::NetworkError(err.to_string())
        } else {
            ExchangeError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

//! API 에러 타입.
//!
//! 모든 실패는 `500`과 `{"error": "<message>"}` 본문으로 응답합니다.

use axum::{http::StatusCode, Json};
use kline_core::CoreError;
use kline_data::DataError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 읽기 경로 에러.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 요청 파라미터 검증 실패
    #[error(transparent)]
    Core(#[from] CoreError),

    /// 캐시 읽기 또는 역직렬화 실패
    #[error(transparent)]
    Data(#[from] DataError),
}

/// 에러 응답 본문.
///
/// ```json
/// { "error": "currency missing" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

/// `500` 에러 응답 생성.
pub fn internal_error(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(message)),
    )
}

impl From<ServiceError> for (StatusCode, Json<ErrorBody>) {
    fn from(err: ServiceError) -> Self {
        internal_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ErrorBody::new("symbol missing")).unwrap();
        assert_eq!(body, serde_json::json!({"error": "symbol missing"}));
    }

    #[test]
    fn test_service_error_maps_to_500() {
        let err = ServiceError::Data(DataError::CacheError("connection refused".to_string()));
        let (status, Json(body)) = err.into();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Cache error: connection refused");
    }
}

//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 캐시 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 캐시 저장소 오류 (연결, 명령 실패)
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        DataError::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

//! 핵심 에러 타입.
//!
//! 요청 검증과 설정 로딩 과정에서 발생하는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 잘못된 입력 (빈 심볼, 알 수 없는 간격 등)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 설정 에러
    #[error("configuration error: {0}")]
    Config(String),

    /// 직렬화 에러
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidInput("unknown interval 7m".to_string());
        assert_eq!(err.to_string(), "invalid input: unknown interval 7m");
    }

    #[test]
    fn test_from_serde_json() {
        let err: CoreError = serde_json::from_str::<u64>("oops").unwrap_err().into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}

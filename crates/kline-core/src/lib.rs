//! # Kline Core
//!
//! kline 캐시 프록시의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 캔들(kline) 샘플 구조체
//! - 캔들 간격(interval) 테이블
//! - 캐시/중복 제거 키 (`ProviderKey`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use self::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;

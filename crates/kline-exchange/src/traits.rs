//! provider 및 업스트림 소스 trait 정의.

use async_trait::async_trait;
use kline_core::{Kline, ProviderKey};

use crate::ExchangeError;

/// 업스트림 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 시장 데이터 provider.
///
/// 키 하나에 대해 백그라운드 폴링 루프가 존재하도록 보장하고, 그 결과를
/// 공유 출력 채널로 보냅니다. 시장(거래소)마다 하나의 구현을 둡니다.
pub trait Provider: Send + Sync {
    /// provider 이름 (로그/메트릭 라벨).
    fn name(&self) -> &str;

    /// `key`에 대한 폴링 루프를 보장합니다.
    ///
    /// 처음 보는 키면 정확히 하나의 루프를 시작하고, 이미 열린 키면 아무것도 하지
    /// 않습니다. 동시에 같은 키로 호출돼도 루프는 하나만 시작됩니다.
    /// 현재 구현은 항상 `true`를 반환합니다.
    fn open(&self, key: &ProviderKey) -> bool;

    /// 지금까지 연 키의 수.
    fn open_count(&self) -> usize;
}

/// 업스트림 kline 소스.
///
/// 키 하나에 대해 정규화된 배치 하나를 가져옵니다. 재시도는 하지 않습니다.
#[async_trait]
pub trait KlineSource: Send + Sync {
    /// 소스 이름.
    fn name(&self) -> &str;

    /// 배치 하나를 조회합니다.
    ///
    /// # Errors
    ///
    /// - `ExchangeError::NetworkError` / `Timeout`: 전송 실패
    /// - `ExchangeError::ApiError`: 비정상 상태 코드
    /// - `ExchangeError::ParseError`: 응답 스키마 불일치
    async fn fetch_klines(&self, key: &ProviderKey) -> ExchangeResult<Vec<Kline>>;
}

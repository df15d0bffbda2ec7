//! 캔들(kline) 샘플.
//!
//! provider가 만들어 내는 정규화된 OHLCV 데이터 포인트입니다. 가격과 거래량은
//! 업스트림이 보낸 10진수 문자열을 그대로 보존합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::types::ProviderKey;

/// OHLCV 캔들 샘플.
///
/// JSON 필드명은 외부 클라이언트와의 계약이므로 변경하면 안 됩니다.
/// `key`와 `interval`은 내부 라우팅용이며 직렬화되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kline {
    /// 캔들 시작 시간 (epoch 밀리초)
    #[serde(rename = "time")]
    pub start_time: u64,
    /// 캔들 종료 시간 (epoch 밀리초)
    pub end_time: u64,
    /// 저가
    #[serde(rename = "min_price")]
    pub low: String,
    /// 고가
    #[serde(rename = "max_price")]
    pub high: String,
    /// 시가
    #[serde(rename = "opened_price")]
    pub open: String,
    /// 종가
    #[serde(rename = "closed_price")]
    pub close: String,
    /// 거래량
    pub volume: String,
    /// 이 샘플을 만든 폴링 루프의 키 (`SYMBOL_CURRENCY_INTERVAL`)
    #[serde(skip)]
    pub key: String,
    /// 샘플링 주기 (캐시 TTL)
    #[serde(skip)]
    pub interval: Duration,
}

impl Kline {
    /// 새 캔들을 생성하고 폴링 키와 주기를 기록합니다.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        key: &ProviderKey,
        start_time: u64,
        end_time: u64,
        open: String,
        high: String,
        low: String,
        close: String,
        volume: String,
    ) -> Self {
        Self {
            start_time,
            end_time,
            low,
            high,
            open,
            close,
            volume,
            key: key.cache_key(),
            interval: key.interval().period(),
        }
    }

    /// 가격/거래량 문자열이 모두 10진수로 해석되는지 확인합니다.
    pub fn has_decimal_fields(&self) -> bool {
        [&self.open, &self.high, &self.low, &self.close, &self.volume]
            .iter()
            .all(|v| Decimal::from_str(v).is_ok())
    }
}

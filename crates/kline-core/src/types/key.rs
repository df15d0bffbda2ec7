//! 캐시 및 폴링 중복 제거에 쓰이는 키.
//!
//! `(symbol, currency, interval)` 조합을 정규화한 문자열 `SYMBOL_CURRENCY_INTERVAL`이
//! 캐시 키이자 폴링 레지스트리 키입니다. 숫자 ID는 없습니다.

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::Interval;

/// 정규화된 provider 키.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderKey {
    symbol: String,
    currency: String,
    interval: Interval,
}

impl ProviderKey {
    /// 원시 요청 값에서 키를 생성합니다.
    ///
    /// 심볼과 통화는 공백을 제거한 뒤 대문자로 정규화합니다.
    /// 간격 토큰이 테이블에 없으면 `CoreError::InvalidInput`을 반환합니다.
    pub fn new(symbol: &str, currency: &str, interval: &str) -> CoreResult<Self> {
        let symbol = normalize_asset("symbol", symbol)?;
        let currency = normalize_asset("currency", currency)?;
        let interval = interval.trim().parse::<Interval>()?;

        Ok(Self {
            symbol,
            currency,
            interval,
        })
    }

    /// 이미 파싱된 간격으로 키를 생성합니다.
    pub fn with_interval(symbol: &str, currency: &str, interval: Interval) -> CoreResult<Self> {
        Ok(Self {
            symbol: normalize_asset("symbol", symbol)?,
            currency: normalize_asset("currency", currency)?,
            interval,
        })
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// 업스트림 거래쌍 심볼 (예: `NEOUSDT`).
    pub fn pair(&self) -> String {
        format!("{}{}", self.symbol, self.currency)
    }

    /// 캐시 및 레지스트리 키 (예: `NEO_USDT_5m`).
    pub fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.symbol, self.currency, self.interval)
    }
}

fn normalize_asset(field: &str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput(format!("{} missing", field)));
    }
    Ok(trimmed.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cache_key_format() {
        let key = ProviderKey::new("neo", "usdt", "5m").unwrap();
        assert_eq!(key.cache_key(), "NEO_USDT_5m");
        assert_eq!(key.pair(), "NEOUSDT");
        assert_eq!(key.interval(), Interval::M5);
    }

    #[test]
    fn test_interval_token_not_uppercased() {
        let key = ProviderKey::new("btc", "usdt", "1M").unwrap();
        assert_eq!(key.cache_key(), "BTC_USDT_1M");

        let key = ProviderKey::new("btc", "usdt", "1m").unwrap();
        assert_eq!(key.cache_key(), "BTC_USDT_1m");
    }

    #[test]
    fn test_rejects_unknown_interval() {
        let err = ProviderKey::new("NEO", "USDT", "7m").unwrap_err();
        assert!(err.to_string().contains("unknown interval 7m"));
    }

    #[test]
    fn test_rejects_blank_fields() {
        let err = ProviderKey::new("  ", "USDT", "5m").unwrap_err();
        assert!(err.to_string().contains("symbol missing"));

        let err = ProviderKey::new("NEO", "", "5m").unwrap_err();
        assert!(err.to_string().contains("currency missing"));
    }

    proptest! {
        #[test]
        fn prop_key_is_case_insensitive(
            symbol in "[a-zA-Z]{1,8}",
            currency in "[a-zA-Z]{1,6}",
            idx in 0usize..15,
        ) {
            let interval = Interval::ALL[idx];
            let lower = ProviderKey::with_interval(&symbol.to_lowercase(), &currency.to_lowercase(), interval).unwrap();
            let upper = ProviderKey::with_interval(&symbol.to_uppercase(), &currency.to_uppercase(), interval).unwrap();
            prop_assert_eq!(&lower, &upper);
            prop_assert_eq!(lower.cache_key(), upper.cache_key());
        }

        #[test]
        fn prop_cache_key_reparses(
            symbol in "[A-Z]{1,8}",
            currency in "[A-Z]{1,6}",
            idx in 0usize..15,
        ) {
            let interval = Interval::ALL[idx];
            let key = ProviderKey::with_interval(&symbol, &currency, interval).unwrap();
            let cache_key = key.cache_key();
            let parts: Vec<&str> = cache_key.splitn(3, '_').collect();
            let reparsed = ProviderKey::new(parts[0], parts[1], parts[2]).unwrap();
            prop_assert_eq!(key, reparsed);
        }
    }
}

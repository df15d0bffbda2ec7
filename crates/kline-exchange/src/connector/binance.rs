//! Binance kline 커넥터.
//!
//! 공개 REST kline 엔드포인트 하나만 사용합니다. 인증은 필요 없습니다.

use async_trait::async_trait;
use kline_core::{BinanceConfig, Kline, ProviderKey};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::traits::{ExchangeResult, KlineSource};
use crate::ExchangeError;

// ============================================================================
// API 응답 타입
// ============================================================================

/// 비정상 상태 코드와 함께 오는 에러 본문.
#[derive(Debug, Deserialize)]
struct BinanceError {
    code: i32,
    msg: String,
}

// kline 튜플 인덱스. 7번 이후(거래대금, 체결 수 등)는 사용하지 않는다.
const IDX_OPEN_TIME: usize = 0;
const IDX_OPEN: usize = 1;
const IDX_HIGH: usize = 2;
const IDX_LOW: usize = 3;
const IDX_CLOSE: usize = 4;
const IDX_VOLUME: usize = 5;
const IDX_CLOSE_TIME: usize = 6;
const MIN_TUPLE_LEN: usize = 7;

// ============================================================================
// Binance 클라이언트
// ============================================================================

/// Binance kline 클라이언트.
pub struct BinanceClient {
    klines_url: String,
    client: Client,
}

impl BinanceClient {
    /// 새 Binance 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: &BinanceConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e))
            })?;

        Ok(Self {
            klines_url: config.klines_url.clone(),
            client,
        })
    }

    /// kline 요청 파라미터.
    fn build_params(key: &ProviderKey) -> [(&'static str, String); 2] {
        [
            ("symbol", key.pair()),
            ("interval", key.interval().as_token().to_string()),
        ]
    }

    /// API 응답 처리.
    async fn handle_response(response: reqwest::Response) -> ExchangeResult<Vec<Value>> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        // 에러 응답 파싱 시도
        match serde_json::from_str::<BinanceError>(&body) {
            Ok(error) => Err(ExchangeError::ApiError {
                code: error.code,
                message: error.msg,
            }),
            Err(_) => Err(ExchangeError::ApiError {
                code: status.as_u16() as i32,
                message: body,
            }),
        }
    }
}

/// 튜플 하나를 검증하고 `Kline`으로 변환합니다.
///
/// 형태가 하나라도 어긋나면 배치 전체를 버릴 수 있도록 에러를 반환합니다.
pub(crate) fn parse_kline(key: &ProviderKey, index: usize, raw: &Value) -> ExchangeResult<Kline> {
    let tuple = raw
        .as_array()
        .ok_or_else(|| ExchangeError::ParseError(format!("kline #{} is not an array", index)))?;

    if tuple.len() < MIN_TUPLE_LEN {
        return Err(ExchangeError::ParseError(format!(
            "kline #{} has {} fields, expected at least {}",
            index,
            tuple.len(),
            MIN_TUPLE_LEN
        )));
    }

    let time_at = |i: usize| {
        tuple[i].as_u64().ok_or_else(|| {
            ExchangeError::ParseError(format!("kline #{} field {} is not a timestamp", index, i))
        })
    };
    let text_at = |i: usize| {
        tuple[i].as_str().map(str::to_string).ok_or_else(|| {
            ExchangeError::ParseError(format!("kline #{} field {} is not a string", index, i))
        })
    };

    let kline = Kline::new(
        key,
        time_at(IDX_OPEN_TIME)?,
        time_at(IDX_CLOSE_TIME)?,
        text_at(IDX_OPEN)?,
        text_at(IDX_HIGH)?,
        text_at(IDX_LOW)?,
        text_at(IDX_CLOSE)?,
        text_at(IDX_VOLUME)?,
    );

    if !kline.has_decimal_fields() {
        return Err(ExchangeError::ParseError(format!(
            "kline #{} has a non-decimal price or volume",
            index
        )));
    }

    Ok(kline)
}

#[async_trait]
impl KlineSource for BinanceClient {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch_klines(&self, key: &ProviderKey) -> ExchangeResult<Vec<Kline>> {
        let params = Self::build_params(key);
        debug!(url = %self.klines_url, symbol = %params[0].1, interval = %params[1].1, "GET klines");

        let response = self
            .client
            .get(&self.klines_url)
            .query(&params)
            .send()
            .await?;

        let raw = Self::handle_response(response).await?;

        raw.iter()
            .enumerate()
            .map(|(i, tuple)| parse_kline(key, i, tuple))
            .collect()
    }
}

//! kline 조회 endpoint.
//!
//! `GET /kline?symbol=NEO&currency=USDT&interval=5m`
//!
//! 캐시에 데이터가 없으면 폴링을 시작시키고 `[]`를 반환합니다. 클라이언트는
//! 다시 요청해서 채워진 데이터를 받습니다.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use kline_core::Kline;
use std::sync::Arc;

use crate::error::{internal_error, ApiResult};
use crate::state::AppState;

/// 쿼리 파라미터.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct KlineQuery {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub interval: Option<String>,
}

impl KlineQuery {
    /// 디코딩된 쿼리 쌍에서 만듭니다.
    ///
    /// 같은 이름이 반복되면 첫 번째 값을 쓰고, 모르는 이름은 무시합니다.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "symbol" => &mut query.symbol,
                "currency" => &mut query.currency,
                "interval" => &mut query.interval,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// 필수 파라미터 추출. 비어 있어도 누락으로 본다.
fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| internal_error(format!("{} missing", field)))
}

/// kline 조회 핸들러.
///
/// symbol, currency, interval 순서로 검사하며 처음 누락된 필드를 보고합니다.
/// 쿼리 문자열을 해석하지 못해도 JSON 에러 본문으로 응답합니다.
pub async fn get_kline(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<Vec<Kline>>> {
    let Query(pairs) = query.map_err(|rejection| internal_error(rejection.body_text()))?;
    let query = KlineQuery::from_pairs(pairs);

    let symbol = required(query.symbol, "symbol")?;
    let currency = required(query.currency, "currency")?;
    let interval = required(query.interval, "interval")?;

    let klines = state.service.kline(&symbol, &currency, &interval).await?;

    Ok(Json(klines))
}

/// kline 라우터 생성.
pub fn kline_router() -> Router<Arc<AppState>> {
    Router::new().route("/kline", get(get_kline))
}

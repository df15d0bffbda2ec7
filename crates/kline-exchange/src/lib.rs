//! # Kline Exchange
//!
//! 업스트림 시장 데이터 연동 및 키별 폴링 루프.
//!
//! - `connector`: 업스트림 REST 커넥터 (Binance)
//! - `registry`: 키별 폴링 루프 중복 제거
//! - `poller`: 중복 제거된 폴링 루프를 띄우는 `PollingProvider`

pub mod connector;
pub mod error;
pub mod poller;
pub mod registry;
pub mod traits;

pub use connector::BinanceClient;
pub use error::ExchangeError;
pub use poller::PollingProvider;
pub use registry::DedupRegistry;
pub use traits::{ExchangeResult, KlineSource, Provider};

//! 업스트림 커넥터.

pub mod binance;

pub use binance::BinanceClient;

//! 도메인 모델.

pub mod kline;

pub use kline::*;

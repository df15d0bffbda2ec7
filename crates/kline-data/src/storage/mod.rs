//! 캐시 저장소 구현.

pub mod memory;
pub mod redis;

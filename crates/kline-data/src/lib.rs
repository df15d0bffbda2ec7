//! 캐시 저장소 및 배치 플러시.
//!
//! 이 crate는 다음을 제공합니다:
//! - 캐시 저장소 추상화 (`CacheStore`)
//! - Redis 및 메모리 캐시 구현
//! - 폴링 루프가 보낸 배치를 캐시에 기록하는 플러시 파이프라인

pub mod error;
pub mod flush;
pub mod storage;
pub mod store;

pub use error::{DataError, Result};
pub use flush::{FlushOutcome, FlushPipeline};
pub use storage::memory::MemoryCache;
pub use storage::redis::RedisCache;
pub use store::CacheStore;

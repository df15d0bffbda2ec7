//! 캐시 저장소 trait.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// 문자열 키/값 캐시 저장소.
///
/// 읽기 경로와 플러시 파이프라인이 함께 사용합니다. 미스는 에러가 아니라
/// `Ok(None)`으로 구분됩니다.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 값을 읽습니다. 없거나 만료됐으면 `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 값을 TTL과 함께 덮어씁니다.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// 저장소가 응답하는지 확인합니다.
    async fn ping(&self) -> Result<bool>;
}

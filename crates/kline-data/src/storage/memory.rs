//! 프로세스 내 메모리 캐시.
//!
//! 로컬 실행과 테스트용. 만료 시각은 `tokio::time::Instant` 기준이라
//! 일시정지된 테스트 시계를 그대로 따릅니다.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::Result;
use crate::store::CacheStore;

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// TTL을 지원하는 메모리 캐시.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 만료되지 않은 항목 수.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        // 만료된 항목은 쓰기 시점에 정리
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn ping(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_miss_is_none() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("NEO_USDT_5m").await.unwrap(), None);
        assert!(cache.ping().await.unwrap());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let cache = MemoryCache::new();
        cache
            .set("NEO_USDT_5m", "[1]".to_string(), Duration::from_secs(300))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(
            cache.get("NEO_USDT_5m").await.unwrap().as_deref(),
            Some("[1]")
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("NEO_USDT_5m").await.unwrap(), None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_ttl() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("K", "old".to_string(), ttl).await.unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        cache.set("K", "new".to_string(), ttl).await.unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(cache.get("K").await.unwrap().as_deref(), Some("new"));
    }
}

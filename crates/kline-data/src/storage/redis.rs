//! Redis 캐시 구현.

use async_trait::async_trait;
use kline_core::RedisConfig;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client,
};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

use crate::error::{DataError, Result};
use crate::store::CacheStore;

/// 연결 시도당 재시도 횟수.
const CONNECT_RETRIES: usize = 2;
/// 연결 시도 제한 시간.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis 연결 래퍼.
///
/// 연결은 첫 명령 때 맺고, 끊기면 `ConnectionManager`가 다시 연결합니다.
/// 시작 시 Redis가 내려가 있어도 서버는 뜨고, 캐시 명령은 연결될 때까지 에러를 냅니다.
pub struct RedisCache {
    client: Client,
    manager: OnceCell<ConnectionManager>,
}

impl RedisCache {
    /// URL을 검증하고 첫 연결을 시도합니다.
    ///
    /// 첫 연결 실패는 경고만 남기고 이후 명령에서 다시 시도합니다.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        info!("Connecting to Redis...");

        let client = Client::open(config.url.as_str())
            .map_err(|e| DataError::ConfigError(format!("잘못된 Redis URL: {}", e)))?;

        let cache = Self {
            client,
            manager: OnceCell::new(),
        };

        match cache.connection().await {
            Ok(_) => info!("Redis connection established"),
            Err(e) => warn!(error = %e, "Redis에 연결할 수 없음, 다음 명령에서 재시도"),
        }

        Ok(cache)
    }

    /// 공유 연결 관리자 복제본. 아직 연결 전이면 지금 연결합니다.
    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(CONNECT_RETRIES)
                    .set_connection_timeout(CONNECT_TIMEOUT);
                self.client
                    .get_connection_manager_with_config(config)
                    .await
                    .map_err(DataError::from)
            })
            .await?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        // EX 0은 Redis가 거부한다
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<bool> {
        let mut conn = self.connection().await?;
        let result: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(result == "PONG")
    }
}

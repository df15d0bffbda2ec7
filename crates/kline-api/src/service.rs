//! 캐시 우선 kline 조회 서비스.
//!
//! 캐시에 있으면 그대로 돌려주고, 없으면 provider에게 폴링 루프를 열게 한 뒤
//! 빈 목록을 즉시 반환합니다. 조회 결과를 기다리지 않습니다.

use std::sync::Arc;

use kline_core::{Kline, ProviderKey};
use kline_data::{CacheStore, DataError, FlushPipeline};
use kline_exchange::{KlineSource, PollingProvider, Provider};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::metrics::record_cache_read;

/// 시장 데이터 서비스.
///
/// provider는 등록 순서대로 시도하며, 처음으로 `open`에 성공한 provider가
/// 해당 키를 맡습니다.
pub struct MarketService {
    cache: Arc<dyn CacheStore>,
    providers: Vec<Arc<dyn Provider>>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl MarketService {
    /// provider와 플러시 파이프라인을 만들고 백그라운드 태스크를 시작합니다.
    ///
    /// 모든 폴링 루프는 용량 `channel_capacity`인 채널 하나를 공유합니다.
    pub fn start(
        cache: Arc<dyn CacheStore>,
        channel_capacity: usize,
        sources: Vec<Arc<dyn KlineSource>>,
        shutdown: CancellationToken,
    ) -> Self {
        // 용량 0인 채널은 만들 수 없다
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));
        let tasks = TaskTracker::new();

        let providers = sources
            .into_iter()
            .map(|source| {
                Arc::new(PollingProvider::new(
                    source,
                    tx.clone(),
                    shutdown.clone(),
                    tasks.clone(),
                )) as Arc<dyn Provider>
            })
            .collect();

        tasks.spawn(FlushPipeline::new(Arc::clone(&cache), rx).run(shutdown.clone()));

        info!(capacity = channel_capacity.max(1), "시장 데이터 서비스 시작");

        Self::with_providers(cache, providers, shutdown, tasks)
    }

    /// 이미 만들어진 provider로 서비스를 구성합니다.
    pub fn with_providers(
        cache: Arc<dyn CacheStore>,
        providers: Vec<Arc<dyn Provider>>,
        shutdown: CancellationToken,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            cache,
            providers,
            shutdown,
            tasks,
        }
    }

    /// kline 조회.
    ///
    /// # Errors
    ///
    /// - 파라미터가 비었거나 간격 토큰을 모르면 `ServiceError::Core`
    /// - 캐시 읽기/역직렬화에 실패하면 `ServiceError::Data` (이 경우 폴링을 열지 않음)
    pub async fn kline(
        &self,
        symbol: &str,
        currency: &str,
        interval: &str,
    ) -> Result<Vec<Kline>, ServiceError> {
        let key = ProviderKey::new(symbol, currency, interval)?;
        let cache_key = key.cache_key();

        let cached = match self.cache.get(&cache_key).await {
            Ok(cached) => cached,
            Err(e) => {
                record_cache_read("error");
                warn!(key = %cache_key, error = %e, "캐시 읽기 실패");
                return Err(e.into());
            }
        };

        match cached {
            Some(json) => {
                record_cache_read("hit");
                let klines: Vec<Kline> = serde_json::from_str(&json).map_err(DataError::from)?;
                Ok(klines)
            }
            None => {
                record_cache_read("miss");
                self.open(&key);
                Ok(Vec::new())
            }
        }
    }

    fn open(&self, key: &ProviderKey) {
        for provider in &self.providers {
            if provider.open(key) {
                debug!(key = %key, provider = provider.name(), "캐시 미스, 폴링 요청");
                return;
            }
        }
        warn!(key = %key, "폴링을 열 수 있는 provider가 없습니다");
    }

    /// 캐시 저장소 응답 여부.
    pub async fn is_cache_healthy(&self) -> bool {
        matches!(self.cache.ping().await, Ok(true))
    }

    /// 모든 provider가 연 폴링 루프 수.
    pub fn open_count(&self) -> usize {
        self.providers.iter().map(|p| p.open_count()).sum()
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// 모든 백그라운드 태스크에 종료를 알리고 끝날 때까지 기다립니다.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;
        info!("시장 데이터 서비스 종료");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kline_data::MemoryCache;
    use kline_exchange::ExchangeResult;
    use std::sync::Mutex;
    use std::time::Duration;

    /// 호출된 키를 기록하는 provider.
    struct RecordingProvider {
        name: &'static str,
        accept: bool,
        opened: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        fn new(name: &'static str, accept: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                accept,
                opened: Mutex::new(Vec::new()),
            })
        }

        fn opened(&self) -> Vec<String> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn open(&self, key: &ProviderKey) -> bool {
            self.opened.lock().unwrap().push(key.cache_key());
            self.accept
        }

        fn open_count(&self) -> usize {
            self.opened.lock().unwrap().len()
        }
    }

    /// 항상 같은 캔들 하나를 돌려주는 소스.
    struct StaticSource;

    #[async_trait]
    impl KlineSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch_klines(&self, key: &ProviderKey) -> ExchangeResult<Vec<Kline>> {
            Ok(vec![Kline::new(
                key,
                1_000,
                2_000,
                "1".to_string(),
                "2".to_string(),
                "0.5".to_string(),
                "1.5".to_string(),
                "10".to_string(),
            )])
        }
    }

    /// 모든 읽기가 실패하는 저장소.
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> kline_data::Result<Option<String>> {
            Err(DataError::CacheError("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> kline_data::Result<()> {
            Err(DataError::CacheError("connection refused".to_string()))
        }

        async fn ping(&self) -> kline_data::Result<bool> {
            Err(DataError::CacheError("connection refused".to_string()))
        }
    }

    fn service_with(
        cache: Arc<dyn CacheStore>,
        providers: Vec<Arc<dyn Provider>>,
    ) -> MarketService {
        MarketService::with_providers(
            cache,
            providers,
            CancellationToken::new(),
            TaskTracker::new(),
        )
    }

    #[tokio::test]
    async fn test_miss_returns_empty_and_opens_first_accepting_provider() {
        let declines = RecordingProvider::new("declines", false);
        let accepts = RecordingProvider::new("accepts", true);
        let never = RecordingProvider::new("never", true);
        let service = service_with(
            Arc::new(MemoryCache::new()),
            vec![
                declines.clone() as Arc<dyn Provider>,
                accepts.clone() as Arc<dyn Provider>,
                never.clone() as Arc<dyn Provider>,
            ],
        );

        let klines = service.kline("neo", "usdt", "5m").await.unwrap();

        assert!(klines.is_empty());
        assert_eq!(declines.opened(), vec!["NEO_USDT_5m"]);
        assert_eq!(accepts.opened(), vec!["NEO_USDT_5m"]);
        assert!(never.opened().is_empty());
    }

    #[tokio::test]
    async fn test_hit_returns_entry_without_opening() {
        let cache = Arc::new(MemoryCache::new());
        let stored = r#"[{"time":1,"end_time":2,"min_price":"0.5","max_price":"2","opened_price":"1","closed_price":"1.5","volume":"10"}]"#;
        cache
            .set("NEO_USDT_5m", stored.to_string(), Duration::from_secs(300))
            .await
            .unwrap();

        let provider = RecordingProvider::new("p", true);
        let service = service_with(cache, vec![provider.clone() as Arc<dyn Provider>]);

        let klines = service.kline("NEO", "USDT", "5m").await.unwrap();

        assert_eq!(klines.len(), 1);
        assert_eq!(klines[0].start_time, 1);
        assert_eq!(klines[0].high, "2");
        assert_eq!(serde_json::to_string(&klines).unwrap(), stored);
        assert!(provider.opened().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_error() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set("NEO_USDT_5m", "not json".to_string(), Duration::from_secs(300))
            .await
            .unwrap();
        let provider = RecordingProvider::new("p", true);
        let service = service_with(cache, vec![provider.clone() as Arc<dyn Provider>]);

        let err = service.kline("neo", "usdt", "5m").await.unwrap_err();
        assert!(matches!(err, ServiceError::Data(DataError::SerializationError(_))));
        assert!(provider.opened().is_empty());
    }

    #[tokio::test]
    async fn test_store_error_propagates_without_opening() {
        let provider = RecordingProvider::new("p", true);
        let service = service_with(Arc::new(BrokenStore), vec![provider.clone() as Arc<dyn Provider>]);

        let err = service.kline("neo", "usdt", "5m").await.unwrap_err();
        assert!(matches!(err, ServiceError::Data(DataError::CacheError(_))));
        assert!(provider.opened().is_empty());
        assert!(!service.is_cache_healthy().await);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_cache() {
        let provider = RecordingProvider::new("p", true);
        let service = service_with(Arc::new(BrokenStore), vec![provider.clone() as Arc<dyn Provider>]);

        let err = service.kline("neo", "", "5m").await.unwrap_err();
        assert!(err.to_string().contains("currency missing"));

        let err = service.kline("neo", "usdt", "7m").await.unwrap_err();
        assert!(err.to_string().contains("7m"));

        assert!(provider.opened().is_empty());
    }

    #[tokio::test]
    async fn test_start_polls_and_flushes_into_cache() {
        let cache = Arc::new(MemoryCache::new());
        let service = MarketService::start(
            cache.clone(),
            4,
            vec![Arc::new(StaticSource) as Arc<dyn KlineSource>],
            CancellationToken::new(),
        );
        assert_eq!(service.provider_count(), 1);

        assert!(service.kline("neo", "usdt", "1h").await.unwrap().is_empty());
        assert_eq!(service.open_count(), 1);

        let mut klines = Vec::new();
        for _ in 0..100 {
            klines = service.kline("neo", "usdt", "1h").await.unwrap();
            if !klines.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(klines.len(), 1);
        assert_eq!(klines[0].start_time, 1_000);
        assert_eq!(service.open_count(), 1);

        service.shutdown().await;
    }
}

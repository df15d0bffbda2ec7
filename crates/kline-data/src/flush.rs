//! 배치 플러시 파이프라인.
//!
//! 모든 폴링 루프가 공유하는 채널의 단일 소비자입니다. 배치 하나를 통째로 JSON
//! 배열로 직렬화해 첫 샘플의 키에 첫 샘플의 주기를 TTL로 덮어씁니다.

use std::sync::Arc;

use kline_core::Kline;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::store::CacheStore;

/// 배치 하나의 처리 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// 캐시에 기록됨
    Written,
    /// 빈 배치라 건너뜀
    Empty,
}

impl FlushOutcome {
    fn as_label(&self) -> &'static str {
        match self {
            FlushOutcome::Written => "written",
            FlushOutcome::Empty => "empty",
        }
    }
}

/// 공유 채널을 비우며 캐시에 기록하는 파이프라인.
pub struct FlushPipeline {
    cache: Arc<dyn CacheStore>,
    rx: mpsc::Receiver<Vec<Kline>>,
}

impl FlushPipeline {
    pub fn new(cache: Arc<dyn CacheStore>, rx: mpsc::Receiver<Vec<Kline>>) -> Self {
        Self { cache, rx }
    }

    /// 채널이 닫히거나 `shutdown`이 취소될 때까지 배치를 처리합니다.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("플러시 파이프라인 시작");

        loop {
            let batch = tokio::select! {
                _ = shutdown.cancelled() => break,
                batch = self.rx.recv() => match batch {
                    Some(batch) => batch,
                    None => break,
                },
            };

            match self.write_batch(batch).await {
                Ok(outcome) => record(outcome.as_label()),
                Err(e) => {
                    record("error");
                    error!(error = %e, "배치 기록 실패, 배치를 버립니다");
                }
            }
        }

        info!("플러시 파이프라인 종료");
    }

    /// 배치 하나를 기록합니다.
    pub async fn write_batch(&self, batch: Vec<Kline>) -> Result<FlushOutcome> {
        let Some(first) = batch.first() else {
            return Ok(FlushOutcome::Empty);
        };

        let key = first.key.clone();
        let ttl = first.interval;
        let json = serde_json::to_string(&batch)?;

        self.cache.set(&key, json, ttl).await?;
        debug!(key = %key, count = batch.len(), ttl_secs = ttl.as_secs(), "배치 기록");

        Ok(FlushOutcome::Written)
    }
}

fn record(result: &'static str) {
    metrics::counter!("kline_flush_total", "result" => result).increment(1);
}

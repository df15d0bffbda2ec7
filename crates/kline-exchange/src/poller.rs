//! 키별 폴링 루프.
//!
//! 처음 요청된 키마다 백그라운드 태스크 하나가 업스트림을 주기적으로 조회하고,
//! 결과 배치를 공유 채널로 보냅니다. 채널은 모든 루프가 함께 쓰므로 채널이
//! 가득 차면 모든 키의 발행이 함께 대기합니다.

use std::sync::Arc;

use kline_core::{Kline, ProviderKey};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::registry::DedupRegistry;
use crate::traits::{KlineSource, Provider};
use crate::ExchangeError;

/// 중복 제거된 폴링 루프를 관리하는 provider.
pub struct PollingProvider {
    source: Arc<dyn KlineSource>,
    registry: DedupRegistry,
    output: mpsc::Sender<Vec<Kline>>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl PollingProvider {
    /// 새 provider 생성.
    ///
    /// 루프는 `tasks`에 등록되고 `shutdown`이 취소되면 종료됩니다.
    pub fn new(
        source: Arc<dyn KlineSource>,
        output: mpsc::Sender<Vec<Kline>>,
        shutdown: CancellationToken,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            source,
            registry: DedupRegistry::new(),
            output,
            shutdown,
            tasks,
        }
    }
}

impl Provider for PollingProvider {
    fn name(&self) -> &str {
        self.source.name()
    }

    fn open(&self, key: &ProviderKey) -> bool {
        if !self.registry.insert_if_absent(&key.cache_key()) {
            return true;
        }

        let poll = PollLoop {
            key: key.clone(),
            source: Arc::clone(&self.source),
            output: self.output.clone(),
            shutdown: self.shutdown.clone(),
        };
        self.tasks.spawn(poll.run());

        metrics::counter!(
            "kline_poll_loops_started_total",
            "provider" => self.source.name().to_string()
        )
        .increment(1);
        info!(key = %key, provider = self.source.name(), "폴링 루프 시작");

        true
    }

    fn open_count(&self) -> usize {
        self.registry.len()
    }
}

/// 키 하나에 대한 폴링 루프.
struct PollLoop {
    key: ProviderKey,
    source: Arc<dyn KlineSource>,
    output: mpsc::Sender<Vec<Kline>>,
    shutdown: CancellationToken,
}

impl PollLoop {
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.key.interval().period());
        // 느린 조회 뒤에 밀린 tick을 몰아서 실행하지 않는다
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let fetched = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.source.fetch_klines(&self.key) => result,
            };

            let batch = match fetched {
                Ok(batch) => {
                    self.record_fetch("ok");
                    batch
                }
                Err(e) => {
                    self.record_fetch("error");
                    self.log_fetch_error(&e);
                    continue;
                }
            };

            debug!(key = %self.key, count = batch.len(), "배치 발행");

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                sent = self.output.send(batch) => {
                    if sent.is_err() {
                        warn!(key = %self.key, "출력 채널이 닫혀 폴링 루프를 종료합니다");
                        break;
                    }
                }
            }
        }

        debug!(key = %self.key, "폴링 루프 종료");
    }

    fn record_fetch(&self, result: &'static str) {
        metrics::counter!(
            "kline_poll_fetch_total",
            "provider" => self.source.name().to_string(),
            "result" => result
        )
        .increment(1);
    }

    fn log_fetch_error(&self, error: &ExchangeError) {
        match error {
            ExchangeError::ApiError { code, message } => {
                error!(key = %self.key, code = *code, error = %message, "업스트림 에러 응답");
            }
            other => {
                error!(key = %self.key, error = %other, "kline 조회 실패");
            }
        }
    }
}

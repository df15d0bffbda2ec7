//! 폴링 루프 중복 제거 레지스트리.
//!
//! 키가 한 번 등록되면 프로세스 수명 동안 제거되지 않습니다.
//! 등록 여부는 "이 키의 폴링 루프가 실행 중이거나 실행된 적이 있음"을 뜻합니다.

use dashmap::DashSet;

/// 폴링 중인 키 집합.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    keys: DashSet<String>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 키가 없으면 원자적으로 추가하고 `true`를 반환합니다.
    ///
    /// 같은 키로 경쟁하는 호출자 중 정확히 하나만 `true`를 받습니다.
    pub fn insert_if_absent(&self, key: &str) -> bool {
        self.keys.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_insert_once() {
        let registry = DedupRegistry::new();
        assert!(registry.insert_if_absent("NEO_USDT_5m"));
        assert!(!registry.insert_if_absent("NEO_USDT_5m"));
        assert!(registry.insert_if_absent("NEO_USDT_1h"));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("NEO_USDT_5m"));
    }

    #[test]
    fn test_concurrent_insert_single_winner() {
        let registry = DedupRegistry::new();
        let winners = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..32 {
                s.spawn(|| {
                    if registry.insert_if_absent("BTC_USDT_1m") {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }
}

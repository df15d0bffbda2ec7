//! 캔들 간격(interval) 테이블.
//!
//! API가 받아들이는 간격 토큰과 각 토큰의 샘플링 주기를 정의합니다.
//! 샘플링 주기는 폴링 주기이자 캐시 TTL로 사용됩니다.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;

/// 캔들 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    /// 1분봉
    M1,
    /// 3분봉
    M3,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 1시간봉
    H1,
    /// 2시간봉
    H2,
    /// 4시간봉
    H4,
    /// 6시간봉
    H6,
    /// 8시간봉
    H8,
    /// 12시간봉
    H12,
    /// 일봉
    D1,
    /// 3일봉
    D3,
    /// 주봉
    W1,
    /// 월봉
    MN1,
}

impl Interval {
    /// 지원하는 모든 간격.
    pub const ALL: [Interval; 15] = [
        Interval::M1,
        Interval::M3,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H2,
        Interval::H4,
        Interval::H6,
        Interval::H8,
        Interval::H12,
        Interval::D1,
        Interval::D3,
        Interval::W1,
        Interval::MN1,
    ];

    /// 이 간격의 샘플링 주기를 반환합니다.
    ///
    /// 폴링 tick 주기와 캐시 TTL 모두 이 값을 사용합니다.
    pub fn period(&self) -> Duration {
        match self {
            Interval::M1 => Duration::from_secs(60),
            Interval::M3 => Duration::from_secs(3 * 60),
            Interval::M5 => Duration::from_secs(5 * 60),
            Interval::M15 => Duration::from_secs(15 * 60),
            Interval::M30 => Duration::from_secs(30 * 60),
            Interval::H1 => Duration::from_secs(60 * 60),
            Interval::H2 => Duration::from_secs(2 * 60 * 60),
            Interval::H4 => Duration::from_secs(4 * 60 * 60),
            Interval::H6 => Duration::from_secs(6 * 60 * 60),
            Interval::H8 => Duration::from_secs(8 * 60 * 60),
            Interval::H12 => Duration::from_secs(12 * 60 * 60),
            Interval::D1 => Duration::from_secs(24 * 60 * 60),
            Interval::D3 => Duration::from_secs(72 * 60 * 60),
            Interval::W1 => Duration::from_secs(168 * 60 * 60),
            // 달력 기준 한 달이 아니라 720초
            Interval::MN1 => Duration::from_secs(720),
        }
    }

    /// 이 간격의 초 단위 주기를 반환합니다.
    pub fn as_secs(&self) -> u64 {
        self.period().as_secs()
    }

    /// 업스트림에 전달하는 간격 토큰.
    pub fn as_token(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M3 => "3m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::H2 => "2h",
            Interval::H4 => "4h",
            Interval::H6 => "6h",
            Interval::H8 => "8h",
            Interval::H12 => "12h",
            Interval::D1 => "1d",
            Interval::D3 => "3d",
            Interval::W1 => "1w",
            Interval::MN1 => "1M",
        }
    }

    /// 간격 토큰에서 파싱합니다. 토큰은 대소문자를 구분합니다 (`1m` ≠ `1M`).
    pub fn from_token(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.as_token() == s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown interval {}", s)))
    }
}

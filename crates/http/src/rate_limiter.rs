//! 클라이언트 측 레이트 리미터: 슬라이딩 윈도우
//!
//! 윈도우 안에서 허용된 요청 시각을 보관하고, 한도에 도달하면 가장 오래된
//! 요청이 윈도우를 벗어날 때까지 대기합니다. 상태는 비동기 뮤텍스 하나로
//! 직렬화되며 dispatcher 하나가 리미터 하나를 소유합니다.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use bright_core::metrics as m;

/// 한 번의 허용 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// 윈도우당 최대 요청 수
    pub limit: u32,
    /// 현재 윈도우에서 남은 요청 수
    pub remaining: u32,
    /// 다음 슬롯이 열릴 때까지 남은 시간
    pub reset_in: Duration,
    /// 허용 여부
    pub allowed: bool,
}

/// 슬라이딩 윈도우 레이트 리미터
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    requests: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// 윈도우당 `limit`개의 요청을 허용하는 리미터를 생성합니다.
    ///
    /// `limit`이 0이면 1로 취급합니다.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            requests: Mutex::new(VecDeque::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// 대기 없이 허용 여부를 판정합니다. 허용되면 슬롯을 차지합니다.
    pub async fn try_acquire(&self) -> RateLimitInfo {
        let now = Instant::now();
        let mut requests = self.requests.lock().await;
        self.evict(&mut requests, now);

        let count = u32::try_from(requests.len()).unwrap_or(u32::MAX);
        let allowed = count < self.limit;
        if allowed {
            requests.push_back(now);
        }

        let reset_in = requests
            .front()
            .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
            .unwrap_or_default();

        RateLimitInfo {
            limit: self.limit,
            remaining: self
                .limit
                .saturating_sub(count + if allowed { 1 } else { 0 }),
            reset_in,
            allowed,
        }
    }

    /// 슬롯이 날 때까지 기다린 뒤 차지합니다.
    ///
    /// 대기했으면 `true`를 돌려줍니다.
    pub async fn acquire(&self) -> bool {
        let mut waited = false;
        loop {
            let info = self.try_acquire().await;
            if info.allowed {
                return waited;
            }
            if !waited {
                metrics::counter!(m::HTTP_RATE_LIMITED_TOTAL).increment(1);
            }
            waited = true;
            debug!(
                limit = self.limit,
                wait_ms = u64::try_from(info.reset_in.as_millis()).unwrap_or(u64::MAX),
                "rate limit reached, waiting for a free slot"
            );
            tokio::time::sleep(info.reset_in).await;
        }
    }

    fn evict(&self, requests: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = requests.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                requests.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn allows_up_to_limit_then_denies() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        for i in 0..3 {
            let info = limiter.try_acquire().await;
            assert!(info.allowed, "request {i} should be allowed");
            assert_eq!(info.remaining, 2 - i);
        }
        let info = limiter.try_acquire().await;
        assert!(!info.allowed);
        assert_eq!(info.remaining, 0);
        assert_eq!(info.reset_in, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        assert!(limiter.try_acquire().await.allowed);
        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(limiter.try_acquire().await.allowed);
        assert!(!limiter.try_acquire().await.allowed);

        // 첫 요청만 윈도우를 벗어남
        tokio::time::advance(Duration::from_millis(40)).await;
        assert!(limiter.try_acquire().await.allowed);
        assert!(!limiter.try_acquire().await.allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_waits_for_free_slot() {
        let limiter = RateLimiter::new(1, Duration::from_millis(500));
        assert!(!limiter.acquire().await);

        let started = Instant::now();
        assert!(limiter.acquire().await);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_acquires_respect_limit() {
        let limiter = Arc::new(RateLimiter::new(2, Duration::from_secs(1)));
        let started = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                Instant::now()
            }));
        }

        let mut finished = Vec::new();
        for handle in handles {
            finished.push(handle.await.unwrap().duration_since(started));
        }
        finished.sort();

        assert!(finished[1] < Duration::from_secs(1));
        assert!(finished[2] >= Duration::from_secs(1));
        assert!(finished[3] >= Duration::from_secs(1));
    }

    #[test]
    fn zero_limit_is_treated_as_one() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1));
        assert_eq!(limiter.limit(), 1);
    }
}

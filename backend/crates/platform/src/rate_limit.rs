//! Rate Limiting Infrastructure
//!
//! Fixed-window attempt counting keyed by an arbitrary string (the login
//! endpoint keys by client address). The [`RateLimiter`] trait is the seam
//! for swapping the process-local [`InMemoryRateLimiter`] for a shared
//! backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::clock::{Clock, SystemClock};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Attempts allowed inside one window
    pub max_requests: u32,
    /// Window length, measured from the first attempt
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    fn window_delta(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.window).unwrap_or_else(|_| chrono::Duration::days(365))
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitResult {
    /// Whole seconds until the window resets, never less than one.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0) as u64;
        millis.div_ceil(1000).max(1)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit backend unavailable: {0}")]
    Unavailable(String),
}

/// Attempt counter backend.
#[trait_variant::make(RateLimiter: Send)]
pub trait LocalRateLimiter {
    /// Count one attempt for `key` and report whether it may proceed.
    ///
    /// Once the budget is spent the attempt is refused and not counted.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;

    /// Attempts left in the live window (the full budget if none).
    async fn remaining(&self, key: &str) -> Result<u32, RateLimitError>;

    /// Reset time of the live window for `key`, if any.
    async fn reset_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, RateLimitError>;

    /// Drop expired windows, returning how many were removed.
    async fn sweep(&self) -> Result<usize, RateLimitError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Process-local limiter. State is lost on restart.
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Number of tracked keys, live or expired.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Window>> {
        // A poisoned map only ever holds plain counters.
        self.windows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn live_window(&self, key: &str, now: DateTime<Utc>) -> Option<Window> {
        self.lock().get(key).copied().filter(|w| now <= w.reset_at)
    }
}

impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let now = self.clock.now();
        let max = self.config.max_requests;
        let mut windows = self.lock();

        let live = windows.get(key).copied().filter(|w| now <= w.reset_at);
        let window = match live {
            Some(w) if w.count >= max => {
                return Ok(RateLimitResult {
                    allowed: false,
                    remaining: 0,
                    reset_at: w.reset_at,
                });
            }
            Some(w) => Window {
                count: w.count + 1,
                ..w
            },
            None => Window {
                count: 1,
                reset_at: now + self.config.window_delta(),
            },
        };
        windows.insert(key.to_owned(), window);

        Ok(RateLimitResult {
            allowed: true,
            remaining: max.saturating_sub(window.count),
            reset_at: window.reset_at,
        })
    }

    async fn remaining(&self, key: &str) -> Result<u32, RateLimitError> {
        let max = self.config.max_requests;
        Ok(self
            .live_window(key, self.clock.now())
            .map_or(max, |w| max.saturating_sub(w.count)))
    }

    async fn reset_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, RateLimitError> {
        Ok(self.live_window(key, self.clock.now()).map(|w| w.reset_at))
    }

    async fn sweep(&self) -> Result<usize, RateLimitError> {
        let now = self.clock.now();
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, w| now <= w.reset_at);
        Ok(before - windows.len())
    }
}

/// Run [`RateLimiter::sweep`] on a fixed period until the task is aborted.
pub fn spawn_sweeper<L>(limiter: Arc<L>, every: Duration) -> JoinHandle<()>
where
    L: RateLimiter + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match limiter.sweep().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "Swept expired rate-limit windows"),
                Err(e) => tracing::warn!(error = %e, "Rate-limit sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{
        Arc, Duration, InMemoryRateLimiter, RateLimitConfig, RateLimitResult, RateLimiter, Utc,
        spawn_sweeper,
    };
    use crate::clock::{Clock, ManualClock};
    use chrono::TimeZone;

    fn limiter(max: u32, window_secs: u64) -> (Arc<ManualClock>, InMemoryRateLimiter) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap(),
        ));
        let limiter =
            InMemoryRateLimiter::with_clock(RateLimitConfig::new(max, window_secs), clock.clone());
        (clock, limiter)
    }

    #[tokio::test]
    async fn test_allows_exactly_max_then_limits() {
        let (_clock, limiter) = limiter(3, 60);

        for expected_remaining in [2, 1, 0] {
            let res = limiter.check("1.2.3.4").await.unwrap();
            assert!(res.allowed);
            assert_eq!(res.remaining, expected_remaining);
        }

        let res = limiter.check("1.2.3.4").await.unwrap();
        assert!(!res.allowed);
        assert_eq!(res.remaining, 0);
    }

    #[tokio::test]
    async fn test_limited_attempts_do_not_extend_window() {
        let (clock, limiter) = limiter(1, 60);
        let first = limiter.check("k").await.unwrap();

        clock.advance(chrono::Duration::seconds(30));
        let refused = limiter.check("k").await.unwrap();
        assert!(!refused.allowed);
        assert_eq!(refused.reset_at, first.reset_at);
        assert_eq!(refused.retry_after_secs(clock.now()), 30);
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let (clock, limiter) = limiter(2, 60);
        limiter.check("k").await.unwrap();
        limiter.check("k").await.unwrap();
        assert!(!limiter.check("k").await.unwrap().allowed);

        // Still inside the window at exactly the reset instant.
        clock.advance(chrono::Duration::seconds(60));
        assert!(!limiter.check("k").await.unwrap().allowed);

        clock.advance(chrono::Duration::milliseconds(1));
        let res = limiter.check("k").await.unwrap();
        assert!(res.allowed);
        assert_eq!(res.remaining, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (_clock, limiter) = limiter(1, 60);
        assert!(limiter.check("a").await.unwrap().allowed);
        assert!(limiter.check("b").await.unwrap().allowed);
        assert!(!limiter.check("a").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_introspection_without_counting() {
        let (clock, limiter) = limiter(5, 60);
        assert_eq!(limiter.remaining("k").await.unwrap(), 5);
        assert_eq!(limiter.reset_at("k").await.unwrap(), None);

        let res = limiter.check("k").await.unwrap();
        assert_eq!(limiter.remaining("k").await.unwrap(), 4);
        assert_eq!(limiter.remaining("k").await.unwrap(), 4);
        assert_eq!(limiter.reset_at("k").await.unwrap(), Some(res.reset_at));

        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(limiter.remaining("k").await.unwrap(), 5);
        assert_eq!(limiter.reset_at("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let (clock, limiter) = limiter(5, 60);
        limiter.check("old").await.unwrap();
        clock.advance(chrono::Duration::seconds(45));
        limiter.check("new").await.unwrap();
        clock.advance(chrono::Duration::seconds(20));

        assert_eq!(limiter.sweep().await.unwrap(), 1);
        assert_eq!(limiter.tracked_keys(), 1);
        assert_eq!(limiter.remaining("new").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_sweeper_task_clears_expired_windows() {
        let (clock, limiter) = limiter(5, 60);
        let limiter = Arc::new(limiter);
        limiter.check("k").await.unwrap();
        clock.advance(chrono::Duration::seconds(120));

        let handle = spawn_sweeper(limiter.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let res = RateLimitResult {
            allowed: false,
            remaining: 0,
            reset_at: now + chrono::Duration::milliseconds(1500),
        };
        assert_eq!(res.retry_after_secs(now), 2);
        assert_eq!(res.retry_after_secs(now + chrono::Duration::seconds(5)), 1);
    }
}

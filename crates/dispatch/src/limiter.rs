use log::debug;
use priceguard_core::ProviderId;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Quota for one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Grants allowed inside any trailing `window`
    pub max_requests_per_window: u32,
    pub window: Duration,
    /// Minimum spacing between two consecutive grants
    pub min_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: 30,
            window: Duration::from_secs(60),
            min_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Default)]
struct LimiterState {
    /// Instant of the last grant
    last_grant: Option<Instant>,
    /// Grants inside the trailing window, oldest first
    grants: VecDeque<Instant>,
}

impl LimiterState {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.grants.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.grants.pop_front();
            } else {
                break;
            }
        }
    }

    /// Earliest instant at which both constraints hold
    fn next_allowed(&self, config: &RateLimitConfig) -> Option<Instant> {
        let spacing = self.last_grant.map(|last| last + config.min_interval);
        let quota = if self.grants.len() >= config.max_requests_per_window as usize {
            self.grants.front().map(|&oldest| oldest + config.window)
        } else {
            None
        };
        spacing.max(quota)
    }

    fn record(&mut self, at: Instant) {
        self.last_grant = Some(at);
        self.grants.push_back(at);
    }

    fn forget(&mut self, at: Instant) {
        if let Some(pos) = self.grants.iter().rposition(|&granted| granted == at) {
            self.grants.remove(pos);
        }
        if self.last_grant == Some(at) {
            self.last_grant = self.grants.back().copied();
        }
    }
}

/// Sliding-window rate limiter for one provider
///
/// Enforces both a minimum spacing between grants and a maximum number of
/// grants per trailing window. Waiters are served in arrival order because
/// the state lock is a fair async mutex held for the whole wait.
///
/// Runs on the tokio clock, so paused-time tests see exact spacing.
#[derive(Clone)]
pub struct RateLimiter {
    provider: ProviderId,
    config: RateLimitConfig,
    state: Arc<Mutex<LimiterState>>,
}

impl RateLimiter {
    pub fn new(provider: ProviderId, config: RateLimitConfig) -> Self {
        Self {
            provider,
            config,
            state: Arc::new(Mutex::new(LimiterState::default())),
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait until a call is permitted and record it
    ///
    /// Cancel safe: the grant is recorded only once the wait has finished, so
    /// dropping this future early consumes no quota.
    pub async fn acquire(&self) -> Grant {
        let mut state = self.state.lock().await;
        loop {
            let now = Instant::now();
            state.prune(now, self.config.window);
            match state.next_allowed(&self.config) {
                Some(at) if at > now => {
                    debug!(
                        "{} limiter waiting {:?} for next slot",
                        self.provider,
                        at - now
                    );
                    sleep_until(at).await;
                }
                _ => break,
            }
        }

        let at = Instant::now();
        state.record(at);
        Grant {
            at,
            state: Arc::clone(&self.state),
        }
    }

    /// Grants currently counted against the window
    pub async fn in_window(&self) -> usize {
        let mut state = self.state.lock().await;
        state.prune(Instant::now(), self.config.window);
        state.grants.len()
    }
}

/// Permission for one provider call
#[must_use = "an unused grant should be released"]
#[derive(Debug)]
pub struct Grant {
    at: Instant,
    state: Arc<Mutex<LimiterState>>,
}

impl Grant {
    pub fn granted_at(&self) -> Instant {
        self.at
    }

    /// Hand back a grant that was never used for a call
    pub async fn release(self) {
        self.state.lock().await.forget(self.at);
    }
}

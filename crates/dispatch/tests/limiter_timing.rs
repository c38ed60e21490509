//! Rate limiter timing under paused tokio time

use priceguard_core::ProviderId;
use priceguard_dispatch::{RateLimitConfig, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

fn spaced(min_interval_secs: u64) -> RateLimitConfig {
    RateLimitConfig {
        max_requests_per_window: 1000,
        window: Duration::from_secs(60),
        min_interval: Duration::from_secs(min_interval_secs),
    }
}

/// Concurrent callers are never granted closer than the minimum interval
#[tokio::test(start_paused = true)]
async fn test_min_interval_between_concurrent_callers() {
    let _ = env_logger::try_init();
    let limiter = RateLimiter::new(ProviderId::Ozon, spaced(2));
    let grants = Arc::new(Mutex::new(Vec::new()));

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let limiter = limiter.clone();
        let grants = Arc::clone(&grants);
        tasks.push(tokio::spawn(async move {
            let grant = limiter.acquire().await;
            grants.lock().await.push(grant.granted_at());
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let mut grants = grants.lock().await.clone();
    grants.sort();
    assert_eq!(grants.len(), 5);
    for pair in grants.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(2));
    }
}

/// A full window blocks until its oldest grant ages out
#[tokio::test(start_paused = true)]
async fn test_window_quota() {
    let limiter = RateLimiter::new(
        ProviderId::Wildberries,
        RateLimitConfig {
            max_requests_per_window: 3,
            window: Duration::from_secs(10),
            min_interval: Duration::ZERO,
        },
    );
    let start = Instant::now();

    for _ in 0..3 {
        let _ = limiter.acquire().await;
    }
    assert!(start.elapsed() < Duration::from_millis(1));

    let fourth = limiter.acquire().await;
    assert!(fourth.granted_at() - start >= Duration::from_secs(10));
}

/// Abandoning a wait consumes no quota
#[tokio::test(start_paused = true)]
async fn test_abandoned_acquire_leaves_no_trace() {
    let limiter = RateLimiter::new(ProviderId::Ozon, spaced(2));
    let first = limiter.acquire().await;

    let abandoned = tokio::time::timeout(Duration::from_millis(500), limiter.acquire()).await;
    assert!(abandoned.is_err());

    let second = limiter.acquire().await;
    assert_eq!(second.granted_at() - first.granted_at(), Duration::from_secs(2));
    assert_eq!(limiter.in_window().await, 2);
}

/// A released grant frees its slot
#[tokio::test(start_paused = true)]
async fn test_release_returns_slot() {
    let limiter = RateLimiter::new(ProviderId::Ozon, spaced(2));
    let start = Instant::now();

    let unused = limiter.acquire().await;
    unused.release().await;
    assert_eq!(limiter.in_window().await, 0);

    let next = limiter.acquire().await;
    assert!(next.granted_at() - start < Duration::from_millis(1));
}

/// Limiters for different providers do not share state
#[tokio::test(start_paused = true)]
async fn test_providers_are_independent() {
    let ozon = RateLimiter::new(ProviderId::Ozon, spaced(2));
    let wb = RateLimiter::new(ProviderId::Wildberries, spaced(2));
    let start = Instant::now();

    let _ = ozon.acquire().await;
    let _ = wb.acquire().await;

    assert!(start.elapsed() < Duration::from_millis(1));
}

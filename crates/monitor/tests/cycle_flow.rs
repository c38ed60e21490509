//! Monitoring cycle: state machine, retry classification and commit rules

use async_trait::async_trait;
use chrono::{Duration as TimeDelta, TimeZone, Utc};
use priceguard_clock::ManualClock;
use priceguard_core::{
    ChangeKind, ChangeSet, Credential, Priority, Promotion, ProviderId, ProviderSnapshot, UserId,
};
use priceguard_diff::{DiffConfig, DiffEngine};
use priceguard_dispatch::{Dispatcher, RateLimitConfig};
use priceguard_gateway::ScriptedClient;
use priceguard_monitor::{
    CycleConfig, CycleError, CycleRequest, CycleState, MonitorCycle, ProviderSettings,
    RetryPolicy, StaticCredentials,
};
use priceguard_ports::{
    FailureSignal, NotifyError, Notifier, ProviderClient, ProviderError, SnapshotStore,
    StoreError,
};
use priceguard_store::InMemorySnapshotStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const USER: UserId = UserId(42);

/// Notifier that remembers everything it was handed
#[derive(Default)]
struct RecordingNotifier {
    deliveries: Mutex<Vec<ChangeSet>>,
    failures: Mutex<Vec<FailureSignal>>,
    fail_delivery: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            fail_delivery: true,
            ..Self::default()
        }
    }

    fn deliveries(&self) -> Vec<ChangeSet> {
        self.deliveries.lock().unwrap().clone()
    }

    fn failures(&self) -> Vec<FailureSignal> {
        self.failures.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(
        &self,
        user: UserId,
        _provider: ProviderId,
        changes: &ChangeSet,
    ) -> Result<(), NotifyError> {
        self.deliveries.lock().unwrap().push(changes.clone());
        if self.fail_delivery {
            return Err(NotifyError::Unreachable(user));
        }
        Ok(())
    }

    async fn report_failure(
        &self,
        _user: UserId,
        _provider: ProviderId,
        signal: FailureSignal,
    ) -> Result<(), NotifyError> {
        self.failures.lock().unwrap().push(signal);
        Ok(())
    }
}

/// Store whose reads or writes can be switched off
#[derive(Default)]
struct FlakyStore {
    inner: InMemorySnapshotStore,
    fail_get: bool,
    fail_put: bool,
}

#[async_trait]
impl SnapshotStore for FlakyStore {
    async fn get(
        &self,
        user: UserId,
        provider: ProviderId,
    ) -> Result<Option<ProviderSnapshot>, StoreError> {
        if self.fail_get {
            return Err(StoreError::Unavailable("read refused".into()));
        }
        self.inner.get(user, provider).await
    }

    async fn put(
        &self,
        user: UserId,
        provider: ProviderId,
        snapshot: ProviderSnapshot,
    ) -> Result<(), StoreError> {
        if self.fail_put {
            return Err(StoreError::Unavailable("disk full".into()));
        }
        self.inner.put(user, provider, snapshot).await
    }
}

fn unthrottled() -> RateLimitConfig {
    RateLimitConfig {
        max_requests_per_window: 10_000,
        window: Duration::from_secs(60),
        min_interval: Duration::ZERO,
    }
}

fn retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff_base: Duration::from_secs(1),
        backoff_cap: Duration::from_secs(30),
        throttle_penalty: Duration::from_secs(5),
    }
}

fn promo(id: i64, end_day: u32, participating: u64) -> Promotion {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 5, end_day, 0, 0, 0).unwrap();
    Promotion::builder(id)
        .title(format!("Action {}", id))
        .kind("DISCOUNT")
        .window(Some(start), Some(end))
        .product_counts(participating, 100)
        .participating(participating > 0)
        .build()
        .unwrap()
}

struct Harness {
    cycle: MonitorCycle,
    client: Arc<ScriptedClient>,
    clock: Arc<ManualClock>,
    store: Arc<FlakyStore>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn build(policy: RetryPolicy, store: FlakyStore, notifier: RecordingNotifier) -> Self {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap());
        let client = Arc::new(ScriptedClient::new(ProviderId::Ozon, clock.clone()));
        let store = Arc::new(store);
        let notifier = Arc::new(notifier);

        let mut clients: HashMap<ProviderId, Arc<dyn ProviderClient>> = HashMap::new();
        clients.insert(ProviderId::Ozon, client.clone());

        let config = CycleConfig::default().with_provider(
            ProviderId::Ozon,
            ProviderSettings {
                retry: policy,
                task_timeout: None,
            },
        );
        let cycle = MonitorCycle::new(
            Dispatcher::spawn([(ProviderId::Ozon, unthrottled())]),
            clients,
            store.clone(),
            DiffEngine::new(DiffConfig::default()),
            notifier.clone(),
            config,
        );

        Self {
            cycle,
            client,
            clock,
            store,
            notifier,
        }
    }

    fn new(policy: RetryPolicy) -> Self {
        Self::build(policy, FlakyStore::default(), RecordingNotifier::default())
    }

    fn request(&self) -> CycleRequest {
        CycleRequest {
            user: USER,
            provider: ProviderId::Ozon,
            credential: Credential::ozon("100", "key"),
            priority: Priority::Normal,
        }
    }

    async fn stored(&self) -> Option<ProviderSnapshot> {
        self.store.inner.get(USER, ProviderId::Ozon).await.unwrap()
    }

    async fn seed(&self, promotions: Vec<Promotion>) -> ProviderSnapshot {
        let snapshot = ProviderSnapshot::new(
            ProviderId::Ozon,
            promotions,
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        )
        .unwrap();
        self.store
            .inner
            .put(USER, ProviderId::Ozon, snapshot.clone())
            .await
            .unwrap();
        snapshot
    }
}

/// First fetch reports everything as new; the next one classifies each kind
#[tokio::test(start_paused = true)]
async fn test_happy_path_classifies_changes() {
    let _ = env_logger::try_init();
    let h = Harness::new(retry(3));
    h.client
        .push_promotions(vec![promo(1, 10, 5), promo(2, 10, 0)])
        .push_promotions(vec![promo(2, 20, 0), promo(3, 10, 1)]);

    let first = h.cycle.run(h.request()).await;
    assert_eq!(first.state, CycleState::Done);
    assert_eq!(first.changes.as_ref().unwrap().summary().new, 2);

    h.clock.advance(TimeDelta::minutes(15));
    let second = h.cycle.run(h.request()).await;

    assert_eq!(
        second.transitions,
        vec![
            CycleState::Pending,
            CycleState::Fetching,
            CycleState::Diffing,
            CycleState::Persisting,
            CycleState::Delivering,
            CycleState::Done,
        ]
    );
    assert_eq!(second.attempts, 1);
    let changes = second.changes.unwrap();
    let kinds: Vec<_> = changes
        .records()
        .iter()
        .map(|r| (r.kind(), r.promotion_id().to_string()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (ChangeKind::New, "3".to_string()),
            (ChangeKind::Updated, "2".to_string()),
            (ChangeKind::Ended, "1".to_string()),
        ]
    );
    assert_eq!(h.notifier.deliveries().len(), 2);
    assert_eq!(h.stored().await.unwrap().len(), 2);
}

/// Rejected keys fail at once, are reported and leave the baseline alone
#[tokio::test(start_paused = true)]
async fn test_invalid_credential_is_terminal() {
    let _ = env_logger::try_init();
    let h = Harness::new(retry(5));
    let baseline = h.seed(vec![promo(1, 10, 5)]).await;
    h.client.reject_credentials(true);

    let result = h.cycle.run(h.request()).await;

    assert_eq!(result.state, CycleState::Failed);
    assert_eq!(result.error, Some(CycleError::InvalidCredential));
    assert_eq!(result.attempts, 1);
    assert_eq!(
        result.transitions,
        vec![CycleState::Pending, CycleState::Fetching, CycleState::Failed]
    );
    assert!(result.changes.is_none());
    assert_eq!(h.stored().await, Some(baseline));
    assert_eq!(h.notifier.failures(), vec![FailureSignal::CredentialInvalid]);
    assert!(h.notifier.deliveries().is_empty());
}

/// Two transient failures back off 1 s then 2 s before the third attempt wins
#[tokio::test(start_paused = true)]
async fn test_transient_failures_back_off_then_succeed() {
    let _ = env_logger::try_init();
    let h = Harness::new(retry(5));
    h.client
        .push_error(ProviderError::transient("502 Bad Gateway"))
        .push_error(ProviderError::transient("connection reset"))
        .push_promotions(vec![promo(1, 10, 5)]);

    let result = h.cycle.run(h.request()).await;

    assert_eq!(result.state, CycleState::Done);
    assert_eq!(result.attempts, 3);
    assert_eq!(h.client.fetch_count(), 3);
    assert!(result.elapsed >= Duration::from_secs(3));
    assert!(result.elapsed < Duration::from_secs(4));
    assert!(h.notifier.failures().is_empty());
}

/// Provider throttling waits at least Retry-After plus the penalty
#[tokio::test(start_paused = true)]
async fn test_provider_throttling_adds_penalty() {
    let _ = env_logger::try_init();
    let h = Harness::new(retry(5));
    h.client
        .push_error(ProviderError::RateLimitedByProvider {
            retry_after: Some(Duration::from_secs(10)),
        })
        .push_promotions(vec![promo(1, 10, 5)]);

    let result = h.cycle.run(h.request()).await;

    assert_eq!(result.state, CycleState::Done);
    assert_eq!(result.attempts, 2);
    assert!(result.elapsed >= Duration::from_secs(15));
}

/// Running out of attempts keeps the old snapshot and reports a transient failure
#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_keep_baseline() {
    let _ = env_logger::try_init();
    let h = Harness::new(retry(3));
    let baseline = h.seed(vec![promo(1, 10, 5)]).await;
    for _ in 0..5 {
        h.client.push_error(ProviderError::transient("503"));
    }

    let result = h.cycle.run(h.request()).await;

    assert_eq!(result.state, CycleState::Failed);
    assert_eq!(
        result.error,
        Some(CycleError::TransientExhausted {
            attempts: 3,
            reason: "503".into()
        })
    );
    assert_eq!(h.client.fetch_count(), 3);
    assert_eq!(h.stored().await, Some(baseline));
    assert!(matches!(
        h.notifier.failures().as_slice(),
        [FailureSignal::Transient { .. }]
    ));
}

/// An unchanged fetch is still committed but nobody is notified
#[tokio::test(start_paused = true)]
async fn test_empty_change_set_still_persisted() {
    let _ = env_logger::try_init();
    let h = Harness::new(retry(3));
    h.client.push_promotions(vec![promo(1, 10, 5)]);

    h.cycle.run(h.request()).await;
    let first_fetch = h.stored().await.unwrap().fetched_at();

    h.clock.advance(TimeDelta::minutes(15));
    let result = h.cycle.run(h.request()).await;

    assert_eq!(result.state, CycleState::Done);
    assert!(result.changes.unwrap().is_empty());
    let stored = h.stored().await.unwrap();
    assert_eq!(stored.fetched_at(), first_fetch + TimeDelta::minutes(15));
    assert_eq!(h.notifier.deliveries().len(), 1);
}

/// A notifier outage does not undo the commit
#[tokio::test(start_paused = true)]
async fn test_delivery_failure_keeps_commit() {
    let _ = env_logger::try_init();
    let h = Harness::build(retry(3), FlakyStore::default(), RecordingNotifier::failing());
    h.client.push_promotions(vec![promo(1, 10, 5)]);

    let result = h.cycle.run(h.request()).await;

    assert_eq!(result.state, CycleState::Done);
    assert!(result.error.is_none());
    assert_eq!(h.notifier.deliveries().len(), 1);
    assert_eq!(h.stored().await.unwrap().len(), 1);
}

/// An unreadable baseline fails the cycle while diffing
#[tokio::test(start_paused = true)]
async fn test_unreadable_baseline_fails_in_diffing() {
    let _ = env_logger::try_init();
    let store = FlakyStore {
        fail_get: true,
        ..FlakyStore::default()
    };
    let h = Harness::build(retry(3), store, RecordingNotifier::default());
    h.client.push_promotions(vec![promo(1, 10, 5)]);

    let result = h.cycle.run(h.request()).await;

    assert_eq!(
        result.transitions,
        vec![
            CycleState::Pending,
            CycleState::Fetching,
            CycleState::Diffing,
            CycleState::Failed
        ]
    );
    assert!(matches!(result.error, Some(CycleError::StoreUnavailable(_))));
    assert!(h.notifier.deliveries().is_empty());
    assert!(h.notifier.failures().is_empty());
}

/// A failed write fails the cycle while persisting, before any delivery
#[tokio::test(start_paused = true)]
async fn test_unwritable_store_fails_in_persisting() {
    let _ = env_logger::try_init();
    let store = FlakyStore {
        fail_put: true,
        ..FlakyStore::default()
    };
    let h = Harness::build(retry(3), store, RecordingNotifier::default());
    h.client.push_promotions(vec![promo(1, 10, 5)]);

    let result = h.cycle.run(h.request()).await;

    assert_eq!(result.state, CycleState::Failed);
    assert_eq!(
        result.transitions.last().copied(),
        Some(CycleState::Failed)
    );
    assert!(result.transitions.contains(&CycleState::Persisting));
    assert!(!result.transitions.contains(&CycleState::Delivering));
    assert!(h.notifier.deliveries().is_empty());
    assert!(h.stored().await.is_none());
}

/// Missing keys fail before anything is fetched
#[tokio::test(start_paused = true)]
async fn test_missing_credential_fails_from_pending() {
    let _ = env_logger::try_init();
    let h = Harness::new(retry(3));
    let cycle = h
        .cycle
        .with_credentials(Arc::new(StaticCredentials::new()));

    let result = cycle
        .run_resolving(USER, ProviderId::Ozon, Priority::High)
        .await;

    assert_eq!(
        result.transitions,
        vec![CycleState::Pending, CycleState::Failed]
    );
    assert_eq!(result.error, Some(CycleError::CredentialUnavailable));
    assert_eq!(h.client.fetch_count(), 0);
    assert_eq!(
        h.notifier.failures(),
        vec![FailureSignal::CredentialUnavailable]
    );
}

/// A provider without queue or client is a configuration failure
#[tokio::test(start_paused = true)]
async fn test_unconfigured_provider() {
    let _ = env_logger::try_init();
    let h = Harness::new(retry(3));

    let result = h
        .cycle
        .run(CycleRequest {
            user: USER,
            provider: ProviderId::Wildberries,
            credential: Credential::wildberries("wb"),
            priority: Priority::Normal,
        })
        .await;

    assert_eq!(
        result.error,
        Some(CycleError::Unconfigured(ProviderId::Wildberries))
    );
    assert!(h.notifier.failures().is_empty());
}

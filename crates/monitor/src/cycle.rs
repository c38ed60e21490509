use log::{debug, error, info, warn};
use priceguard_core::{ChangeSet, Credential, Priority, ProviderId, ProviderSnapshot, UserId};
use priceguard_diff::DiffEngine;
use priceguard_dispatch::{DispatchError, Dispatcher, TaskOptions};
use priceguard_ports::{
    CredentialResolver, FailureSignal, Notifier, ProviderClient, ProviderError, SnapshotStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::{CycleError, Result};
use crate::retry::RetryPolicy;
use crate::state::CycleState;

/// Per-provider cycle tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSettings {
    pub retry: RetryPolicy,
    /// How long one fetch may wait in the provider queue before it starts
    pub task_timeout: Option<Duration>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            task_timeout: Some(Duration::from_secs(600)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CycleConfig {
    pub providers: HashMap<ProviderId, ProviderSettings>,
    /// Notify even when nothing changed
    pub deliver_empty: bool,
}

impl CycleConfig {
    pub fn with_provider(mut self, provider: ProviderId, settings: ProviderSettings) -> Self {
        self.providers.insert(provider, settings);
        self
    }

    pub fn settings(&self, provider: ProviderId) -> ProviderSettings {
        self.providers.get(&provider).copied().unwrap_or_default()
    }
}

/// Input of one cycle
#[derive(Debug, Clone)]
pub struct CycleRequest {
    pub user: UserId,
    pub provider: ProviderId,
    pub credential: Credential,
    pub priority: Priority,
}

/// Outcome of one cycle
#[derive(Debug, Clone)]
pub struct CycleResult {
    pub cycle_id: Uuid,
    pub user: UserId,
    pub provider: ProviderId,
    /// Terminal state: `Done` or `Failed`
    pub state: CycleState,
    /// Present once diffing has completed
    pub changes: Option<ChangeSet>,
    pub error: Option<CycleError>,
    /// Fetch attempts made
    pub attempts: u32,
    pub elapsed: Duration,
    /// Every state entered, starting with `Pending`
    pub transitions: Vec<CycleState>,
}

impl CycleResult {
    pub fn is_done(&self) -> bool {
        self.state == CycleState::Done
    }
}

/// Tracks state, attempts and timing of a running cycle
struct Progress {
    cycle_id: Uuid,
    user: UserId,
    provider: ProviderId,
    started: Instant,
    attempts: u32,
    transitions: Vec<CycleState>,
}

impl Progress {
    fn new(user: UserId, provider: ProviderId) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            user,
            provider,
            started: Instant::now(),
            attempts: 0,
            transitions: vec![CycleState::Pending],
        }
    }

    fn state(&self) -> CycleState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(CycleState::Pending)
    }

    fn enter(&mut self, next: CycleState) {
        debug_assert!(
            self.state().can_transition_to(next),
            "illegal transition {} -> {}",
            self.state(),
            next
        );
        debug!(
            "Cycle {} ({} on {}): {} -> {}",
            self.cycle_id,
            self.user,
            self.provider,
            self.state(),
            next
        );
        self.transitions.push(next);
    }

    fn finish(self, changes: Option<ChangeSet>, error: Option<CycleError>) -> CycleResult {
        CycleResult {
            cycle_id: self.cycle_id,
            user: self.user,
            provider: self.provider,
            state: self.state(),
            changes,
            error,
            attempts: self.attempts,
            elapsed: self.started.elapsed(),
            transitions: self.transitions,
        }
    }
}

/// One monitoring pass for one (user, provider) pair
///
/// Fetch through the provider's queue, diff against the stored baseline,
/// commit the new snapshot, then deliver the change set. The cycle alone
/// decides whether a provider error is retried or terminal.
pub struct MonitorCycle {
    dispatcher: Dispatcher,
    clients: HashMap<ProviderId, Arc<dyn ProviderClient>>,
    store: Arc<dyn SnapshotStore>,
    diff: DiffEngine,
    notifier: Arc<dyn Notifier>,
    credentials: Option<Arc<dyn CredentialResolver>>,
    config: CycleConfig,
}

impl MonitorCycle {
    pub fn new(
        dispatcher: Dispatcher,
        clients: HashMap<ProviderId, Arc<dyn ProviderClient>>,
        store: Arc<dyn SnapshotStore>,
        diff: DiffEngine,
        notifier: Arc<dyn Notifier>,
        config: CycleConfig,
    ) -> Self {
        Self {
            dispatcher,
            clients,
            store,
            diff,
            notifier,
            credentials: None,
            config,
        }
    }

    /// Resolver used by [`MonitorCycle::run_resolving`]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialResolver>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Look up the pair's credential, then run the cycle
    pub async fn run_resolving(
        &self,
        user: UserId,
        provider: ProviderId,
        priority: Priority,
    ) -> CycleResult {
        let resolved = match &self.credentials {
            Some(resolver) => resolver.resolve(user, provider).await.ok(),
            None => None,
        };

        match resolved {
            Some(credential) => {
                self.run(CycleRequest {
                    user,
                    provider,
                    credential,
                    priority,
                })
                .await
            }
            None => {
                let progress = Progress::new(user, provider);
                self.fail(progress, CycleError::CredentialUnavailable)
                    .await
            }
        }
    }

    pub async fn run(&self, request: CycleRequest) -> CycleResult {
        let CycleRequest {
            user,
            provider,
            credential,
            priority,
        } = request;
        let mut progress = Progress::new(user, provider);

        progress.enter(CycleState::Fetching);
        let snapshot = match self
            .fetch(&mut progress, credential, priority)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => return self.fail(progress, e).await,
        };

        progress.enter(CycleState::Diffing);
        let previous = match self.store.get(user, provider).await {
            Ok(previous) => previous,
            Err(e) => {
                return self
                    .fail(progress, CycleError::StoreUnavailable(e.to_string()))
                    .await;
            }
        };
        let changes = self.diff.diff(previous.as_ref(), &snapshot);

        progress.enter(CycleState::Persisting);
        if let Err(e) = self.store.put(user, provider, snapshot).await {
            return self
                .fail(progress, CycleError::StoreUnavailable(e.to_string()))
                .await;
        }

        progress.enter(CycleState::Delivering);
        if !changes.is_empty() || self.config.deliver_empty {
            if let Err(e) = self.notifier.deliver(user, provider, &changes).await {
                warn!(
                    "Cycle {}: delivery to {} failed, snapshot stays committed: {}",
                    progress.cycle_id, user, e
                );
            }
        }

        progress.enter(CycleState::Done);
        let summary = changes.summary();
        info!(
            "Cycle {} done for {} on {}: {} new, {} updated, {} ended ({} attempts)",
            progress.cycle_id,
            user,
            provider,
            summary.new,
            summary.updated,
            summary.ended,
            progress.attempts
        );
        progress.finish(Some(changes), None)
    }

    /// Submit the fetch until it succeeds, fails terminally or the attempt
    /// budget runs out
    async fn fetch(
        &self,
        progress: &mut Progress,
        credential: Credential,
        priority: Priority,
    ) -> Result<ProviderSnapshot> {
        let provider = progress.provider;
        let queue = self
            .dispatcher
            .queue(provider)
            .ok_or(CycleError::Unconfigured(provider))?;
        let client = self
            .clients
            .get(&provider)
            .cloned()
            .ok_or(CycleError::Unconfigured(provider))?;
        let settings = self.config.settings(provider);
        let policy = settings.retry;
        let options = TaskOptions {
            priority,
            timeout: settings.task_timeout,
        };

        loop {
            progress.attempts += 1;
            let attempt = progress.attempts;

            let client = Arc::clone(&client);
            let credential = credential.clone();
            let outcome = queue
                .submit(options, move || async move {
                    client.fetch_promotions(&credential).await
                })
                .await;

            let (error, delay) = match outcome {
                Ok(Ok(snapshot)) => return Ok(snapshot),
                Ok(Err(ProviderError::InvalidCredential)) => {
                    return Err(CycleError::InvalidCredential);
                }
                Ok(Err(ProviderError::Transient(reason))) => (
                    CycleError::TransientExhausted {
                        attempts: attempt,
                        reason,
                    },
                    policy.backoff(attempt),
                ),
                Ok(Err(ProviderError::RateLimitedByProvider { retry_after })) => (
                    CycleError::RateLimitedExhausted { attempts: attempt },
                    policy.throttled_delay(attempt, retry_after),
                ),
                Err(DispatchError::Timeout) => (
                    CycleError::Timeout { attempts: attempt },
                    policy.backoff(attempt),
                ),
                Err(DispatchError::Cancelled | DispatchError::QueueClosed) => {
                    return Err(CycleError::QueueClosed);
                }
            };

            if !policy.should_retry(attempt) {
                return Err(error);
            }
            warn!(
                "Cycle {} attempt {}/{} failed ({}), retrying in {:?}",
                progress.cycle_id, attempt, policy.max_attempts, error, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn fail(&self, mut progress: Progress, error: CycleError) -> CycleResult {
        progress.enter(CycleState::Failed);

        let signal = match &error {
            CycleError::InvalidCredential => Some(FailureSignal::CredentialInvalid),
            CycleError::CredentialUnavailable => Some(FailureSignal::CredentialUnavailable),
            e if e.is_transient() => Some(FailureSignal::Transient {
                reason: e.to_string(),
            }),
            _ => None,
        };

        if error.is_credential_problem() || error.is_transient() {
            warn!(
                "Cycle {} failed for {} on {}: {}",
                progress.cycle_id, progress.user, progress.provider, error
            );
        } else {
            error!(
                "Cycle {} failed for {} on {}: {}",
                progress.cycle_id, progress.user, progress.provider, error
            );
        }

        if let Some(signal) = signal {
            if let Err(e) = self
                .notifier
                .report_failure(progress.user, progress.provider, signal)
                .await
            {
                warn!("Cycle {}: failure report not delivered: {}", progress.cycle_id, e);
            }
        }

        progress.finish(None, Some(error))
    }
}

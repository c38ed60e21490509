use chrono::TimeDelta;
use dashmap::{DashMap, DashSet};
use log::{debug, error, info};
use priceguard_core::{Priority, ProviderId, Timestamp, UserId};
use priceguard_ports::{Clock, Subscription, SubscriptionSource};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::cycle::{CycleResult, MonitorCycle};

type Pair = (UserId, ProviderId);

/// Default period between two scheduler ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(900);

/// Result of one pair in a forced check
#[derive(Debug, Clone)]
pub enum ForceCheckOutcome {
    Completed(CycleResult),
    /// A cycle for this pair was already in progress; nothing was started
    AlreadyRunning(ProviderId),
}

impl ForceCheckOutcome {
    pub fn provider(&self) -> ProviderId {
        match self {
            ForceCheckOutcome::Completed(result) => result.provider,
            ForceCheckOutcome::AlreadyRunning(provider) => *provider,
        }
    }
}

/// Marks a pair as running until dropped
struct PairGuard {
    running: Arc<DashSet<Pair>>,
    pair: Pair,
}

impl PairGuard {
    fn acquire(running: &Arc<DashSet<Pair>>, pair: Pair) -> Option<Self> {
        running.insert(pair).then(|| Self {
            running: Arc::clone(running),
            pair,
        })
    }
}

impl Drop for PairGuard {
    fn drop(&mut self) {
        self.running.remove(&self.pair);
    }
}

/// Periodically starts monitoring cycles for active subscriptions
///
/// At most one cycle per pair runs at any time, whether it was started by a
/// tick or by a forced check.
#[derive(Clone)]
pub struct Scheduler {
    cycle: Arc<MonitorCycle>,
    subscriptions: Arc<dyn SubscriptionSource>,
    clock: Arc<dyn Clock>,
    last_check: Arc<DashMap<Pair, Timestamp>>,
    running: Arc<DashSet<Pair>>,
    tick_interval: Duration,
}

impl Scheduler {
    pub fn new(
        cycle: Arc<MonitorCycle>,
        subscriptions: Arc<dyn SubscriptionSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycle,
            subscriptions,
            clock,
            last_check: Arc::new(DashMap::new()),
            running: Arc::new(DashSet::new()),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Zero is raised to one millisecond
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval.max(Duration::from_millis(1));
        self
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Time of the last cycle for this pair that reached `Done`
    pub fn last_check(&self, user: UserId, provider: ProviderId) -> Option<Timestamp> {
        self.last_check.get(&(user, provider)).map(|t| *t)
    }

    pub fn is_running(&self, user: UserId, provider: ProviderId) -> bool {
        self.running.contains(&(user, provider))
    }

    fn is_due(&self, subscription: &Subscription, now: Timestamp) -> bool {
        let Some(last) = self.last_check(subscription.user, subscription.provider) else {
            return true;
        };
        let interval = TimeDelta::from_std(subscription.check_interval).unwrap_or(TimeDelta::MAX);
        now - last >= interval
    }

    /// Start a `Normal` priority cycle for every due subscription
    ///
    /// Pairs with a cycle still in progress are skipped.
    pub async fn tick(&self) -> Vec<JoinHandle<CycleResult>> {
        let now = self.clock.now();
        let subscriptions = self.subscriptions.active_subscriptions().await;
        let mut handles = Vec::new();

        for subscription in subscriptions {
            if !self.is_due(&subscription, now) {
                continue;
            }
            let pair = (subscription.user, subscription.provider);
            let Some(guard) = PairGuard::acquire(&self.running, pair) else {
                debug!("Skipping {} on {}: cycle in progress", pair.0, pair.1);
                continue;
            };
            handles.push(self.spawn_cycle(guard, Priority::Normal));
        }

        if !handles.is_empty() {
            info!("Tick started {} cycles", handles.len());
        }
        handles
    }

    /// Check every provider of `user` now, at `High` priority
    pub async fn force_check(&self, user: UserId) -> Vec<ForceCheckOutcome> {
        let subscriptions = self.subscriptions.active_subscriptions().await;
        let mut outcomes = Vec::new();
        let mut pending = Vec::new();

        for subscription in subscriptions.into_iter().filter(|s| s.user == user) {
            match PairGuard::acquire(&self.running, (user, subscription.provider)) {
                Some(guard) => pending.push(self.spawn_cycle(guard, Priority::High)),
                None => outcomes.push(ForceCheckOutcome::AlreadyRunning(subscription.provider)),
            }
        }

        for handle in pending {
            match handle.await {
                Ok(result) => outcomes.push(ForceCheckOutcome::Completed(result)),
                Err(e) => error!("Forced check for {} aborted: {}", user, e),
            }
        }
        outcomes
    }

    fn spawn_cycle(&self, guard: PairGuard, priority: Priority) -> JoinHandle<CycleResult> {
        let this = self.clone();
        tokio::spawn(async move {
            let (user, provider) = guard.pair;
            let result = this.cycle.run_resolving(user, provider, priority).await;
            // Forced checks leave the regular schedule untouched
            if result.is_done() && priority == Priority::Normal {
                this.last_check.insert((user, provider), this.clock.now());
            }
            drop(guard);
            result
        })
    }

    /// Tick on a fixed interval until `shutdown` resolves
    ///
    /// Cycles already started keep running after shutdown.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!("Scheduler started, ticking every {:?}", self.tick_interval);
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }
}

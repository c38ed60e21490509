//! Bootstrap - Wiring the monitor from configuration
//!
//! Builds every component in dependency order:
//! - One rate-limited request queue per configured provider
//! - Provider clients (HTTP, or scripted demo calendars for dry runs)
//! - Snapshot store, diff engine and monitoring cycle
//! - Scheduler over the configured subscriptions

use log::info;
use priceguard_clock::SystemClock;
use priceguard_core::{ProviderId, UserId};
use priceguard_diff::DiffEngine;
use priceguard_dispatch::{Dispatcher, QueueStats};
use priceguard_gateway::{ClientFactory, GatewayError, ScriptedClient};
use priceguard_monitor::{
    ForceCheckOutcome, LogNotifier, MonitorCycle, Scheduler, StaticCredentials,
    StaticSubscriptions,
};
use priceguard_ports::{Clock, Notifier, ProviderClient, SnapshotStore, Subscription};
use priceguard_store::{InMemorySnapshotStore, JsonDirSnapshotStore};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ConfigError, RunnerConfig, StoreSection};
use crate::demo_feed::{DemoFeed, DemoFeedConfig};

/// Calendars scripted per provider in a dry run
const DRY_RUN_GENERATIONS: usize = 8;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to build provider clients: {0}")]
    Gateway(#[from] GatewayError),
}

/// A fully wired monitor
pub struct Monitor {
    pub scheduler: Scheduler,
    pub cycle: Arc<MonitorCycle>,
    pub store: Arc<dyn SnapshotStore>,
    dispatcher: Dispatcher,
}

impl Monitor {
    /// Run scheduled checks until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.scheduler.run(shutdown).await;
    }

    /// Check every provider of `user` right away
    pub async fn force_check(&self, user: UserId) -> Vec<ForceCheckOutcome> {
        self.scheduler.force_check(user).await
    }

    pub fn queue_stats(&self, provider: ProviderId) -> Option<QueueStats> {
        self.dispatcher.stats(provider)
    }
}

/// Builds a [`Monitor`] from a [`RunnerConfig`]
pub struct MonitorBootstrap {
    config: RunnerConfig,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl MonitorBootstrap {
    /// System clock and log notifier
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Wire every component
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Result<Monitor, BootstrapError> {
        let config = self.config;
        config.validate()?;

        let dispatcher = Dispatcher::spawn(config.rate_limits());
        let clients = if config.monitor.dry_run {
            Self::scripted_clients(&config, &self.clock)
        } else {
            ClientFactory::new(config.gateway_config(), Arc::clone(&self.clock))?
                .create_all(config.provider_ids())
        };

        let store: Arc<dyn SnapshotStore> = match &config.store {
            StoreSection::Memory => Arc::new(InMemorySnapshotStore::new()),
            StoreSection::JsonDir { path } => {
                info!("Keeping snapshots under {}", path.display());
                Arc::new(JsonDirSnapshotStore::new(path.clone()))
            }
        };

        let mut credentials = StaticCredentials::new();
        let mut subscriptions = Vec::with_capacity(config.subscriptions.len());
        for entry in &config.subscriptions {
            credentials.insert(entry.user, entry.credential.clone());
            subscriptions.push(Subscription {
                user: entry.user,
                provider: entry.provider,
                check_interval: config.check_interval(entry),
            });
        }

        let cycle = Arc::new(
            MonitorCycle::new(
                dispatcher.clone(),
                clients,
                Arc::clone(&store),
                DiffEngine::new(config.diff_config()),
                self.notifier,
                config.cycle_config(),
            )
            .with_credentials(Arc::new(credentials)),
        );

        let scheduler = Scheduler::new(
            Arc::clone(&cycle),
            Arc::new(StaticSubscriptions::new(subscriptions)),
            self.clock,
        )
        .with_tick_interval(config.monitor.tick_interval());

        info!(
            "Monitor ready: {} providers, {} subscriptions{}",
            config.providers.len(),
            config.subscriptions.len(),
            if config.monitor.dry_run { " (dry run)" } else { "" }
        );

        Ok(Monitor {
            scheduler,
            cycle,
            store,
            dispatcher,
        })
    }

    fn scripted_clients(
        config: &RunnerConfig,
        clock: &Arc<dyn Clock>,
    ) -> HashMap<ProviderId, Arc<dyn ProviderClient>> {
        config
            .provider_ids()
            .into_iter()
            .map(|provider| {
                let client = ScriptedClient::new(provider, Arc::clone(clock));
                let mut feed = match config.monitor.demo_seed {
                    Some(seed) => DemoFeed::with_seed(provider, DemoFeedConfig::default(), seed),
                    None => DemoFeed::new(provider, DemoFeedConfig::default()),
                };
                for _ in 0..DRY_RUN_GENERATIONS {
                    client.push_promotions(feed.next_generation(clock.now()));
                }
                info!("Scripted {} demo calendars for {}", DRY_RUN_GENERATIONS, provider);

                let client: Arc<dyn ProviderClient> = Arc::new(client);
                (provider, client)
            })
            .collect()
    }
}

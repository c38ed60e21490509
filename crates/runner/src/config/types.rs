use priceguard_core::{Credential, ProviderId, UserId};
use priceguard_diff::{ComparedFields, DiffConfig};
use priceguard_dispatch::RateLimitConfig;
use priceguard_gateway::GatewayConfig;
use priceguard_monitor::{CycleConfig, ProviderSettings, RetryPolicy};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration of the monitor process
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub monitor: MonitorSection,
    /// Endpoints and HTTP settings shared by the real clients
    #[serde(default)]
    pub gateway: GatewayConfig,
    pub providers: Vec<ProviderSection>,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionEntry>,
}

/// Scheduling and delivery behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// Used by subscriptions without their own interval
    #[serde(default = "default_check_interval")]
    pub default_check_interval_secs: u64,
    #[serde(default)]
    pub deliver_empty: bool,
    /// Serve scripted data instead of calling the marketplaces
    #[serde(default)]
    pub dry_run: bool,
    /// Seed for the dry-run calendars; random when absent
    #[serde(default)]
    pub demo_seed: Option<u64>,
}

impl Default for MonitorSection {
    fn default() -> Self {
        MonitorSection {
            tick_interval_secs: default_tick_interval(),
            default_check_interval_secs: default_check_interval(),
            deliver_empty: false,
            dry_run: false,
            demo_seed: None,
        }
    }
}

impl MonitorSection {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn default_check_interval(&self) -> Duration {
        Duration::from_secs(self.default_check_interval_secs)
    }
}

/// Per-marketplace limits, retry policy and comparison settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSection {
    pub id: ProviderId,
    #[serde(default)]
    pub rate_limit: RateLimitSection,
    #[serde(default)]
    pub retry: RetrySection,
    /// Longest wait in the provider queue before a fetch starts
    #[serde(default = "default_task_timeout")]
    pub task_timeout_secs: Option<u64>,
    /// Overrides the gateway URL for this provider
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub compared_fields: Option<ComparedFields>,
}

impl ProviderSection {
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests_per_window: self.rate_limit.max_requests_per_window,
            window: Duration::from_secs(self.rate_limit.window_secs),
            min_interval: Duration::from_millis(self.rate_limit.min_interval_ms),
        }
    }

    pub fn settings(&self) -> ProviderSettings {
        ProviderSettings {
            retry: self.retry.policy(),
            task_timeout: self.task_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSection {
    #[serde(default = "default_max_requests")]
    pub max_requests_per_window: u32,
    #[serde(default = "default_window")]
    pub window_secs: u64,
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        RateLimitSection {
            max_requests_per_window: default_max_requests(),
            window_secs: default_window(),
            min_interval_ms: default_min_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_cap")]
    pub backoff_cap_ms: u64,
    #[serde(default = "default_throttle_penalty")]
    pub throttle_penalty_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        RetrySection {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base(),
            backoff_cap_ms: default_backoff_cap(),
            throttle_penalty_ms: default_throttle_penalty(),
        }
    }
}

impl RetrySection {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            backoff_cap: Duration::from_millis(self.backoff_cap_ms),
            throttle_penalty: Duration::from_millis(self.throttle_penalty_ms),
        }
    }
}

/// Where snapshots are kept between cycles
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreSection {
    #[default]
    Memory,
    JsonDir { path: PathBuf },
}

/// One monitored (user, provider) pair with its keys
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionEntry {
    pub user: UserId,
    pub provider: ProviderId,
    #[serde(default)]
    pub check_interval_secs: Option<u64>,
    pub credential: Credential,
}

impl RunnerConfig {
    pub fn provider(&self, id: ProviderId) -> Option<&ProviderSection> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id).collect()
    }

    /// Rate limits keyed by provider, ready for the dispatcher
    pub fn rate_limits(&self) -> Vec<(ProviderId, RateLimitConfig)> {
        self.providers.iter().map(|p| (p.id, p.rate_limit())).collect()
    }

    /// Gateway settings with per-provider URL overrides applied
    pub fn gateway_config(&self) -> GatewayConfig {
        let mut gateway = self.gateway.clone();
        for provider in &self.providers {
            if let Some(url) = &provider.base_url {
                match provider.id {
                    ProviderId::Ozon => gateway.ozon_base_url = url.clone(),
                    ProviderId::Wildberries => gateway.wb_calendar_url = url.clone(),
                }
            }
        }
        gateway
    }

    pub fn diff_config(&self) -> DiffConfig {
        self.providers
            .iter()
            .filter_map(|p| p.compared_fields.clone().map(|fields| (p.id, fields)))
            .fold(DiffConfig::default(), |config, (id, fields)| {
                config.with_provider(id, fields)
            })
    }

    pub fn cycle_config(&self) -> CycleConfig {
        CycleConfig {
            providers: self.providers.iter().map(|p| (p.id, p.settings())).collect(),
            deliver_empty: self.monitor.deliver_empty,
        }
    }

    pub fn check_interval(&self, entry: &SubscriptionEntry) -> Duration {
        entry
            .check_interval_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.monitor.default_check_interval())
    }
}

// Default value functions for serde
fn default_tick_interval() -> u64 {
    900
}

fn default_check_interval() -> u64 {
    3600
}

fn default_task_timeout() -> Option<u64> {
    Some(600)
}

fn default_max_requests() -> u32 {
    30
}

fn default_window() -> u64 {
    60
}

fn default_min_interval() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_base() -> u64 {
    1000
}

fn default_backoff_cap() -> u64 {
    30_000
}

fn default_throttle_penalty() -> u64 {
    5000
}

//! JSON configuration for the monitor process

mod loader;
mod types;

pub use loader::{ConfigError, load_config, load_config_from_str, load_default_config};
pub use types::{
    MonitorSection, ProviderSection, RateLimitSection, RetrySection, RunnerConfig, StoreSection,
    SubscriptionEntry,
};

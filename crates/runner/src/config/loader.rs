use priceguard_core::{ProviderId, UserId};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use super::types::RunnerConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("No providers configured")]
    NoProviders,
    #[error("Provider {0} configured twice")]
    DuplicateProvider(ProviderId),
    #[error("Invalid limit for {provider}: {reason}")]
    InvalidLimit {
        provider: ProviderId,
        reason: &'static str,
    },
    #[error("Invalid monitor setting: {0}")]
    InvalidMonitor(&'static str),
    #[error("User {user} subscribes to unconfigured provider {provider}")]
    UnconfiguredProvider { user: UserId, provider: ProviderId },
    #[error("Credential of user {user} does not belong to {provider}")]
    CredentialMismatch { user: UserId, provider: ProviderId },
}

/// Load and validate configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load and validate configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<RunnerConfig, ConfigError> {
    let config: RunnerConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration (dry run, in-memory store)
pub fn load_default_config() -> Result<RunnerConfig, ConfigError> {
    let default_config = include_str!("priceguard.json");
    load_config_from_str(default_config)
}

impl RunnerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        if self.monitor.tick_interval_secs == 0 {
            return Err(ConfigError::InvalidMonitor("tick_interval_secs must be positive"));
        }
        if self.monitor.default_check_interval_secs == 0 {
            return Err(ConfigError::InvalidMonitor(
                "default_check_interval_secs must be positive",
            ));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert(provider.id) {
                return Err(ConfigError::DuplicateProvider(provider.id));
            }
            let invalid = |reason| ConfigError::InvalidLimit {
                provider: provider.id,
                reason,
            };
            if provider.rate_limit.max_requests_per_window == 0 {
                return Err(invalid("max_requests_per_window must be positive"));
            }
            if provider.rate_limit.window_secs == 0 {
                return Err(invalid("window_secs must be positive"));
            }
            if provider.retry.max_attempts == 0 {
                return Err(invalid("retry.max_attempts must be positive"));
            }
            if provider.retry.backoff_cap_ms < provider.retry.backoff_base_ms {
                return Err(invalid("retry.backoff_cap_ms is below backoff_base_ms"));
            }
        }

        for entry in &self.subscriptions {
            if !seen.contains(&entry.provider) {
                return Err(ConfigError::UnconfiguredProvider {
                    user: entry.user,
                    provider: entry.provider,
                });
            }
            if entry.credential.provider() != entry.provider {
                return Err(ConfigError::CredentialMismatch {
                    user: entry.user,
                    provider: entry.provider,
                });
            }
        }
        Ok(())
    }
}

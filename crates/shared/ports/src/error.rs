use priceguard_core::{ProviderId, UserId};
use std::time::Duration;
use thiserror::Error;

/// Classified failure of a provider call
///
/// Clients map every transport-level problem into one of these before it
/// leaves the client; raw HTTP errors never cross the port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider rejected authentication. Never retried.
    #[error("Invalid API credentials")]
    InvalidCredential,

    /// Network failure, 5xx, timeout or an undecodable response
    #[error("Transient provider error: {0}")]
    Transient(String),

    /// The provider itself asked us to slow down
    #[error("Throttled by provider (retry after {retry_after:?})")]
    RateLimitedByProvider { retry_after: Option<Duration> },
}

impl ProviderError {
    pub fn transient(msg: impl Into<String>) -> Self {
        ProviderError::Transient(msg.into())
    }

    /// Whether a caller may try the same call again
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::InvalidCredential)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Snapshot store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored snapshot is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("No credential for user {user} on {provider}")]
    Unavailable { user: UserId, provider: ProviderId },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Recipient {0} cannot be reached")]
    Unreachable(UserId),

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

//! Error types for the gateway crate

use priceguard_core::ProviderId;
use priceguard_ports::ProviderError;
use std::time::Duration;
use thiserror::Error;

/// Gateway-level errors (HTTP exchange with a provider)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("Provider throttled the request")]
    Throttled { retry_after: Option<Duration> },

    #[error("API error: HTTP {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Credential cannot be sent as a header: {0}")]
    MalformedCredential(String),

    #[error("Credential for {got} used with {expected} client")]
    WrongProvider { expected: ProviderId, got: ProviderId },
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Convert infrastructure GatewayError to port ProviderError
impl From<GatewayError> for ProviderError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized(_)
            | GatewayError::MalformedCredential(_)
            | GatewayError::WrongProvider { .. } => {
                ProviderError::InvalidCredential
            }
            GatewayError::Throttled { retry_after } => {
                ProviderError::RateLimitedByProvider { retry_after }
            }
            GatewayError::Http(e) if e.is_timeout() => {
                ProviderError::Transient(format!("request timed out: {}", e))
            }
            other => ProviderError::Transient(other.to_string()),
        }
    }
}

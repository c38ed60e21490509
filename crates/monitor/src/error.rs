use priceguard_core::ProviderId;
use thiserror::Error;

/// Why a monitoring cycle ended in `Failed`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("Provider rejected the credentials")]
    InvalidCredential,

    #[error("No credential available for this pair")]
    CredentialUnavailable,

    #[error("Provider still failing after {attempts} attempts: {reason}")]
    TransientExhausted { attempts: u32, reason: String },

    #[error("Provider still throttling after {attempts} attempts")]
    RateLimitedExhausted { attempts: u32 },

    #[error("Request timed out in queue after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Snapshot store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Request queue closed")]
    QueueClosed,

    #[error("No client or queue configured for {0}")]
    Unconfigured(ProviderId),
}

impl CycleError {
    /// Failures the user has to fix by supplying new keys
    pub fn is_credential_problem(&self) -> bool {
        matches!(
            self,
            CycleError::InvalidCredential | CycleError::CredentialUnavailable
        )
    }

    /// Failures expected to clear up on a later cycle
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CycleError::TransientExhausted { .. }
                | CycleError::RateLimitedExhausted { .. }
                | CycleError::Timeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CycleError>;

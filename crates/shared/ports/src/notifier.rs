use async_trait::async_trait;
use priceguard_core::{ChangeSet, ProviderId, UserId};

use crate::error::NotifyError;

/// Failure reported to the user-facing collaborator
///
/// Only `CredentialInvalid` should prompt the user to re-enter keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureSignal {
    CredentialInvalid,
    CredentialUnavailable,
    Transient { reason: String },
}

/// Port to the notification collaborator
///
/// Delivery is fire-and-forget from the pipeline's side: an error is logged
/// and never undoes the snapshot commit that preceded it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(
        &self,
        user: UserId,
        provider: ProviderId,
        changes: &ChangeSet,
    ) -> Result<(), NotifyError>;

    async fn report_failure(
        &self,
        user: UserId,
        provider: ProviderId,
        signal: FailureSignal,
    ) -> Result<(), NotifyError>;
}

use async_trait::async_trait;
use priceguard_core::{Credential, ProviderId, UserId};

use crate::error::CredentialError;

/// Port to the credential storage collaborator
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, user: UserId, provider: ProviderId)
    -> Result<Credential, CredentialError>;
}

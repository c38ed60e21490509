//! In-memory stand-ins for the credential store and subscription registry

use async_trait::async_trait;
use priceguard_core::{Credential, ProviderId, UserId};
use priceguard_ports::{CredentialError, CredentialResolver, Subscription, SubscriptionSource};
use std::collections::HashMap;
use std::time::Duration;

/// Credentials known up front, keyed by pair
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    credentials: HashMap<(UserId, ProviderId), Credential>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the credential for its own provider
    pub fn insert(&mut self, user: UserId, credential: Credential) {
        self.credentials
            .insert((user, credential.provider()), credential);
    }

    pub fn with(mut self, user: UserId, credential: Credential) -> Self {
        self.insert(user, credential);
        self
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[async_trait]
impl CredentialResolver for StaticCredentials {
    async fn resolve(
        &self,
        user: UserId,
        provider: ProviderId,
    ) -> Result<Credential, CredentialError> {
        self.credentials
            .get(&(user, provider))
            .cloned()
            .ok_or(CredentialError::Unavailable { user, provider })
    }
}

/// Fixed subscription list
#[derive(Debug, Clone, Default)]
pub struct StaticSubscriptions {
    subscriptions: Vec<Subscription>,
}

impl StaticSubscriptions {
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self { subscriptions }
    }

    pub fn with(mut self, user: UserId, provider: ProviderId, check_interval: Duration) -> Self {
        self.subscriptions.push(Subscription {
            user,
            provider,
            check_interval,
        });
        self
    }
}

#[async_trait]
impl SubscriptionSource for StaticSubscriptions {
    async fn active_subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.clone()
    }
}

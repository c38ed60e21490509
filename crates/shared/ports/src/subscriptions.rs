use async_trait::async_trait;
use priceguard_core::{ProviderId, UserId};
use std::time::Duration;

/// One (user, provider) pair that should be polled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub user: UserId,
    pub provider: ProviderId,
    /// Minimum time between two scheduled checks of this pair
    pub check_interval: Duration,
}

/// Port to the subscription registry (users with an active plan and keys)
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn active_subscriptions(&self) -> Vec<Subscription>;
}

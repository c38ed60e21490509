use log::info;
use priceguard_core::ProviderId;
use std::collections::HashMap;

use crate::limiter::{RateLimitConfig, RateLimiter};
use crate::queue::{QueueStats, RequestQueue};

/// One request queue per configured provider
#[derive(Clone, Default)]
pub struct Dispatcher {
    queues: HashMap<ProviderId, RequestQueue>,
}

impl Dispatcher {
    /// Spawn a limiter-gated worker for every provider in `limits`
    pub fn spawn(limits: impl IntoIterator<Item = (ProviderId, RateLimitConfig)>) -> Self {
        let queues = limits
            .into_iter()
            .map(|(provider, config)| {
                info!(
                    "Dispatching {} at {} requests per {:?}, spaced {:?}",
                    provider, config.max_requests_per_window, config.window, config.min_interval
                );
                let queue = RequestQueue::spawn(RateLimiter::new(provider, config));
                (provider, queue)
            })
            .collect();
        Self { queues }
    }

    pub fn queue(&self, provider: ProviderId) -> Option<&RequestQueue> {
        self.queues.get(&provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.queues.keys().copied()
    }

    pub fn stats(&self, provider: ProviderId) -> Option<QueueStats> {
        self.queues.get(&provider).map(RequestQueue::stats)
    }
}

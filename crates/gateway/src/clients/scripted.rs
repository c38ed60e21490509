use async_trait::async_trait;
use log::debug;
use priceguard_core::{
    Credential, ProductEntry, Promotion, PromotionId, ProviderId, ProviderSnapshot,
};
use priceguard_ports::{Clock, ProviderClient, ProviderError};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::snapshot_from;

type Outcome = Result<Vec<Promotion>, ProviderError>;

/// In-process client replaying prepared outcomes
///
/// Each `fetch_promotions` call consumes the next scripted outcome. Once the
/// script runs out, the last successful promotion list is served again, so a
/// dry run settles into "nothing changed".
pub struct ScriptedClient {
    provider: ProviderId,
    clock: Arc<dyn Clock>,
    script: Mutex<VecDeque<Outcome>>,
    steady: Mutex<Vec<Promotion>>,
    products: Mutex<HashMap<PromotionId, Vec<ProductEntry>>>,
    reject_credentials: AtomicBool,
    latency: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedClient {
    pub fn new(provider: ProviderId, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            clock,
            script: Mutex::new(VecDeque::new()),
            steady: Mutex::new(Vec::new()),
            products: Mutex::new(HashMap::new()),
            reject_credentials: AtomicBool::new(false),
            latency: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Queue a successful fetch returning `promotions`
    pub fn push_promotions(&self, promotions: Vec<Promotion>) -> &Self {
        locked(&self.script).push_back(Ok(promotions));
        self
    }

    /// Queue a failed fetch
    pub fn push_error(&self, error: ProviderError) -> &Self {
        locked(&self.script).push_back(Err(error));
        self
    }

    pub fn set_products(&self, promotion_id: PromotionId, products: Vec<ProductEntry>) {
        locked(&self.products).insert(promotion_id, products);
    }

    /// Make every call fail as if the keys had been revoked
    pub fn reject_credentials(&self, reject: bool) {
        self.reject_credentials.store(reject, Ordering::SeqCst);
    }

    /// Delay every fetch by `latency` (tokio time)
    pub fn set_latency(&self, latency: Duration) {
        *locked(&self.latency) = Some(latency);
    }

    /// Number of `fetch_promotions` calls served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self, credential: &Credential) -> Result<(), ProviderError> {
        if credential.provider() != self.provider || self.reject_credentials.load(Ordering::SeqCst)
        {
            return Err(ProviderError::InvalidCredential);
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderClient for ScriptedClient {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn validate_credential(&self, credential: &Credential) -> Result<bool, ProviderError> {
        Ok(self.check(credential).is_ok())
    }

    async fn fetch_promotions(
        &self,
        credential: &Credential,
    ) -> Result<ProviderSnapshot, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let latency = *locked(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.check(credential)?;

        let next = locked(&self.script).pop_front();
        let promotions = match next {
            Some(Ok(promotions)) => {
                *locked(&self.steady) = promotions.clone();
                promotions
            }
            Some(Err(error)) => {
                debug!("Scripted {} fetch fails with {}", self.provider, error);
                return Err(error);
            }
            None => locked(&self.steady).clone(),
        };

        snapshot_from(self.provider, promotions, self.clock.now())
    }

    async fn fetch_promotion_products(
        &self,
        credential: &Credential,
        promotion_id: &PromotionId,
    ) -> Result<Vec<ProductEntry>, ProviderError> {
        self.check(credential)?;
        Ok(locked(&self.products)
            .get(promotion_id)
            .cloned()
            .unwrap_or_default())
    }
}

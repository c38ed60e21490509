use async_trait::async_trait;
use priceguard_core::{Credential, ProductEntry, PromotionId, ProviderId, ProviderSnapshot};

use crate::error::ProviderError;

/// Port for one marketplace's promotions API
///
/// Each variant speaks its own wire format but returns the common
/// `Promotion` / `ProviderSnapshot` shape; provider-specific fields are only
/// visible through the promotion attribute map.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Marketplace served by this client
    fn provider(&self) -> ProviderId;

    /// `Ok(false)` when the provider rejects the credential
    async fn validate_credential(&self, credential: &Credential) -> Result<bool, ProviderError>;

    /// Fetch the current promotion state for the credential's seller account
    async fn fetch_promotions(
        &self,
        credential: &Credential,
    ) -> Result<ProviderSnapshot, ProviderError>;

    /// Fetch the products attached to one promotion
    async fn fetch_promotion_products(
        &self,
        credential: &Credential,
        promotion_id: &PromotionId,
    ) -> Result<Vec<ProductEntry>, ProviderError>;
}

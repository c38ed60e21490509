use async_trait::async_trait;
use priceguard_core::{ProviderId, ProviderSnapshot, UserId};

use crate::error::StoreError;

/// Port for the last-known promotion state per (user, provider)
///
/// A missing entry is not an error: it means the pair has never been
/// polled. Writes are last-write-wins per pair.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(
        &self,
        user: UserId,
        provider: ProviderId,
    ) -> Result<Option<ProviderSnapshot>, StoreError>;

    async fn put(
        &self,
        user: UserId,
        provider: ProviderId,
        snapshot: ProviderSnapshot,
    ) -> Result<(), StoreError>;
}

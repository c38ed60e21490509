use async_trait::async_trait;
use dashmap::DashMap;
use priceguard_core::{ProviderId, ProviderSnapshot, UserId};
use priceguard_ports::{SnapshotStore, StoreError};
use std::sync::Arc;

/// In-memory snapshot store
///
/// Thread-safe storage for snapshots using DashMap.
/// Suitable for dry runs and testing.
#[derive(Clone, Default)]
pub struct InMemorySnapshotStore {
    /// Last committed snapshot by (user, provider)
    snapshots: Arc<DashMap<(UserId, ProviderId), ProviderSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pairs with a committed snapshot
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn get(
        &self,
        user: UserId,
        provider: ProviderId,
    ) -> Result<Option<ProviderSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .get(&(user, provider))
            .map(|s| s.value().clone()))
    }

    async fn put(
        &self,
        user: UserId,
        provider: ProviderId,
        snapshot: ProviderSnapshot,
    ) -> Result<(), StoreError> {
        self.snapshots.insert((user, provider), snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use priceguard_core::Promotion;

    fn snapshot(provider: ProviderId, ids: &[i64]) -> ProviderSnapshot {
        let promotions = ids
            .iter()
            .map(|id| Promotion::builder(*id).build().unwrap())
            .collect();
        ProviderSnapshot::new(provider, promotions, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_absent_pair_is_none() {
        let store = InMemorySnapshotStore::new();

        let result = store.get(UserId::new(1), ProviderId::Ozon).await.unwrap();

        assert!(result.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_last_write_wins_per_pair() {
        let store = InMemorySnapshotStore::new();
        let user = UserId::new(7);

        store
            .put(user, ProviderId::Ozon, snapshot(ProviderId::Ozon, &[1]))
            .await
            .unwrap();
        store
            .put(user, ProviderId::Ozon, snapshot(ProviderId::Ozon, &[1, 2]))
            .await
            .unwrap();
        store
            .put(
                user,
                ProviderId::Wildberries,
                snapshot(ProviderId::Wildberries, &[9]),
            )
            .await
            .unwrap();

        let ozon = store.get(user, ProviderId::Ozon).await.unwrap().unwrap();
        let wb = store
            .get(user, ProviderId::Wildberries)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ozon.len(), 2);
        assert_eq!(wb.len(), 1);
        assert_eq!(store.len(), 2);
        assert!(
            store
                .get(UserId::new(8), ProviderId::Ozon)
                .await
                .unwrap()
                .is_none()
        );
    }
}

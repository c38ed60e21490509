use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Promotion, ProviderId};
use crate::values::{PromotionId, Timestamp};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Promotion {0} appears more than once in one snapshot")]
    DuplicatePromotion(PromotionId),
}

/// Full set of promotions returned by one fetch for one (user, provider) pair
///
/// Immutable once constructed. Promotions are kept sorted by id, so two
/// snapshots holding the same promotions are equal regardless of the order
/// the provider returned them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct ProviderSnapshot {
    provider: ProviderId,
    promotions: Vec<Promotion>,
    fetched_at: Timestamp,
}

/// Wire shape of a snapshot; decoded data goes through `ProviderSnapshot::new`
#[derive(Deserialize)]
struct RawSnapshot {
    provider: ProviderId,
    promotions: Vec<Promotion>,
    fetched_at: Timestamp,
}

impl TryFrom<RawSnapshot> for ProviderSnapshot {
    type Error = SnapshotError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        Self::new(raw.provider, raw.promotions, raw.fetched_at)
    }
}

impl ProviderSnapshot {
    /// Build a snapshot, rejecting duplicate promotion ids
    pub fn new(
        provider: ProviderId,
        mut promotions: Vec<Promotion>,
        fetched_at: Timestamp,
    ) -> Result<Self, SnapshotError> {
        promotions.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pair) = promotions.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(SnapshotError::DuplicatePromotion(pair[0].id.clone()));
        }

        Ok(Self {
            provider,
            promotions,
            fetched_at,
        })
    }

    /// Snapshot with no promotions
    pub fn empty(provider: ProviderId, fetched_at: Timestamp) -> Self {
        Self {
            provider,
            promotions: Vec::new(),
            fetched_at,
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    /// Promotions in ascending id order
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    pub fn get(&self, id: &PromotionId) -> Option<&Promotion> {
        self.promotions
            .binary_search_by(|p| p.id.cmp(id))
            .ok()
            .map(|idx| &self.promotions[idx])
    }

    pub fn contains(&self, id: &PromotionId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }

    /// Number of promotions the seller currently takes part in
    pub fn participating_count(&self) -> usize {
        self.promotions.iter().filter(|p| p.is_participating).count()
    }
}

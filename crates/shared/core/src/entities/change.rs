use serde::{Deserialize, Serialize};

use super::{Promotion, ProviderId};
use crate::values::{PromotionId, Timestamp};

/// Classification of a promotion between two consecutive snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    New,
    Updated,
    Ended,
}

/// One classified difference for one promotion id
///
/// Shape per kind: `New` has only `current`, `Ended` has only `previous`,
/// `Updated` has both plus the names of the fields that differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    kind: ChangeKind,
    promotion_id: PromotionId,
    previous: Option<Promotion>,
    current: Option<Promotion>,
    changed_fields: Vec<String>,
}

impl ChangeRecord {
    pub fn new_promotion(current: Promotion) -> Self {
        Self {
            kind: ChangeKind::New,
            promotion_id: current.id.clone(),
            previous: None,
            current: Some(current),
            changed_fields: Vec::new(),
        }
    }

    pub fn updated(previous: Promotion, current: Promotion, changed_fields: Vec<String>) -> Self {
        Self {
            kind: ChangeKind::Updated,
            promotion_id: current.id.clone(),
            previous: Some(previous),
            current: Some(current),
            changed_fields,
        }
    }

    pub fn ended(previous: Promotion) -> Self {
        Self {
            kind: ChangeKind::Ended,
            promotion_id: previous.id.clone(),
            previous: Some(previous),
            current: None,
            changed_fields: Vec::new(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn promotion_id(&self) -> &PromotionId {
        &self.promotion_id
    }

    pub fn previous(&self) -> Option<&Promotion> {
        self.previous.as_ref()
    }

    pub fn current(&self) -> Option<&Promotion> {
        self.current.as_ref()
    }

    /// Names of compared fields that differ (empty unless `Updated`)
    pub fn changed_fields(&self) -> &[String] {
        &self.changed_fields
    }

    /// Whichever side is present, preferring the current one
    pub fn promotion(&self) -> Option<&Promotion> {
        self.current.as_ref().or(self.previous.as_ref())
    }
}

/// Counts per change kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub new: usize,
    pub updated: usize,
    pub ended: usize,
}

/// Classified difference between two consecutive snapshots of one pair
///
/// Records are ordered New, then Updated, then Ended; each group by
/// promotion id ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    provider: ProviderId,
    computed_at: Timestamp,
    records: Vec<ChangeRecord>,
}

impl ChangeSet {
    /// Build a change set, putting records into presentation order
    pub fn new(provider: ProviderId, computed_at: Timestamp, mut records: Vec<ChangeRecord>) -> Self {
        records.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.promotion_id.cmp(&b.promotion_id))
        });
        Self {
            provider,
            computed_at,
            records,
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn computed_at(&self) -> Timestamp {
        self.computed_at
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    pub fn new_promotions(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.of_kind(ChangeKind::New)
    }

    pub fn updated(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.of_kind(ChangeKind::Updated)
    }

    pub fn ended(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.of_kind(ChangeKind::Ended)
    }

    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        for record in &self.records {
            match record.kind {
                ChangeKind::New => summary.new += 1,
                ChangeKind::Updated => summary.updated += 1,
                ChangeKind::Ended => summary.ended += 1,
            }
        }
        summary
    }
}

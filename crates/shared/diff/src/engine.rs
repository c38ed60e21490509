use log::{debug, warn};
use priceguard_core::{ChangeRecord, ChangeSet, Promotion, PromotionId, ProviderSnapshot};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{ComparedFields, DiffConfig};

/// Classifies the differences between two snapshots of one pair
///
/// - id only in `current` (or no `previous` at all) → New
/// - id in both with a compared field changed → Updated
/// - id only in `previous` → Ended
pub struct DiffEngine {
    config: DiffConfig,
}

impl DiffEngine {
    pub fn new(config: DiffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn diff(&self, previous: Option<&ProviderSnapshot>, current: &ProviderSnapshot) -> ChangeSet {
        let provider = current.provider();
        let previous = match previous {
            Some(prev) if prev.provider() != provider => {
                warn!(
                    "Baseline belongs to {} but current snapshot to {}, treating as first fetch",
                    prev.provider(),
                    provider
                );
                None
            }
            other => other,
        };

        let fields = self.config.fields_for(provider);
        let current_by_id = index(current);
        let mut records = Vec::new();

        match previous {
            None => {
                records.extend(
                    current_by_id
                        .values()
                        .map(|p| ChangeRecord::new_promotion((*p).clone())),
                );
            }
            Some(previous) => {
                let previous_by_id = index(previous);

                for (id, cur) in &current_by_id {
                    match previous_by_id.get(id) {
                        None => records.push(ChangeRecord::new_promotion((*cur).clone())),
                        Some(prev) => {
                            let changed = changed_fields(fields, prev, cur);
                            if !changed.is_empty() {
                                records.push(ChangeRecord::updated(
                                    (*prev).clone(),
                                    (*cur).clone(),
                                    changed,
                                ));
                            }
                        }
                    }
                }

                records.extend(
                    previous_by_id
                        .iter()
                        .filter(|(id, _)| !current_by_id.contains_key(*id))
                        .map(|(_, prev)| ChangeRecord::ended((*prev).clone())),
                );
            }
        }

        let changes = ChangeSet::new(provider, current.fetched_at(), records);
        let summary = changes.summary();
        debug!(
            "Diff for {}: {} new, {} updated, {} ended",
            provider, summary.new, summary.updated, summary.ended
        );
        changes
    }

    /// Names of the compared fields that differ between two versions of a promotion
    pub fn changed_fields(&self, previous: &ProviderSnapshot, current: &Promotion) -> Vec<String> {
        previous
            .get(&current.id)
            .map(|prev| changed_fields(self.config.fields_for(previous.provider()), prev, current))
            .unwrap_or_default()
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DiffConfig::default())
    }
}

fn index(snapshot: &ProviderSnapshot) -> BTreeMap<&PromotionId, &Promotion> {
    snapshot.promotions().iter().map(|p| (&p.id, p)).collect()
}

fn changed_fields(fields: &ComparedFields, previous: &Promotion, current: &Promotion) -> Vec<String> {
    let mut changed: Vec<String> = fields
        .core
        .iter()
        .filter(|field| field.differs(previous, current))
        .map(|field| field.name().to_string())
        .collect();

    let keys: BTreeSet<&String> = previous
        .attributes
        .keys()
        .chain(current.attributes.keys())
        .collect();

    for key in keys {
        let before = previous.attributes.get(key);
        let after = current.attributes.get(key);
        if fields.attributes.selects(key, before, after) && before != after {
            changed.push(key.clone());
        }
    }

    changed
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::values::{AttrValue, Attributes, PromotionId, Timestamp};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromotionError {
    #[error("Promotion {id} ends ({end}) before it starts ({start})")]
    InvertedWindow {
        id: PromotionId,
        start: Timestamp,
        end: Timestamp,
    },
}

/// One promotional campaign as seen by a seller
///
/// Provider payloads are normalized into this shape at the client boundary;
/// fields without a common meaning live in `attributes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: PromotionId,
    pub title: String,
    /// Provider-defined category ("DISCOUNT", "HOT_SALE", "auto", ...)
    pub kind: String,
    pub start_time: Option<Timestamp>,
    /// `None` for open-ended campaigns
    pub end_time: Option<Timestamp>,
    pub participating_product_count: u64,
    pub potential_product_count: u64,
    pub is_participating: bool,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Promotion {
    /// Start building a promotion with the given id
    pub fn builder(id: impl Into<PromotionId>) -> PromotionBuilder {
        PromotionBuilder::new(id.into())
    }

    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Check the start/end ordering invariant
    pub fn validate(&self) -> Result<(), PromotionError> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end < start => Err(PromotionError::InvertedWindow {
                id: self.id.clone(),
                start,
                end,
            }),
            _ => Ok(()),
        }
    }

    /// Whether the campaign is still running at `now`
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        let started = self.start_time.is_none_or(|start| start <= now);
        let not_ended = self.end_time.is_none_or(|end| now <= end);
        started && not_ended
    }
}

/// Builder for [`Promotion`]
#[derive(Debug, Clone)]
pub struct PromotionBuilder {
    promotion: Promotion,
}

impl PromotionBuilder {
    fn new(id: PromotionId) -> Self {
        Self {
            promotion: Promotion {
                id,
                title: String::new(),
                kind: String::new(),
                start_time: None,
                end_time: None,
                participating_product_count: 0,
                potential_product_count: 0,
                is_participating: false,
                attributes: Attributes::new(),
            },
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.promotion.title = title.into();
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.promotion.kind = kind.into();
        self
    }

    pub fn window(mut self, start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        self.promotion.start_time = start;
        self.promotion.end_time = end;
        self
    }

    pub fn product_counts(mut self, participating: u64, potential: u64) -> Self {
        self.promotion.participating_product_count = participating;
        self.promotion.potential_product_count = potential;
        self
    }

    pub fn participating(mut self, is_participating: bool) -> Self {
        self.promotion.is_participating = is_participating;
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.promotion.attributes.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Promotion, PromotionError> {
        self.promotion.validate()?;
        Ok(self.promotion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_sets_fields() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let promo = Promotion::builder(101)
            .title("Spring sale")
            .kind("DISCOUNT")
            .window(Some(start), Some(start + Duration::days(7)))
            .product_counts(12, 40)
            .participating(true)
            .attribute("discount_value", dec!(15))
            .build()
            .unwrap();

        assert_eq!(promo.id, PromotionId::Int(101));
        assert_eq!(promo.participating_product_count, 12);
        assert_eq!(
            promo.attribute("discount_value"),
            Some(&AttrValue::from(15))
        );
    }

    #[test]
    fn test_inverted_window_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap();
        let result = Promotion::builder("hotsale-1")
            .window(Some(start), Some(start - Duration::days(1)))
            .build();

        assert!(matches!(result, Err(PromotionError::InvertedWindow { .. })));
    }

    #[test]
    fn test_open_ended_is_active() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let promo = Promotion::builder(1)
            .window(Some(start), None)
            .build()
            .unwrap();

        assert!(promo.is_active_at(start + Duration::days(365)));
        assert!(!promo.is_active_at(start - Duration::seconds(1)));
    }
}

//! Demo Feed - Synthetic promotion calendars for dry runs
//!
//! Generates successive promotion lists that drift the way a real seller
//! calendar does:
//! - Participation counts move up and down
//! - Discounts get revised
//! - Campaigns end and new ones appear
//!
//! Each generation is what one fetch would return.

use chrono::Duration;
use priceguard_core::{Promotion, ProviderId, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Configuration for the demo feed
#[derive(Debug, Clone)]
pub struct DemoFeedConfig {
    /// Promotions in the first generation
    pub initial_promotions: usize,
    /// Chance per generation that a campaign ends, and that a new one starts
    pub churn_probability: f64,
    /// Largest change of the participating count between generations
    pub max_participation_step: u64,
    /// Products eligible for every demo campaign
    pub potential_products: u64,
}

impl Default for DemoFeedConfig {
    fn default() -> Self {
        Self {
            initial_promotions: 4,
            churn_probability: 0.2,
            max_participation_step: 5,
            potential_products: 120,
        }
    }
}

/// Generates promotion calendars for one provider
pub struct DemoFeed {
    provider: ProviderId,
    config: DemoFeedConfig,
    live: Vec<Promotion>,
    next_id: i64,
    rng: StdRng,
}

impl DemoFeed {
    pub fn new(provider: ProviderId, config: DemoFeedConfig) -> Self {
        Self::from_rng(provider, config, StdRng::from_entropy())
    }

    /// Create with a specific seed for reproducible runs
    pub fn with_seed(provider: ProviderId, config: DemoFeedConfig, seed: u64) -> Self {
        Self::from_rng(provider, config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(provider: ProviderId, config: DemoFeedConfig, rng: StdRng) -> Self {
        Self {
            provider,
            config,
            live: Vec::new(),
            next_id: 1,
            rng,
        }
    }

    /// Promotions a fetch at `now` would return
    pub fn next_generation(&mut self, now: Timestamp) -> Vec<Promotion> {
        if self.live.is_empty() {
            for _ in 0..self.config.initial_promotions {
                self.open_campaign(now);
            }
            return self.live.clone();
        }

        let churn = self.config.churn_probability;
        let ending = self.rng.gen_bool(churn).then(|| self.rng.gen_range(0..self.live.len()));
        if let Some(idx) = ending {
            self.live.remove(idx);
        }

        let step = self.config.max_participation_step;
        let potential = self.config.potential_products;
        for promotion in &mut self.live {
            let delta = self.rng.gen_range(0..=step * 2);
            promotion.participating_product_count = (promotion.participating_product_count
                + delta)
                .saturating_sub(step)
                .min(potential);
            promotion.is_participating = promotion.participating_product_count > 0;

            if self.rng.gen_bool(churn) {
                let discount = Decimal::from(self.rng.gen_range(5..=50i64));
                promotion
                    .attributes
                    .insert("discount_value".to_string(), discount.into());
            }
        }

        if self.rng.gen_bool(churn) {
            self.open_campaign(now);
        }
        self.live.clone()
    }

    fn open_campaign(&mut self, now: Timestamp) {
        let id = self.next_id;
        self.next_id += 1;

        let kind = match self.provider {
            ProviderId::Ozon => "DISCOUNT",
            ProviderId::Wildberries => "auto",
        };
        let participating = self.rng.gen_range(0..=self.config.potential_products / 4);
        let days = self.rng.gen_range(3..=30);

        let built = Promotion::builder(id)
            .title(format!("Demo {} campaign #{}", self.provider, id))
            .kind(kind)
            .window(Some(now - Duration::days(1)), Some(now + Duration::days(days)))
            .product_counts(participating, self.config.potential_products)
            .participating(participating > 0)
            .attribute("discount_value", Decimal::from(self.rng.gen_range(5..=50i64)))
            .build();
        if let Ok(promotion) = built {
            self.live.push(promotion);
        }
    }
}

//! Wildberries calendar API promotions messages

use priceguard_core::{ProductEntry, Promotion};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use super::{build_promotion, collect_attributes, decimal_from_json, parse_timestamp};

/// Promotion type the seller takes part in automatically
pub const AUTO_KIND: &str = "auto";

/// `GET /api/v1/calendar/promotions`
#[derive(Debug, Deserialize)]
pub struct PromotionsResponse {
    #[serde(default)]
    pub data: PromotionsData,
}

#[derive(Debug, Default, Deserialize)]
pub struct PromotionsData {
    #[serde(default)]
    pub promotions: Vec<CalendarPromotion>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarPromotion {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "dateStart", alias = "startDateTime")]
    pub date_start: Option<String>,
    #[serde(rename = "dateEnd", alias = "endDateTime")]
    pub date_end: Option<String>,
    #[serde(rename = "inPromoActionTotal", default)]
    pub in_promo_total: u64,
    #[serde(rename = "notInPromoActionTotal", default)]
    pub not_in_promo_total: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalendarPromotion {
    pub fn is_auto(&self) -> bool {
        self.kind == AUTO_KIND
    }

    pub fn into_promotion(self) -> Option<Promotion> {
        let start = parse_timestamp(self.date_start.as_deref());
        let end = parse_timestamp(self.date_end.as_deref());
        let mut builder = Promotion::builder(self.id)
            .title(self.name)
            .kind(self.kind)
            .product_counts(
                self.in_promo_total,
                self.in_promo_total + self.not_in_promo_total,
            )
            .participating(self.in_promo_total > 0);
        for (key, value) in collect_attributes(&self.extra) {
            builder = builder.attribute(key, value);
        }
        build_promotion(builder, start, end)
    }
}

/// `GET /api/v1/calendar/promotions/nomenclatures`
#[derive(Debug, Deserialize)]
pub struct NomenclaturesResponse {
    #[serde(default)]
    pub data: NomenclaturesData,
}

#[derive(Debug, Default, Deserialize)]
pub struct NomenclaturesData {
    #[serde(default)]
    pub nomenclatures: Vec<Nomenclature>,
}

#[derive(Debug, Deserialize)]
pub struct Nomenclature {
    pub id: i64,
    pub price: Option<Number>,
    #[serde(rename = "planPrice")]
    pub plan_price: Option<Number>,
    /// inAction, currencyCode, discount, planDiscount, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Nomenclature {
    pub fn into_entry(self) -> ProductEntry {
        let mut entry = ProductEntry::new(self.id.to_string()).with_prices(
            self.price.as_ref().and_then(decimal_from_json),
            self.plan_price.as_ref().and_then(decimal_from_json),
        );
        entry.attributes = collect_attributes(&self.extra);
        entry
    }
}

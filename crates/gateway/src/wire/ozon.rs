//! Ozon Seller API promotions messages

use priceguard_core::{ProductEntry, Promotion, PromotionId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::{build_promotion, collect_attributes, decimal_from_json, parse_timestamp};

/// Kind assigned to every hot sale
pub const HOT_SALE_KIND: &str = "HOT_SALE";
/// Prefix separating hot-sale ids from regular action ids
pub const HOT_SALE_PREFIX: &str = "hotsale-";

/// `GET /v1/actions`
#[derive(Debug, Deserialize)]
pub struct ActionsResponse {
    #[serde(default)]
    pub result: Vec<Action>,
}

#[derive(Debug, Deserialize)]
pub struct Action {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub action_type: String,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    #[serde(default)]
    pub participating_products_count: u64,
    #[serde(default)]
    pub potential_products_count: u64,
    #[serde(default)]
    pub is_participating: bool,
    /// discount_type, discount_value, order_amount, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Action {
    pub fn into_promotion(self) -> Option<Promotion> {
        let start = parse_timestamp(self.date_start.as_deref());
        let end = parse_timestamp(self.date_end.as_deref());
        let mut builder = Promotion::builder(self.id)
            .title(self.title)
            .kind(self.action_type)
            .product_counts(
                self.participating_products_count,
                self.potential_products_count,
            )
            .participating(self.is_participating);
        for (key, value) in collect_attributes(&self.extra) {
            builder = builder.attribute(key, value);
        }
        build_promotion(builder, start, end)
    }
}

/// `POST /v1/actions/hotsales/list`
#[derive(Debug, Deserialize)]
pub struct HotSalesResponse {
    #[serde(default)]
    pub result: Vec<HotSale>,
}

#[derive(Debug, Deserialize)]
pub struct HotSale {
    #[serde(alias = "hotsale_id")]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    #[serde(default)]
    pub is_participating: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HotSale {
    pub fn promotion_id(id: i64) -> PromotionId {
        PromotionId::Str(format!("{}{}", HOT_SALE_PREFIX, id))
    }

    pub fn into_promotion(self) -> Option<Promotion> {
        let start = parse_timestamp(self.date_start.as_deref());
        let end = parse_timestamp(self.date_end.as_deref());
        let mut builder = Promotion::builder(Self::promotion_id(self.id))
            .title(self.title)
            .kind(HOT_SALE_KIND)
            .participating(self.is_participating);
        for (key, value) in collect_attributes(&self.extra) {
            builder = builder.attribute(key, value);
        }
        build_promotion(builder, start, end)
    }
}

/// Parse a `hotsale-<id>` promotion id back into the numeric hot-sale id
pub fn hot_sale_id(id: &PromotionId) -> Option<i64> {
    match id {
        PromotionId::Str(s) => s.strip_prefix(HOT_SALE_PREFIX)?.parse().ok(),
        PromotionId::Int(_) => None,
    }
}

/// `POST /v1/actions/products`
#[derive(Debug, Serialize)]
pub struct ActionProductsRequest {
    pub action_id: i64,
    pub limit: u32,
    pub offset: u32,
}

/// `POST /v1/actions/hotsales/products`
#[derive(Debug, Serialize)]
pub struct HotSaleProductsRequest {
    pub hotsale_id: i64,
    pub limit: u32,
    pub offset: u32,
}

/// Response of both product listings
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    pub result: ProductsPage,
}

#[derive(Debug, Deserialize)]
pub struct ProductsPage {
    #[serde(default)]
    pub products: Vec<ActionProduct>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct ActionProduct {
    pub id: i64,
    pub price: Option<Number>,
    pub action_price: Option<Number>,
    pub stock: Option<u64>,
    /// max_action_price, add_mode, min_stock, date_day_promo, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionProduct {
    pub fn into_entry(self) -> ProductEntry {
        let mut entry = ProductEntry::new(self.id.to_string())
            .with_prices(
                self.price.as_ref().and_then(decimal_from_json),
                self.action_price.as_ref().and_then(decimal_from_json),
            )
            .with_stock(self.stock);
        entry.attributes = collect_attributes(&self.extra);
        entry
    }
}

/// `POST /v3/product/info/stocks`, used only to probe credentials
#[derive(Debug, Serialize)]
pub struct StocksProbeRequest {
    pub filter: StocksFilter,
    pub last_id: String,
    pub limit: u32,
}

#[derive(Debug, Serialize)]
pub struct StocksFilter {
    pub visibility: String,
}

impl Default for StocksProbeRequest {
    fn default() -> Self {
        Self {
            filter: StocksFilter {
                visibility: "ALL".to_string(),
            },
            last_id: String::new(),
            limit: 1,
        }
    }
}

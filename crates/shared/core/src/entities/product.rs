use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::Attributes;

/// One product taking part (or eligible to take part) in a promotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub product_id: String,
    /// Regular price
    pub price: Option<Decimal>,
    /// Price inside the promotion
    pub action_price: Option<Decimal>,
    pub stock: Option<u64>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl ProductEntry {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            price: None,
            action_price: None,
            stock: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_prices(mut self, price: Option<Decimal>, action_price: Option<Decimal>) -> Self {
        self.price = price;
        self.action_price = action_price;
        self
    }

    pub fn with_stock(mut self, stock: Option<u64>) -> Self {
        self.stock = stock;
        self
    }

    /// Discount granted by the promotion, if both prices are known
    pub fn discount(&self) -> Option<Decimal> {
        match (self.price, self.action_price) {
            (Some(price), Some(action)) => Some(price - action),
            _ => None,
        }
    }
}

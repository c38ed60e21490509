//! Gateway configuration

use serde::Deserialize;
use std::time::Duration;

/// Provider endpoints and HTTP settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Ozon Seller API
    pub ozon_base_url: String,
    /// Wildberries promotions calendar API
    pub wb_calendar_url: String,
    /// Wildberries common API (used for `/ping`)
    pub wb_common_url: String,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
    /// Page size for product listings
    pub page_size: u32,
    /// Keep only Wildberries promotions of type `auto`
    pub wb_auto_only: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ozon_base_url: "https://api-seller.ozon.ru".to_string(),
            wb_calendar_url: "https://dp-calendar-api.wildberries.ru".to_string(),
            wb_common_url: "https://common-api.wildberries.ru".to_string(),
            request_timeout_secs: 30,
            page_size: 1000,
            wb_auto_only: true,
        }
    }
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Point every provider at one base URL (local test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            ozon_base_url: base_url.clone(),
            wb_calendar_url: base_url.clone(),
            wb_common_url: base_url,
            ..Self::default()
        }
    }
}

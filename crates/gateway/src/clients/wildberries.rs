use async_trait::async_trait;
use chrono::{Duration, SecondsFormat};
use log::{debug, info, warn};
use priceguard_core::{Credential, ProductEntry, PromotionId, ProviderId, ProviderSnapshot};
use priceguard_ports::{Clock, ProviderClient, ProviderError};
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde_json::Value;
use std::sync::Arc;

use super::{header_value, snapshot_from, validation_outcome};
use crate::error::GatewayError;
use crate::rest::RestClient;
use crate::wire::wildberries::{Nomenclature, NomenclaturesResponse, PromotionsResponse};

/// How far ahead the calendar is queried
const CALENDAR_LOOKAHEAD_DAYS: i64 = 90;

/// Wildberries client (promotions calendar + common API)
pub struct WildberriesClient {
    calendar: RestClient,
    common: RestClient,
    clock: Arc<dyn Clock>,
    page_size: u32,
    auto_only: bool,
}

impl WildberriesClient {
    pub fn new(
        calendar: RestClient,
        common: RestClient,
        clock: Arc<dyn Clock>,
        page_size: u32,
        auto_only: bool,
    ) -> Self {
        Self {
            calendar,
            common,
            clock,
            page_size: page_size.max(1),
            auto_only,
        }
    }

    fn headers(credential: &Credential) -> Result<HeaderMap, GatewayError> {
        let Credential::Wildberries { api_key } = credential else {
            return Err(GatewayError::WrongProvider {
                expected: ProviderId::Wildberries,
                got: credential.provider(),
            });
        };

        let (_, value) = header_value(AUTHORIZATION.as_str(), api_key)?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

#[async_trait]
impl ProviderClient for WildberriesClient {
    fn provider(&self) -> ProviderId {
        ProviderId::Wildberries
    }

    async fn validate_credential(&self, credential: &Credential) -> Result<bool, ProviderError> {
        let probe = async {
            let headers = Self::headers(credential)?;
            self.common.get::<Value>("/ping", headers, &[]).await?;
            Ok::<(), GatewayError>(())
        };
        let outcome = validation_outcome(probe.await.map_err(ProviderError::from));
        debug!("Wildberries credential validation: {:?}", outcome);
        outcome
    }

    async fn fetch_promotions(
        &self,
        credential: &Credential,
    ) -> Result<ProviderSnapshot, ProviderError> {
        let headers = Self::headers(credential)?;
        let now = self.clock.now();
        let query = [
            ("startDateTime", now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            (
                "endDateTime",
                (now + Duration::days(CALENDAR_LOOKAHEAD_DAYS))
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("allPromo", "true".to_string()),
        ];

        let response: PromotionsResponse = self
            .calendar
            .get("/api/v1/calendar/promotions", headers, &query)
            .await?;
        let total = response.data.promotions.len();

        let promotions: Vec<_> = response
            .data
            .promotions
            .into_iter()
            .filter(|promo| !self.auto_only || promo.is_auto())
            .filter_map(|promo| promo.into_promotion())
            .collect();
        info!(
            "Wildberries returned {} promotions, {} kept",
            total,
            promotions.len()
        );

        snapshot_from(ProviderId::Wildberries, promotions, now)
    }

    async fn fetch_promotion_products(
        &self,
        credential: &Credential,
        promotion_id: &PromotionId,
    ) -> Result<Vec<ProductEntry>, ProviderError> {
        let Some(id) = promotion_id.as_int() else {
            warn!("{} is not a Wildberries promotion id", promotion_id);
            return Ok(Vec::new());
        };
        let headers = Self::headers(credential)?;
        let mut entries = Vec::new();
        let mut offset = 0u32;

        loop {
            let query = [
                ("promotionID", id.to_string()),
                ("inAction", "true".to_string()),
                ("limit", self.page_size.to_string()),
                ("offset", offset.to_string()),
            ];
            let page: NomenclaturesResponse = self
                .calendar
                .get(
                    "/api/v1/calendar/promotions/nomenclatures",
                    headers.clone(),
                    &query,
                )
                .await?;

            let count = page.data.nomenclatures.len();
            entries.extend(page.data.nomenclatures.into_iter().map(Nomenclature::into_entry));
            offset = offset.saturating_add(count as u32);
            if count < self.page_size as usize {
                break;
            }
        }

        debug!("Promotion {} has {} products", promotion_id, entries.len());
        Ok(entries)
    }
}

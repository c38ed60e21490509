use async_trait::async_trait;
use log::{debug, info, warn};
use priceguard_core::{Credential, ProductEntry, PromotionId, ProviderId, ProviderSnapshot};
use priceguard_ports::{Clock, ProviderClient, ProviderError};
use reqwest::header::HeaderMap;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{header_value, snapshot_from, validation_outcome};
use crate::error::GatewayError;
use crate::rest::RestClient;
use crate::wire::ozon::{
    ActionProduct, ActionProductsRequest, ActionsResponse, HotSaleProductsRequest,
    HotSalesResponse, ProductsResponse, StocksProbeRequest, hot_sale_id,
};

/// Ozon Seller API client
///
/// One `fetch_promotions` performs two HTTP calls (regular actions, then hot
/// sales) under a single dispatch slot.
pub struct OzonClient {
    rest: RestClient,
    clock: Arc<dyn Clock>,
    page_size: u32,
}

impl OzonClient {
    pub fn new(rest: RestClient, clock: Arc<dyn Clock>, page_size: u32) -> Self {
        Self {
            rest,
            clock,
            page_size: page_size.max(1),
        }
    }

    fn headers(credential: &Credential) -> Result<HeaderMap, GatewayError> {
        let Credential::Ozon { client_id, api_key } = credential else {
            return Err(GatewayError::WrongProvider {
                expected: ProviderId::Ozon,
                got: credential.provider(),
            });
        };

        let mut headers = HeaderMap::new();
        for (name, secret) in [("Client-Id", client_id), ("Api-Key", api_key)] {
            let (name, value) = header_value(name, secret)?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    async fn products_page(
        &self,
        headers: HeaderMap,
        promotion_id: &PromotionId,
        offset: u32,
    ) -> Result<Option<ProductsResponse>, GatewayError> {
        let page = match (promotion_id, hot_sale_id(promotion_id)) {
            (PromotionId::Int(action_id), _) => {
                let request = ActionProductsRequest {
                    action_id: *action_id,
                    limit: self.page_size,
                    offset,
                };
                self.rest
                    .post("/v1/actions/products", headers, &request)
                    .await?
            }
            (_, Some(hotsale_id)) => {
                let request = HotSaleProductsRequest {
                    hotsale_id,
                    limit: self.page_size,
                    offset,
                };
                self.rest
                    .post("/v1/actions/hotsales/products", headers, &request)
                    .await?
            }
            _ => return Ok(None),
        };
        Ok(Some(page))
    }
}

#[async_trait]
impl ProviderClient for OzonClient {
    fn provider(&self) -> ProviderId {
        ProviderId::Ozon
    }

    async fn validate_credential(&self, credential: &Credential) -> Result<bool, ProviderError> {
        let probe = async {
            let headers = Self::headers(credential)?;
            self.rest
                .post::<Value, _>("/v3/product/info/stocks", headers, &StocksProbeRequest::default())
                .await?;
            Ok::<(), GatewayError>(())
        };
        let outcome = validation_outcome(probe.await.map_err(ProviderError::from));
        debug!("Ozon credential validation: {:?}", outcome);
        outcome
    }

    async fn fetch_promotions(
        &self,
        credential: &Credential,
    ) -> Result<ProviderSnapshot, ProviderError> {
        let headers = Self::headers(credential)?;

        let actions: ActionsResponse = self.rest.get("/v1/actions", headers.clone(), &[]).await?;
        let hot_sales: HotSalesResponse = self
            .rest
            .post("/v1/actions/hotsales/list", headers, &json!({}))
            .await?;
        info!(
            "Ozon returned {} actions and {} hot sales",
            actions.result.len(),
            hot_sales.result.len()
        );

        let promotions = actions
            .result
            .into_iter()
            .filter_map(|action| action.into_promotion())
            .chain(
                hot_sales
                    .result
                    .into_iter()
                    .filter_map(|sale| sale.into_promotion()),
            )
            .collect();

        snapshot_from(ProviderId::Ozon, promotions, self.clock.now())
    }

    async fn fetch_promotion_products(
        &self,
        credential: &Credential,
        promotion_id: &PromotionId,
    ) -> Result<Vec<ProductEntry>, ProviderError> {
        let headers = Self::headers(credential)?;
        let mut entries = Vec::new();
        let mut offset = 0u32;

        loop {
            let Some(page) = self
                .products_page(headers.clone(), promotion_id, offset)
                .await?
            else {
                warn!("{} is not an Ozon action or hot sale id", promotion_id);
                return Ok(Vec::new());
            };

            let count = page.result.products.len();
            let total = page.result.total;
            entries.extend(page.result.products.into_iter().map(ActionProduct::into_entry));
            offset = offset.saturating_add(count as u32);

            let short_page = count < self.page_size as usize;
            let reached_total = total > 0 && entries.len() as u64 >= total;
            if short_page || reached_total {
                break;
            }
        }

        debug!("Promotion {} has {} products", promotion_id, entries.len());
        Ok(entries)
    }
}

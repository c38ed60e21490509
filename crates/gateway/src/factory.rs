//! Builds provider clients from configuration

use log::info;
use priceguard_core::ProviderId;
use priceguard_ports::{Clock, ProviderClient};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

use crate::clients::{OzonClient, WildberriesClient};
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::rest::RestClient;

/// Creates HTTP clients sharing one connection pool
pub struct ClientFactory {
    config: GatewayConfig,
    clock: Arc<dyn Clock>,
    http: Client,
}

impl ClientFactory {
    pub fn new(config: GatewayConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("priceguard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config,
            clock,
            http,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Client for one provider
    pub fn create(&self, provider: ProviderId) -> Arc<dyn ProviderClient> {
        match provider {
            ProviderId::Ozon => {
                info!("Creating Ozon client for {}", self.config.ozon_base_url);
                Arc::new(OzonClient::new(
                    RestClient::new(self.http.clone(), &self.config.ozon_base_url),
                    Arc::clone(&self.clock),
                    self.config.page_size,
                ))
            }
            ProviderId::Wildberries => {
                info!(
                    "Creating Wildberries client for {}",
                    self.config.wb_calendar_url
                );
                Arc::new(WildberriesClient::new(
                    RestClient::new(self.http.clone(), &self.config.wb_calendar_url),
                    RestClient::new(self.http.clone(), &self.config.wb_common_url),
                    Arc::clone(&self.clock),
                    self.config.page_size,
                    self.config.wb_auto_only,
                ))
            }
        }
    }

    /// Clients for every listed provider
    pub fn create_all(
        &self,
        providers: impl IntoIterator<Item = ProviderId>,
    ) -> HashMap<ProviderId, Arc<dyn ProviderClient>> {
        providers
            .into_iter()
            .map(|provider| (provider, self.create(provider)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use priceguard_clock::SystemClock;

    #[test]
    fn test_factory_builds_each_provider() {
        let factory =
            ClientFactory::new(GatewayConfig::default(), Arc::new(SystemClock::new())).unwrap();

        let clients = factory.create_all(ProviderId::ALL);

        assert_eq!(clients.len(), 2);
        for (provider, client) in clients {
            assert_eq!(client.provider(), provider);
        }
    }
}

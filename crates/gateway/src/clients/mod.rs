//! Provider client implementations

mod ozon;
mod scripted;
mod wildberries;

pub use ozon::OzonClient;
pub use scripted::ScriptedClient;
pub use wildberries::WildberriesClient;

use log::warn;
use priceguard_core::{Promotion, ProviderId, ProviderSnapshot, Timestamp};
use priceguard_ports::ProviderError;
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::HashSet;

use crate::error::GatewayError;

fn header_value(name: &str, secret: &str) -> Result<(HeaderName, HeaderValue), GatewayError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| GatewayError::MalformedCredential(e.to_string()))?;
    let mut value = HeaderValue::from_str(secret.trim())
        .map_err(|_| GatewayError::MalformedCredential(format!("invalid {} value", name)))?;
    value.set_sensitive(true);
    Ok((name, value))
}

/// Assemble a snapshot, keeping the first promotion for a repeated id
fn snapshot_from(
    provider: ProviderId,
    promotions: Vec<Promotion>,
    fetched_at: Timestamp,
) -> Result<ProviderSnapshot, ProviderError> {
    let mut seen = HashSet::new();
    let unique: Vec<Promotion> = promotions
        .into_iter()
        .filter(|p| {
            let first = seen.insert(p.id.clone());
            if !first {
                warn!("{} returned promotion {} twice, keeping the first", provider, p.id);
            }
            first
        })
        .collect();

    ProviderSnapshot::new(provider, unique, fetched_at)
        .map_err(|e| ProviderError::Transient(e.to_string()))
}

/// `InvalidCredential` becomes `Ok(false)`; everything else stays an error
fn validation_outcome(result: Result<(), ProviderError>) -> Result<bool, ProviderError> {
    match result {
        Ok(()) => Ok(true),
        Err(ProviderError::InvalidCredential) => Ok(false),
        Err(other) => Err(other),
    }
}

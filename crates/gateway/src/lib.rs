//! PriceGuard Gateway
//!
//! Marketplace layer for the PriceGuard promotion monitor. Provides:
//! - HTTP clients for Ozon and Wildberries behind the `ProviderClient` port
//! - Wire message types for each provider's promotions API
//! - A scripted in-process client for tests and dry runs
//!
//! ## Architecture
//!
//! ```text
//! External World (Ozon Seller API, Wildberries calendar/common API)
//!         │ HTTPS + JSON
//!    ┌────▼──────┐
//!    │ RestClient│  status → GatewayError (401/403, 429, 5xx, ...)
//!    └────┬──────┘
//!    ┌────▼──────┐
//!    │  wire::*  │  provider payload → Promotion / ProductEntry
//!    └────┬──────┘
//!         │ ProviderClient (ProviderError only)
//!    ┌────▼──────┐
//!    │ Dispatch  │
//!    └───────────┘
//! ```
//!
//! Raw `reqwest` errors never leave this crate; everything is classified into
//! `ProviderError` at the client boundary.

pub mod clients;
pub mod config;
pub mod error;
pub mod factory;
pub mod rest;
pub mod wire;

// Re-export commonly used types
pub use clients::{OzonClient, ScriptedClient, WildberriesClient};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use factory::ClientFactory;
pub use rest::RestClient;

//! PriceGuard Runner - Monitor process assembly
//!
//! Turns a JSON configuration into a running monitor:
//!
//! - **Config**: JSON loading, serde defaults and validation
//! - **Bootstrap**: Wires queues, clients, store, cycle and scheduler
//! - **Demo Feed**: Synthetic promotion calendars for dry runs
//!
//! ## Architecture
//!
//! ```text
//!                     ┌─────────────────┐
//!                     │    Scheduler    │
//!                     │ (ticks, forced) │
//!                     └────────┬────────┘
//!                              │ one cycle per due pair
//!                              ▼
//!                     ┌─────────────────┐       ┌──────────────────┐
//!                     │  MonitorCycle   │──────>│  SnapshotStore   │
//!                     └────────┬────────┘       │ (memory / JSON)  │
//!                              │                └──────────────────┘
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!   ┌─────────────────────┐         ┌─────────────────────┐
//!   │  Ozon RequestQueue  │         │   WB RequestQueue   │
//!   │   + RateLimiter     │         │   + RateLimiter     │
//!   └──────────┬──────────┘         └──────────┬──────────┘
//!              ▼                               ▼
//!   ┌─────────────────────┐         ┌─────────────────────┐
//!   │     OzonClient      │         │  WildberriesClient  │
//!   │  (or demo feed)     │         │   (or demo feed)    │
//!   └─────────────────────┘         └─────────────────────┘
//! ```

pub mod bootstrap;
pub mod config;
pub mod demo_feed;

// Re-export main types
pub use bootstrap::{BootstrapError, Monitor, MonitorBootstrap};
pub use config::{
    ConfigError, RunnerConfig, StoreSection, load_config, load_config_from_str,
    load_default_config,
};
pub use demo_feed::{DemoFeed, DemoFeedConfig};

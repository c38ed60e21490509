//! PriceGuard Monitor
//!
//! Orchestrates one monitoring pass per (user, provider) pair and schedules
//! those passes over time.
//!
//! ## Cycle
//!
//! ```text
//! Pending ──> Fetching ──> Diffing ──> Persisting ──> Delivering ──> Done
//!    │           │            │             │
//!    └───────────┴────────────┴─────────────┴──────────> Failed
//! ```
//!
//! - Fetching submits `fetch_promotions` to the provider's request queue and
//!   retries transient failures with bounded exponential backoff
//! - Persisting commits the fresh snapshot even when nothing changed
//! - Delivering hands non-empty change sets to the notifier; a delivery
//!   failure never undoes the commit
//!
//! ## Scheduling
//!
//! The [`Scheduler`] polls every active subscription once its check interval
//! has elapsed and never runs two cycles for the same pair at once.
//! User-forced checks run at high priority and jump ahead of queued
//! background work.

mod cycle;
mod error;
mod notifier;
mod registry;
mod retry;
mod scheduler;
mod state;

pub use cycle::{CycleConfig, CycleRequest, CycleResult, MonitorCycle, ProviderSettings};
pub use error::{CycleError, Result};
pub use notifier::LogNotifier;
pub use registry::{StaticCredentials, StaticSubscriptions};
pub use retry::RetryPolicy;
pub use scheduler::{DEFAULT_TICK_INTERVAL, ForceCheckOutcome, Scheduler};
pub use state::CycleState;

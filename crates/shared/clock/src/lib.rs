//! PriceGuard Clock Infrastructure
//!
//! Wall-clock time sources behind the [`Clock`] port:
//!
//! - [`SystemClock`]: real UTC time, used in production
//! - [`ManualClock`]: frozen time that only moves when told to, used by
//!   tests that need deterministic `fetched_at` / last-check timestamps
//!
//! Rate limiting and backoff do not go through this port; they run on the
//! tokio clock so they can be exercised with paused time.

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use priceguard_ports::Clock;

//! PriceGuard Dispatch
//!
//! Serializes outbound provider calls: one worker per provider pulls the
//! highest-priority pending task, waits for the provider's rate limiter and
//! runs the task. Callers only enqueue and await.
//!
//! ```text
//!  cycle (user A) ─┐                          ┌──────────────────────┐
//!  cycle (user B) ─┼─ submit ──> RequestQueue │ worker (per provider)│
//!  force check    ─┘              (priority,  │  acquire() ──> run   │──> provider
//!                                  FIFO seq)  └──────────────────────┘
//! ```
//!
//! At most one operation per provider is in flight at any time.

mod dispatcher;
mod error;
mod limiter;
mod queue;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result};
pub use limiter::{Grant, RateLimitConfig, RateLimiter};
pub use queue::{QueueStats, RequestQueue, TaskHandle, TaskId, TaskOptions};

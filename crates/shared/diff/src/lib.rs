//! PriceGuard Change Detection
//!
//! Compares two consecutive snapshots of one (user, provider) pair and
//! classifies every promotion as new, updated or ended.
//!
//! ```text
//!  previous snapshot ──┐
//!                      ├──> DiffEngine ──> ChangeSet (New.., Updated.., Ended..)
//!  current snapshot  ──┘        │
//!                           DiffConfig (compared fields per provider)
//! ```
//!
//! The engine is pure: it never touches the snapshots it is given and two
//! calls with the same inputs produce the same `ChangeSet`.

mod config;
mod engine;

pub use config::{AttributeSelection, ComparedFields, CoreField, DiffConfig};
pub use engine::DiffEngine;

//! PriceGuard Core Domain
//!
//! Pure domain types for the PriceGuard promotion monitor.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Change detection
    ChangeKind,
    ChangeRecord,
    ChangeSet,
    ChangeSummary,
    // Credentials
    Credential,
    // Request scheduling
    Priority,
    // Products inside a promotion
    ProductEntry,
    // Promotions and snapshots
    Promotion,
    PromotionBuilder,
    PromotionError,
    ProviderId,
    ProviderSnapshot,
    SnapshotError,
    UnknownProvider,
};
pub use values::{AttrValue, Attributes, PromotionId, Timestamp, UserId};

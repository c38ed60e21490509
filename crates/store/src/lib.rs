//! PriceGuard Snapshot Stores
//!
//! Implementations of the `SnapshotStore` port:
//!
//! - [`InMemorySnapshotStore`]: DashMap keyed by (user, provider); state is
//!   lost on restart, so every pair starts from a "first fetch"
//! - [`JsonDirSnapshotStore`]: one JSON document per pair under a directory,
//!   replaced atomically on every write

mod json_dir;
mod memory;

pub use json_dir::JsonDirSnapshotStore;
pub use memory::InMemorySnapshotStore;

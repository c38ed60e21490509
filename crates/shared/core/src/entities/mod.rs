mod change;
mod credential;
mod priority;
mod product;
mod promotion;
mod provider;
mod snapshot;

pub use change::{ChangeKind, ChangeRecord, ChangeSet, ChangeSummary};
pub use credential::Credential;
pub use priority::Priority;
pub use product::ProductEntry;
pub use promotion::{Promotion, PromotionBuilder, PromotionError};
pub use provider::{ProviderId, UnknownProvider};
pub use snapshot::{ProviderSnapshot, SnapshotError};

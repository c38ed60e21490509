//! PriceGuard Ports
//!
//! Port definitions (traits) for the PriceGuard promotion monitor.
//! These define the boundaries between the monitoring pipeline and its
//! external collaborators: marketplaces, persistence, credential storage,
//! user-facing notification and the subscription registry.

mod clock;
mod credentials;
mod error;
mod notifier;
mod provider;
mod store;
mod subscriptions;

pub use clock::Clock;
pub use credentials::CredentialResolver;
pub use error::{CredentialError, NotifyError, ProviderError, StoreError};
pub use notifier::{FailureSignal, Notifier};
pub use provider::ProviderClient;
pub use store::SnapshotStore;
pub use subscriptions::{Subscription, SubscriptionSource};

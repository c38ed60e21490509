use serde::{Deserialize, Serialize};

/// Scheduling priority of a provider request
///
/// Higher priorities are served first; equal priorities are served in
/// submission order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    /// Periodic background checks
    #[default]
    Normal,
    /// Checks forced by the user
    High,
}

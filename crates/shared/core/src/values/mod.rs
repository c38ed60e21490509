use chrono::{DateTime, Utc};

mod attr;
mod ids;

pub use attr::{AttrValue, Attributes};
pub use ids::{PromotionId, UserId};

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

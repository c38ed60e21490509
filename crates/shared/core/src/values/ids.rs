use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat user id of the seller owning a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Provider-scoped promotion identifier
///
/// Ozon regular actions and Wildberries promotions use integer ids, Ozon hot
/// sales are keyed by a synthetic string. Ordering places every integer id
/// before every string id; integers compare numerically, strings
/// lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromotionId {
    Int(i64),
    Str(String),
}

impl PromotionId {
    /// Integer view, if this id is numeric
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PromotionId::Int(id) => Some(*id),
            PromotionId::Str(_) => None,
        }
    }
}

impl fmt::Display for PromotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromotionId::Int(id) => write!(f, "{}", id),
            PromotionId::Str(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for PromotionId {
    fn from(id: i64) -> Self {
        PromotionId::Int(id)
    }
}

impl From<i32> for PromotionId {
    fn from(id: i32) -> Self {
        PromotionId::Int(i64::from(id))
    }
}

impl From<&str> for PromotionId {
    fn from(id: &str) -> Self {
        PromotionId::Str(id.to_string())
    }
}

impl From<String> for PromotionId {
    fn from(id: String) -> Self {
        PromotionId::Str(id)
    }
}

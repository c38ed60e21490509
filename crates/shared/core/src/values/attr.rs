use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Open attribute map for provider-specific promotion fields
///
/// Keys are the provider's own field names (`discount_value`, `order_amount`,
/// ...). Ordered so serialized snapshots and diffs are deterministic.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Value of a provider-specific attribute
///
/// Numbers are held as `Decimal` and compare by value, so `100`, `100.0` and
/// `100.00` are the same price no matter how the provider encoded them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    Number(Decimal),
    Text(String),
    Bool(bool),
}

impl AttrValue {
    pub fn number(value: impl Into<Decimal>) -> Self {
        AttrValue::Number(value.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        AttrValue::Text(value.into())
    }

    /// Parse a decimal literal, accepting scientific notation (`1.5e3`)
    pub fn parse_number(literal: &str) -> Option<Self> {
        Decimal::from_str(literal)
            .or_else(|_| Decimal::from_scientific(literal))
            .ok()
            .map(AttrValue::Number)
    }

    /// Convert a float, rejecting NaN and infinities
    pub fn from_f64(value: f64) -> Option<Self> {
        // Going through the shortest round-trip text keeps 0.1 as 0.1
        // instead of its binary expansion.
        if !value.is_finite() {
            return None;
        }
        Self::parse_number(&value.to_string())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, AttrValue::Number(_))
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Number(a), AttrValue::Number(b)) => a.cmp(b) == Ordering::Equal,
            (AttrValue::Text(a), AttrValue::Text(b)) => a == b,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AttrValue {}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => write!(f, "{}", n.normalize()),
            AttrValue::Text(s) => write!(f, "{}", s),
            AttrValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<Decimal> for AttrValue {
    fn from(value: Decimal) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(Decimal::from(value))
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(Decimal::from(value))
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(AttrValue::from(100), AttrValue::number(dec!(100.00)));
        assert_eq!(AttrValue::from_f64(90.0).unwrap(), AttrValue::from(90));
        assert_eq!(AttrValue::from_f64(0.1).unwrap(), AttrValue::number(dec!(0.1)));
        assert_ne!(AttrValue::from(90), AttrValue::from(100));
    }

    #[test]
    fn test_kinds_never_equal_across_types() {
        assert_ne!(AttrValue::from("100"), AttrValue::from(100));
        assert_ne!(AttrValue::from(true), AttrValue::from(1));
    }

    #[test]
    fn test_parse_number_accepts_scientific() {
        assert_eq!(
            AttrValue::parse_number("1.5e3").unwrap(),
            AttrValue::from(1500)
        );
        assert!(AttrValue::parse_number("abc").is_none());
        assert!(AttrValue::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn test_serde_keeps_text_distinct_from_numbers() {
        let text = AttrValue::text("100");
        let json = serde_json::to_string(&text).unwrap();
        let back: AttrValue = serde_json::from_str(&json).unwrap();

        assert_eq!(back, text);
        assert!(!back.is_numeric());
    }
}

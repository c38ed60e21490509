//! Wire message types for provider APIs
//!
//! Each provider module holds the `Deserialize` shapes of its responses and
//! the normalization into the common `Promotion` / `ProductEntry` types.

pub mod ozon;
pub mod wildberries;

use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use priceguard_core::{AttrValue, Attributes, Promotion, PromotionBuilder, Timestamp};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};

/// Parse RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC); empty means unset
pub fn parse_timestamp(raw: Option<&str>) -> Option<Timestamp> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Some(midnight.and_utc());
    }
    warn!("Unparseable timestamp '{}' dropped", raw);
    None
}

/// Convert a scalar JSON value; arrays, objects and null are skipped
pub fn attr_from_json(value: &Value) -> Option<AttrValue> {
    match value {
        Value::Number(n) => AttrValue::parse_number(&n.to_string()),
        Value::String(s) => Some(AttrValue::text(s.clone())),
        Value::Bool(b) => Some(AttrValue::Bool(*b)),
        _ => None,
    }
}

/// Exact decimal value of a JSON number
pub fn decimal_from_json(number: &Number) -> Option<Decimal> {
    AttrValue::parse_number(&number.to_string()).and_then(|attr| attr.as_decimal())
}

/// Every scalar field left over after the known ones were extracted
pub fn collect_attributes(extra: &Map<String, Value>) -> Attributes {
    extra
        .iter()
        .filter_map(|(key, value)| attr_from_json(value).map(|attr| (key.clone(), attr)))
        .collect()
}

/// Finish a normalized promotion, dropping an end time that precedes the start
pub(crate) fn build_promotion(
    builder: PromotionBuilder,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
) -> Option<Promotion> {
    let end = match (start, end) {
        (Some(s), Some(e)) if e < s => {
            warn!("End time {} precedes start {}; keeping promotion open-ended", e, s);
            None
        }
        _ => end,
    };
    builder
        .window(start, end)
        .build()
        .map_err(|e| warn!("Dropping promotion: {}", e))
        .ok()
}

use serde_json::Value;
use std::cmp::Ordering;

use crate::models::Record;

/// Nested attributes address a column on a related entity (`category.name`).
#[must_use]
pub fn is_nested(attribute: &str) -> bool {
    attribute.contains('.')
}

/// Column to order results by: the first attribute, unless it is nested.
#[must_use]
pub fn order_attribute(attributes: &[String]) -> Option<&str> {
    attributes
        .first()
        .map(String::as_str)
        .filter(|attribute| !is_nested(attribute))
}

/// Stable ascending sort of `records` by `attribute`; ties keep their order.
pub fn sort_records(records: &mut [Record], attribute: &str) {
    records.sort_by(|a, b| compare_values(a.get(attribute), b.get(attribute)));
}

// Same ascending order as the database: nulls first, then by value.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (a, b) => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_) | Value::Object(_)) => 4,
    }
}

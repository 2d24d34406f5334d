//! Order payload model
//!
//! Orders are kept as the caller's JSON object so that every supplied field is
//! persisted verbatim. Only presence of the required fields is checked; the
//! accessors here coerce values for rendering.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Fields that must be present and truthy for an order to be accepted
pub const REQUIRED_FIELDS: [&str; 3] = ["items", "email", "phone"];

/// Key of the server-assigned timestamp
pub const CREATED_FIELD: &str = "created";

/// Reasons an inbound payload is rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderValidationError {
    /// Body was valid JSON but not an object
    #[error("Order payload must be a JSON object")]
    NotAnObject,

    /// A required field is absent, null, false, zero or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// A customer order exactly as submitted (plus `created` when defaulted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(Map<String, Value>);

/// One rendered item line
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    /// Item name as supplied
    pub name: String,
    /// Quantity as supplied
    pub qty: String,
    /// Unit price as supplied
    pub price: String,
    /// `qty * price` after numeric coercion
    pub line_total: f64,
}

impl Order {
    /// Accept a raw payload if it carries the required fields
    ///
    /// # Arguments
    /// * `payload` - Parsed request body
    ///
    /// # Returns
    /// * `Ok(Order)` - Payload is an object with truthy `items`, `email`, `phone`
    /// * `Err(OrderValidationError)` - Otherwise
    pub fn from_payload(payload: Value) -> Result<Self, OrderValidationError> {
        let fields = match payload {
            Value::Object(fields) => fields,
            _ => return Err(OrderValidationError::NotAnObject),
        };

        for field in REQUIRED_FIELDS {
            if !fields.get(field).is_some_and(is_truthy) {
                return Err(OrderValidationError::MissingField(field));
            }
        }

        Ok(Self(fields))
    }

    /// Set `created` to `now` unless the caller supplied a truthy value
    ///
    /// Returns `true` when the timestamp was injected.
    pub fn ensure_created(&mut self, now: DateTime<Utc>) -> bool {
        if self.0.get(CREATED_FIELD).is_some_and(is_truthy) {
            return false;
        }
        self.0.insert(
            CREATED_FIELD.to_string(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        true
    }

    /// Raw field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Caller-supplied identifier, `None` only when the key is absent
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    /// Field rendered for a message template (missing and null render empty)
    pub fn text(&self, field: &str) -> String {
        self.0.get(field).map(display_value).unwrap_or_default()
    }

    /// Item lines, or `None` when `items` is not an array
    pub fn lines(&self) -> Option<Vec<OrderLine>> {
        let items = self.0.get("items")?.as_array()?;
        Some(
            items
                .iter()
                .map(|item| {
                    let field = |key: &str| item.get(key).unwrap_or(&Value::Null);
                    OrderLine {
                        name: display_value(field("name")),
                        qty: display_value(field("qty")),
                        price: display_value(field("price")),
                        line_total: coerce_number(field("qty")) * coerce_number(field("price")),
                    }
                })
                .collect(),
        )
    }

    /// Borrow the underlying JSON object
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Order> for Value {
    fn from(order: Order) -> Self {
        Value::Object(order.0)
    }
}

/// JavaScript-style truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a JSON value the way it appears in message text
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => display_number(n),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a JSON value to a number for arithmetic
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Shortest textual form of a number: `200`, `100.5`, `NaN`
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn display_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        format_number(n.as_f64().unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "id": "A1",
            "name": "Ali",
            "phone": "+92300",
            "email": "a@x.com",
            "items": [{"name": "Shirt", "qty": 2, "price": 100}],
            "subtotal": 200,
            "pickupCharge": 50,
            "total": 250
        })
    }

    #[test]
    fn test_accepts_valid_payload() {
        let order = Order::from_payload(valid_payload()).unwrap();
        assert_eq!(order.id(), Some(&json!("A1")));

        let mut payload = valid_payload();
        payload["id"] = Value::Null;
        let order = Order::from_payload(payload).unwrap();
        assert_eq!(order.id(), Some(&Value::Null));
        assert_eq!(order.text("name"), "Ali");
    }

    #[test]
    fn test_rejects_non_object() {
        assert_eq!(
            Order::from_payload(json!([1, 2, 3])),
            Err(OrderValidationError::NotAnObject)
        );
        assert_eq!(
            Order::from_payload(Value::Null),
            Err(OrderValidationError::NotAnObject)
        );
    }

    #[test]
    fn test_rejects_missing_or_falsy_required_fields() {
        for field in REQUIRED_FIELDS {
            let mut payload = valid_payload();
            payload.as_object_mut().unwrap().remove(field);
            assert_eq!(
                Order::from_payload(payload),
                Err(OrderValidationError::MissingField(field))
            );

            for falsy in [json!(null), json!(""), json!(0), json!(false)] {
                let mut payload = valid_payload();
                payload[field] = falsy;
                assert!(Order::from_payload(payload).is_err(), "{} should be rejected", field);
            }
        }
    }

    #[test]
    fn test_empty_items_array_is_accepted() {
        let mut payload = valid_payload();
        payload["items"] = json!([]);
        let order = Order::from_payload(payload).unwrap();
        assert_eq!(order.lines(), Some(vec![]));
    }

    #[test]
    fn test_ensure_created_injects_millisecond_utc_timestamp() {
        let mut order = Order::from_payload(valid_payload()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();
        assert!(order.ensure_created(now));
        assert_eq!(order.text("created"), "2024-05-01T10:20:30.000Z");
    }

    #[test]
    fn test_ensure_created_keeps_supplied_value() {
        let mut payload = valid_payload();
        payload["created"] = json!("2023-01-01T00:00:00.000Z");
        let mut order = Order::from_payload(payload).unwrap();
        assert!(!order.ensure_created(Utc::now()));
        assert_eq!(order.text("created"), "2023-01-01T00:00:00.000Z");

        let mut payload = valid_payload();
        payload["created"] = json!("");
        let mut order = Order::from_payload(payload).unwrap();
        assert!(order.ensure_created(Utc::now()));
    }

    #[test]
    fn test_lines_coerce_quantities_and_prices() {
        let mut payload = valid_payload();
        payload["items"] = json!([
            {"name": "Shirt", "qty": 2, "price": 100},
            {"name": "Duvet", "qty": "3", "price": 12.5},
            {"name": "Socks", "qty": "many", "price": 5}
        ]);
        let lines = Order::from_payload(payload).unwrap().lines().unwrap();

        assert_eq!(lines[0].line_total, 200.0);
        assert_eq!(lines[1].qty, "3");
        assert_eq!(lines[1].price, "12.5");
        assert_eq!(lines[1].line_total, 37.5);
        assert!(lines[2].line_total.is_nan());
    }

    #[test]
    fn test_lines_none_when_items_not_array() {
        let mut payload = valid_payload();
        payload["items"] = json!("three shirts");
        let order = Order::from_payload(payload).unwrap();
        assert!(order.lines().is_none());
    }

    #[test]
    fn test_display_and_format_numbers() {
        assert_eq!(display_value(&json!(100)), "100");
        assert_eq!(display_value(&json!(100.0)), "100");
        assert_eq!(display_value(&json!(100.5)), "100.5");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let order = Order::from_payload(valid_payload()).unwrap();
        let value: Value = serde_json::to_value(&order).unwrap();
        assert_eq!(value, valid_payload());

        let back: Order = serde_json::from_value(value).unwrap();
        assert_eq!(back, order);
    }
}

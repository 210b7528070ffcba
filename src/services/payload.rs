//! Field-contract parsing for JSON request payloads.
//!
//! Every entity service validates its payload through one of these parsers
//! before touching the store, collecting per-field messages so a shape
//! failure reports all offending fields at once.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ApiError;

const MISSING: &str = "Missing data for required field.";

pub struct PayloadParser<'a> {
    body: &'a Map<String, Value>,
    errors: HashMap<String, String>,
}

static EMPTY: once_cell::sync::Lazy<Map<String, Value>> =
    once_cell::sync::Lazy::new(Map::new);

impl<'a> PayloadParser<'a> {
    /// Accepts a JSON object or null (treated as empty); anything else is a
    /// 400 outright.
    pub fn new(payload: &'a Value) -> Result<Self, ApiError> {
        let body = match payload {
            Value::Object(map) => map,
            Value::Null => &EMPTY,
            _ => return Err(ApiError::bad_request("Request body must be a JSON object")),
        };
        Ok(Self { body, errors: HashMap::new() })
    }

    pub fn has(&self, field: &str) -> bool {
        !matches!(self.body.get(field), None | Some(Value::Null))
    }

    fn record(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }

    pub fn require_str(&mut self, field: &str) -> Option<String> {
        match self.body.get(field) {
            None | Some(Value::Null) => {
                self.record(field, MISSING);
                None
            }
            Some(value) => self.coerce_str(field, value),
        }
    }

    /// `None` when the field is absent (partial updates leave it unchanged).
    pub fn opt_str(&mut self, field: &str) -> Option<String> {
        match self.body.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.coerce_str(field, value),
        }
    }

    pub fn require_i64(&mut self, field: &str) -> Option<i64> {
        match self.body.get(field) {
            None | Some(Value::Null) => {
                self.record(field, MISSING);
                None
            }
            Some(value) => self.coerce_i64(field, value),
        }
    }

    pub fn opt_i64(&mut self, field: &str) -> Option<i64> {
        match self.body.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.coerce_i64(field, value),
        }
    }

    pub fn require_decimal(&mut self, field: &str) -> Option<Decimal> {
        match self.body.get(field) {
            None | Some(Value::Null) => {
                self.record(field, MISSING);
                None
            }
            Some(value) => self.coerce_decimal(field, value),
        }
    }

    pub fn opt_decimal(&mut self, field: &str) -> Option<Decimal> {
        match self.body.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.coerce_decimal(field, value),
        }
    }

    pub fn require_date(&mut self, field: &str) -> Option<NaiveDate> {
        match self.body.get(field) {
            None | Some(Value::Null) => {
                self.record(field, MISSING);
                None
            }
            Some(value) => self.coerce_date(field, value),
        }
    }

    pub fn opt_date(&mut self, field: &str) -> Option<NaiveDate> {
        match self.body.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.coerce_date(field, value),
        }
    }

    fn coerce_str(&mut self, field: &str, value: &Value) -> Option<String> {
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.record(field, "Not a valid string.");
                None
            }
        }
    }

    fn coerce_i64(&mut self, field: &str, value: &Value) -> Option<i64> {
        match value.as_i64() {
            Some(n) => Some(n),
            None => {
                self.record(field, "Not a valid integer.");
                None
            }
        }
    }

    // Accepts JSON numbers and their string form; both parse through
    // rust_decimal to keep fixed-point semantics.
    fn coerce_decimal(&mut self, field: &str, value: &Value) -> Option<Decimal> {
        let raw = match value {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            _ => {
                self.record(field, "Not a valid number.");
                return None;
            }
        };
        match Decimal::from_str(&raw) {
            Ok(d) => Some(d),
            Err(_) => {
                self.record(field, "Not a valid number.");
                None
            }
        }
    }

    fn coerce_date(&mut self, field: &str, value: &Value) -> Option<NaiveDate> {
        match value.as_str().and_then(|s| NaiveDate::from_str(s).ok()) {
            Some(d) => Some(d),
            None => {
                self.record(field, "Not a valid date.");
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid request payload", Some(self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_required_fields_reported_per_field() {
        let payload = json!({"email": "a@b.com"});
        let mut parser = PayloadParser::new(&payload).unwrap();
        assert!(parser.require_str("name").is_none());
        assert_eq!(parser.require_str("email").as_deref(), Some("a@b.com"));
        let err = parser.finish().unwrap_err();
        let body = err.to_json();
        assert_eq!(body["field_errors"]["name"], MISSING);
        assert!(body["field_errors"].get("email").is_none());
    }

    #[test]
    fn test_decimal_accepts_number_and_string() {
        let payload = json!({"a": 19.99, "b": "42.50", "c": "nope"});
        let mut parser = PayloadParser::new(&payload).unwrap();
        assert_eq!(parser.require_decimal("a").unwrap().to_string(), "19.99");
        assert_eq!(parser.require_decimal("b").unwrap().to_string(), "42.50");
        assert!(parser.require_decimal("c").is_none());
        assert!(parser.finish().is_err());
    }

    #[test]
    fn test_optional_absent_fields_do_not_error() {
        let payload = json!({});
        let mut parser = PayloadParser::new(&payload).unwrap();
        assert!(parser.opt_str("phone").is_none());
        assert!(parser.opt_i64("year").is_none());
        parser.finish().unwrap();
    }

    #[test]
    fn test_non_object_body_rejected() {
        let payload = json!([1, 2, 3]);
        assert!(PayloadParser::new(&payload).is_err());
    }

    #[test]
    fn test_date_parsing() {
        let payload = json!({"date": "2026-03-01", "bad": "03/01/2026"});
        let mut parser = PayloadParser::new(&payload).unwrap();
        assert!(parser.require_date("date").is_some());
        assert!(parser.require_date("bad").is_none());
    }
}

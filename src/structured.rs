//! Structured (key-value / JSON) secret bodies.
//!
//! Field values are kept as raw JSON so keys that are not rotated are written
//! back exactly as they were read. Keys are emitted in sorted order.

use serde_json::value::RawValue;
use std::collections::BTreeMap;

/// A secret body that is a JSON object
#[derive(Debug)]
pub struct StructuredSecret {
    fields: BTreeMap<String, Box<RawValue>>,
}

impl StructuredSecret {
    /// Parse a secret body; anything other than a JSON object is rejected
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let fields = serde_json::from_str(body)?;
        Ok(Self { fields })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw JSON text of a field's value
    pub fn raw_value(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|value| value.get())
    }

    /// Set a field to a JSON string value
    pub fn set_string(&mut self, key: &str, value: &str) -> Result<(), serde_json::Error> {
        let encoded = serde_json::to_string(value)?;
        self.fields
            .insert(key.to_string(), RawValue::from_string(encoded)?);
        Ok(())
    }

    pub fn to_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object() {
        let secret =
            StructuredSecret::parse(r#"{"username":"admin","password":"old","port":5432}"#)
                .unwrap();
        assert_eq!(secret.len(), 3);
        assert_eq!(
            secret.keys().collect::<Vec<_>>(),
            vec!["password", "port", "username"]
        );
        assert_eq!(secret.raw_value("port"), Some("5432"));
    }

    #[test]
    fn test_rejects_non_objects() {
        for body in ["not-json", "", "[1,2,3]", "\"plain\"", "42", "null"] {
            assert!(StructuredSecret::parse(body).is_err(), "{:?}", body);
        }
    }

    #[test]
    fn test_empty_object() {
        let secret = StructuredSecret::parse("{}").unwrap();
        assert!(secret.is_empty());
    }

    #[test]
    fn test_untouched_values_preserved_verbatim() {
        let body = r#"{"ratio": 1.50, "nested": {"b": 2, "a": [1, 2]}, "password": "old"}"#;
        let mut secret = StructuredSecret::parse(body).unwrap();
        secret.set_string("password", "n3w\"value").unwrap();

        let written = secret.to_body().unwrap();
        assert!(written.contains(r#""ratio":1.50"#), "{}", written);
        assert!(written.contains(r#""nested":{"b": 2, "a": [1, 2]}"#), "{}", written);

        let reparsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed["password"], "n3w\"value");
    }
}

//! Transaction record type
//!
//! A record is whatever a history source produced for one transaction. The
//! extraction pipeline never validates the internal shape — records are
//! serialized into the model instruction verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque, provider-agnostic transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxRecord(Value);

impl TxRecord {
    /// Wrap a raw JSON value as a record
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Get the underlying JSON value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Look up a top-level field, if the record is an object
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Value> for TxRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_is_transparent_json() {
        let record = TxRecord::new(json!({
            "hash": "0x3e1f",
            "method": "repayLoan",
            "value": "1000000000000000000"
        }));

        let serialized = serde_json::to_string(&record).unwrap();
        let roundtrip: TxRecord = serde_json::from_str(&serialized).unwrap();
        assert_eq!(roundtrip, record);
        assert_eq!(record.field("method"), Some(&json!("repayLoan")));
    }

    #[test]
    fn test_non_object_record_allowed() {
        // Some sources return bare transaction hashes
        let record = TxRecord::new(json!("0x9c4b"));
        assert_eq!(record.field("anything"), None);
    }
}

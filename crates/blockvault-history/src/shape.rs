//! Record shaping
//!
//! Raw transactions from RPC nodes and indexers carry far more than the
//! model needs, and full EVM calldata blows straight through provider
//! token limits. These shapers keep the fields the scoring prompt actually
//! reads and truncate calldata to the 4-byte function selector.

use blockvault_types::TxRecord;
use serde_json::{json, Value};

/// Number of characters kept from EVM calldata: `0x` plus the 8 hex chars
/// of the function selector
const SELECTOR_CHARS: usize = 10;

/// Shape a raw EVM transaction into a compact record
pub fn shape_evm_transaction(raw: &Value) -> TxRecord {
    let selector = raw
        .get("input")
        .and_then(|v| v.as_str())
        .map(|input| input.chars().take(SELECTOR_CHARS).collect::<String>())
        .unwrap_or_else(|| "0x".to_string());

    let mut shaped = json!({
        "hash": raw.get("hash").cloned().unwrap_or(Value::Null),
        "blockNumber": raw.get("blockNumber").cloned().unwrap_or(Value::Null),
        "from": raw.get("from").cloned().unwrap_or(Value::Null),
        "to": raw.get("to").cloned().unwrap_or(Value::Null),
        "value": raw.get("value").cloned().unwrap_or(Value::Null),
        "input_selector": selector,
    });

    // Optional decoded fields, when the source provides them
    for key in ["method", "timestamp"] {
        if let Some(value) = raw.get(key) {
            shaped[key] = value.clone();
        }
    }

    TxRecord::new(shaped)
}

/// Shape a raw Algorand indexer transaction into a compact record
pub fn shape_indexer_transaction(raw: &Value) -> TxRecord {
    let tx_type = raw.get("tx-type").and_then(|v| v.as_str()).unwrap_or("");

    let mut details = json!({});
    if tx_type == "appl" {
        if let Some(app) = raw.get("application-transaction") {
            details["appId"] = app.get("application-id").cloned().unwrap_or(Value::Null);
            details["appArgs"] = app
                .get("application-args")
                .cloned()
                .unwrap_or_else(|| json!("No Args"));
        }
    } else if tx_type == "pay" {
        if let Some(payment) = raw.get("payment-transaction") {
            details["amountMicroAlgos"] = payment.get("amount").cloned().unwrap_or(Value::Null);
        }
    }

    TxRecord::new(json!({
        "id": raw.get("id").cloned().unwrap_or(Value::Null),
        "round": raw.get("confirmed-round").cloned().unwrap_or(Value::Null),
        "sender": raw.get("sender").cloned().unwrap_or(Value::Null),
        "type": tx_type,
        "details": details,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evm_calldata_truncated_to_selector() {
        let raw = json!({
            "hash": "0x1111",
            "blockNumber": "0x12a0230",
            "from": "0xabc",
            "to": "0xAavePool",
            "value": "5000000000000000000",
            "input": "0x573ade81000000000000000000000000a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
        });

        let record = shape_evm_transaction(&raw);
        assert_eq!(
            record.field("input_selector").and_then(|v| v.as_str()),
            Some("0x573ade81")
        );
        assert!(record.field("input").is_none());
    }

    #[test]
    fn test_evm_missing_input_defaults() {
        let raw = json!({"hash": "0x2222", "to": "0xPool"});
        let record = shape_evm_transaction(&raw);
        assert_eq!(
            record.field("input_selector").and_then(|v| v.as_str()),
            Some("0x")
        );
    }

    #[test]
    fn test_evm_decoded_fields_preserved() {
        let raw = json!({
            "hash": "0x3333",
            "input": "0x",
            "method": "repayLoan",
            "timestamp": 1709214000
        });
        let record = shape_evm_transaction(&raw);
        assert_eq!(
            record.field("method").and_then(|v| v.as_str()),
            Some("repayLoan")
        );
    }

    #[test]
    fn test_app_call_keeps_application_details() {
        let raw = json!({
            "id": "TXID123",
            "confirmed-round": 40123456,
            "sender": "SENDERADDR",
            "tx-type": "appl",
            "application-transaction": {
                "application-id": 971368268,
                "application-args": ["cmVwYXk="]
            }
        });

        let record = shape_indexer_transaction(&raw);
        assert_eq!(record.field("type").and_then(|v| v.as_str()), Some("appl"));
        let details = record.field("details").unwrap();
        assert_eq!(details["appId"], json!(971368268));
        assert_eq!(details["appArgs"], json!(["cmVwYXk="]));
    }

    #[test]
    fn test_payment_keeps_amount() {
        let raw = json!({
            "id": "TXID456",
            "confirmed-round": 40123460,
            "sender": "SENDERADDR",
            "tx-type": "pay",
            "payment-transaction": {"amount": 250000}
        });

        let record = shape_indexer_transaction(&raw);
        assert_eq!(record.field("details").unwrap()["amountMicroAlgos"], json!(250000));
    }
}

//! BlockVault Guard - LLM Output Validator
//!
//! This crate turns raw model replies into validated extraction payloads.
//! Everything a model returns is treated as untrusted text until it has
//! survived, in order:
//!
//! 1. Code-fence stripping (models wrap JSON in ``` despite instructions)
//! 2. JSON parsing against the active schema variant
//! 3. Field validation: required identifiers present and non-empty,
//!    `0x`-prefixed in hex-based variants, scores within the 0-1000 scale
//!
//! # Key Principle
//!
//! A payload that parses but is schema-incomplete is rejected exactly like
//! a payload that does not parse at all. There is no partial acceptance —
//! the caller either gets a complete [`ExtractionResult`] or an error.

use blockvault_types::{
    ChainAgnosticAssessment, ExtractionResult, ProofTarget, SchemaVariant, ScoredAssessment,
    MAX_RELIABILITY_SCORE,
};
use thiserror::Error;

/// Errors that can occur during validation
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Empty payload after fence stripping")]
    EmptyPayload,

    #[error("Invalid JSON structure: {message}")]
    InvalidJson { message: String },

    #[error("Identifier field {field} is empty")]
    EmptyIdentifier { field: String },

    #[error("Identifier field {field} is not 0x-prefixed hex: {value}")]
    NotHexPrefixed { field: String, value: String },

    #[error("Reliability score {score} exceeds maximum {max}")]
    ScoreOutOfRange { score: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, GuardError>;

/// Strip surrounding Markdown code-fence markers from a model reply
///
/// Tolerates ```json and bare ``` fences, with or without trailing
/// newlines. Idempotent: already-clean payloads pass through unchanged.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string ("json", "JSON", ...) up to the first newline
        text = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// The BlockVault guard
///
/// Validates model replies against one schema variant, fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct Guard {
    variant: SchemaVariant,
}

impl Guard {
    /// Create a guard for a schema variant
    pub fn new(variant: SchemaVariant) -> Self {
        Self { variant }
    }

    /// The schema variant this guard validates against
    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    /// Parse and validate a raw model reply
    pub fn parse(&self, raw: &str) -> Result<ExtractionResult> {
        let cleaned = strip_code_fences(raw);
        if cleaned.is_empty() {
            return Err(GuardError::EmptyPayload);
        }

        match self.variant {
            SchemaVariant::ProofTarget => {
                let payload: ProofTarget = parse_json(cleaned)?;
                self.validate_proof_target(&payload)?;
                Ok(ExtractionResult::ProofTarget(payload))
            }
            SchemaVariant::Scored => {
                let payload: ScoredAssessment = parse_json(cleaned)?;
                self.validate_scored(&payload)?;
                Ok(ExtractionResult::Scored(payload))
            }
            SchemaVariant::ChainAgnostic => {
                let payload: ChainAgnosticAssessment = parse_json(cleaned)?;
                self.validate_chain_agnostic(&payload)?;
                Ok(ExtractionResult::ChainAgnostic(payload))
            }
        }
    }

    fn validate_proof_target(&self, payload: &ProofTarget) -> Result<()> {
        require_hex_identifier("blockNumber", &payload.block_number)?;
        require_hex_identifier("storageSlot", &payload.storage_slot)?;
        Ok(())
    }

    fn validate_scored(&self, payload: &ScoredAssessment) -> Result<()> {
        require_hex_identifier("proofTargetBlock", &payload.proof_target_block)?;
        require_hex_identifier("proofStorageSlot", &payload.proof_storage_slot)?;
        require_score_in_range(payload.reliability_score)?;
        Ok(())
    }

    fn validate_chain_agnostic(&self, payload: &ChainAgnosticAssessment) -> Result<()> {
        require_score_in_range(payload.reliability_score)?;
        // Transaction ids are chain-native (Algorand base32, EVM hex, ...);
        // only non-emptiness is required
        for tx in &payload.legitimate_transactions {
            require_identifier("transactionHash", &tx.transaction_hash)?;
        }
        if let Some(ref metadata) = payload.sbt_update_metadata {
            require_score_in_range(metadata.score_to_mint)?;
        }
        Ok(())
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(cleaned: &str) -> Result<T> {
    serde_json::from_str(cleaned).map_err(|e| GuardError::InvalidJson {
        message: e.to_string(),
    })
}

fn require_identifier(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GuardError::EmptyIdentifier {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_hex_identifier(field: &str, value: &str) -> Result<()> {
    require_identifier(field, value)?;
    if !value.starts_with("0x") {
        return Err(GuardError::NotHexPrefixed {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn require_score_in_range(score: u32) -> Result<()> {
    if score > MAX_RELIABILITY_SCORE {
        return Err(GuardError::ScoreOutOfRange {
            score,
            max: MAX_RELIABILITY_SCORE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_SCORED: &str = r#"{
        "reliabilityScore": 850,
        "riskLevel": "Low",
        "proofTargetBlock": "0x12a0234",
        "proofStorageSlot": "0x0000",
        "reasoningSummary": "User repaid a 500 USDC loan on Aave and has no liquidations."
    }"#;

    #[test]
    fn test_valid_scored_payload() {
        let guard = Guard::new(SchemaVariant::Scored);
        let result = guard.parse(VALID_SCORED).unwrap();

        match result {
            ExtractionResult::Scored(a) => {
                assert_eq!(a.reliability_score, 850);
                assert_eq!(a.proof_target_block, "0x12a0234");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_fenced_payload_accepted() {
        let guard = Guard::new(SchemaVariant::Scored);

        let fenced = format!("```json\n{}\n```", VALID_SCORED);
        let bare = guard.parse(VALID_SCORED).unwrap();
        let stripped = guard.parse(&fenced).unwrap();

        assert_eq!(bare, stripped);
    }

    #[test]
    fn test_fence_stripping_is_idempotent() {
        let fenced = "```json\n{\"a\": 1}\n```";
        let once = strip_code_fences(fenced);
        let twice = strip_code_fences(once);
        assert_eq!(once, "{\"a\": 1}");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fence_without_language_tag() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_missing_identifier_rejected() {
        let guard = Guard::new(SchemaVariant::Scored);

        let json = r#"{"reliabilityScore": 850, "proofTargetBlock": "0x1"}"#;
        assert!(matches!(
            guard.parse(json),
            Err(GuardError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_string_score_rejected_as_parse_failure() {
        let guard = Guard::new(SchemaVariant::Scored);

        let json = r#"{
            "reliabilityScore": "850",
            "proofTargetBlock": "0x1",
            "proofStorageSlot": "0x2"
        }"#;
        assert!(matches!(
            guard.parse(json),
            Err(GuardError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_unprefixed_hex_rejected() {
        let guard = Guard::new(SchemaVariant::ProofTarget);

        let json = r#"{"blockNumber": "12a0234", "storageSlot": "0x0"}"#;
        assert!(matches!(
            guard.parse(json),
            Err(GuardError::NotHexPrefixed { .. })
        ));
    }

    #[test]
    fn test_empty_identifier_rejected() {
        let guard = Guard::new(SchemaVariant::ProofTarget);

        let json = r#"{"blockNumber": "", "storageSlot": "0x0"}"#;
        assert!(matches!(
            guard.parse(json),
            Err(GuardError::EmptyIdentifier { .. })
        ));
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let guard = Guard::new(SchemaVariant::Scored);

        let json = r#"{
            "reliabilityScore": 1500,
            "proofTargetBlock": "0x1",
            "proofStorageSlot": "0x2"
        }"#;
        assert!(matches!(
            guard.parse(json),
            Err(GuardError::ScoreOutOfRange { score: 1500, .. })
        ));
    }

    #[test]
    fn test_empty_reply_rejected() {
        let guard = Guard::new(SchemaVariant::Scored);
        assert!(matches!(guard.parse(""), Err(GuardError::EmptyPayload)));
        assert!(matches!(
            guard.parse("```\n```"),
            Err(GuardError::EmptyPayload)
        ));
    }

    #[test]
    fn test_chain_agnostic_payload() {
        let guard = Guard::new(SchemaVariant::ChainAgnostic);

        let json = r#"{
            "reliabilityScore": 800,
            "totalRepays": 5,
            "liquidations": 0,
            "legitimateTransactions": [
                {
                    "transactionHash": "TXID123ABC",
                    "protocol": "Folks Finance",
                    "action": "Loan Repayment",
                    "impact": "+300"
                }
            ],
            "sbtUpdateMetadata": {
                "scoreToMint": 800,
                "repaysToAdd": 5,
                "liquidationsToAdd": 0,
                "summaryLogs": "User repaid 5 loans over 20 transactions."
            }
        }"#;

        let result = guard.parse(json).unwrap();
        match result {
            ExtractionResult::ChainAgnostic(a) => {
                assert_eq!(a.total_repays, 5);
                assert_eq!(a.legitimate_transactions.len(), 1);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_chain_agnostic_empty_tx_hash_rejected() {
        let guard = Guard::new(SchemaVariant::ChainAgnostic);

        let json = r#"{
            "reliabilityScore": 800,
            "totalRepays": 1,
            "liquidations": 0,
            "legitimateTransactions": [
                {"transactionHash": "", "protocol": "Aave", "action": "Repay", "impact": "+300"}
            ]
        }"#;

        assert!(matches!(
            guard.parse(json),
            Err(GuardError::EmptyIdentifier { .. })
        ));
    }

    #[test]
    fn test_prose_reply_rejected() {
        let guard = Guard::new(SchemaVariant::Scored);

        let reply = "Sure! Here is the analysis you asked for: the wallet looks reliable.";
        assert!(matches!(
            guard.parse(reply),
            Err(GuardError::InvalidJson { .. })
        ));
    }
}

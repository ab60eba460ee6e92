//! Validated assessment payloads
//!
//! These structs mirror the JSON shapes the model is instructed to return,
//! one per [`SchemaVariant`](crate::SchemaVariant). Deserialization enforces
//! field presence and numeric typing; the guard layers the remaining checks
//! (hex prefixes, non-empty identifiers, score bounds) on top.

use serde::{Deserialize, Serialize};

/// Upper bound of the reliability score scale
pub const MAX_RELIABILITY_SCORE: u32 = 1000;

/// Risk label attached to a scored assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "high", alias = "HIGH")]
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Bare proof locator: the single transaction selected as evidence of
/// positive financial behavior, addressed by block and storage slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofTarget {
    pub block_number: String,
    pub storage_slot: String,
}

/// Scored assessment with proof locator and optional enrichment fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAssessment {
    /// Reliability score on the 0-1000 scale
    pub reliability_score: u32,
    /// Block containing the proof transaction, hex with `0x` prefix
    pub proof_target_block: String,
    /// Storage slot for the proof, hex with `0x` prefix
    pub proof_storage_slot: String,
    /// Risk label, when the model supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// Free-text rationale, when the model supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_summary: Option<String>,
}

/// One protocol transaction the model kept after filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolTransaction {
    pub transaction_hash: String,
    pub protocol: String,
    pub action: String,
    pub impact: String,
}

/// Metadata for the downstream soul-bound-token update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SbtUpdateMetadata {
    pub score_to_mint: u32,
    pub repays_to_add: u64,
    pub liquidations_to_add: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_logs: Option<String>,
}

/// Chain-agnostic assessment: score plus repay/liquidation counters and
/// the filtered protocol transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAgnosticAssessment {
    /// Reliability score on the 0-1000 scale
    pub reliability_score: u32,
    pub total_repays: u64,
    pub liquidations: u64,
    pub legitimate_transactions: Vec<ProtocolTransaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sbt_update_metadata: Option<SbtUpdateMetadata>,
}

/// A fully validated extraction payload
///
/// Only constructible through the guard; there is no partially-valid state.
/// Serializes untagged so callers see exactly the payload the model
/// returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Scored(ScoredAssessment),
    ChainAgnostic(ChainAgnosticAssessment),
    ProofTarget(ProofTarget),
}

impl ExtractionResult {
    /// The reliability score, for variants that carry one
    pub fn reliability_score(&self) -> Option<u32> {
        match self {
            Self::ProofTarget(_) => None,
            Self::Scored(a) => Some(a.reliability_score),
            Self::ChainAgnostic(a) => Some(a.reliability_score),
        }
    }

    /// The primary proof identifier for downstream proof generation
    pub fn proof_identifier(&self) -> Option<&str> {
        match self {
            Self::ProofTarget(p) => Some(&p.block_number),
            Self::Scored(a) => Some(&a.proof_target_block),
            Self::ChainAgnostic(a) => a
                .legitimate_transactions
                .first()
                .map(|tx| tx.transaction_hash.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_assessment_roundtrip() {
        let json = r#"{
            "reliabilityScore": 850,
            "riskLevel": "Low",
            "proofTargetBlock": "0x12a0234",
            "proofStorageSlot": "0x0",
            "reasoningSummary": "User repaid a 500 USDC loan on Aave."
        }"#;

        let assessment: ScoredAssessment = serde_json::from_str(json).unwrap();
        assert_eq!(assessment.reliability_score, 850);
        assert_eq!(assessment.risk_level, Some(RiskLevel::Low));
    }

    #[test]
    fn test_string_score_rejected() {
        let json = r#"{
            "reliabilityScore": "850",
            "proofTargetBlock": "0x1",
            "proofStorageSlot": "0x2"
        }"#;

        let result: Result<ScoredAssessment, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_identifier_rejected() {
        let json = r#"{"reliabilityScore": 850, "proofTargetBlock": "0x1"}"#;

        let result: Result<ScoredAssessment, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_lowercase_risk_level_accepted() {
        let assessment: ScoredAssessment = serde_json::from_str(
            r#"{
                "reliabilityScore": 300,
                "riskLevel": "high",
                "proofTargetBlock": "0x1",
                "proofStorageSlot": "0x2"
            }"#,
        )
        .unwrap();
        assert_eq!(assessment.risk_level, Some(RiskLevel::High));
    }

    #[test]
    fn test_result_serializes_as_bare_payload() {
        let result = ExtractionResult::ProofTarget(ProofTarget {
            block_number: "0x12a0234".to_string(),
            storage_slot: "0x0".to_string(),
        });

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["blockNumber"], "0x12a0234");
        assert!(value.get("ProofTarget").is_none());
    }

    #[test]
    fn test_proof_identifier_per_variant() {
        let chain_agnostic = ExtractionResult::ChainAgnostic(ChainAgnosticAssessment {
            reliability_score: 800,
            total_repays: 5,
            liquidations: 0,
            legitimate_transactions: vec![ProtocolTransaction {
                transaction_hash: "TXID123".to_string(),
                protocol: "Folks Finance".to_string(),
                action: "Loan Repayment".to_string(),
                impact: "+300".to_string(),
            }],
            sbt_update_metadata: None,
        });

        assert_eq!(chain_agnostic.proof_identifier(), Some("TXID123"));
        assert_eq!(chain_agnostic.reliability_score(), Some(800));
    }
}

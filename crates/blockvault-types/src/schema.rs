//! Schema variants for structured extraction
//!
//! The oracle has been asked for three divergent payload shapes over its
//! lifetime. Exactly one variant is canonical per deployment, selected by
//! configuration — the pipeline, the prompt, and the validator all key off
//! the same tag.

use serde::{Deserialize, Serialize};

/// The payload shape an extraction is prompted for and validated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Bare proof locator: a block reference and a storage slot
    ProofTarget,
    /// Reliability score with risk label, proof locator, and summary
    Scored,
    /// Chain-agnostic score with repay/liquidation counters and the
    /// filtered protocol transactions
    ChainAgnostic,
}

impl SchemaVariant {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "proof_target" | "proof-target" | "prooftarget" => Some(Self::ProofTarget),
            "scored" | "score" => Some(Self::Scored),
            "chain_agnostic" | "chain-agnostic" | "chainagnostic" => Some(Self::ChainAgnostic),
            _ => None,
        }
    }

    /// Whether proof identifier fields in this variant are hex-encoded
    /// and must carry the `0x` prefix
    pub fn is_hex_based(&self) -> bool {
        matches!(self, Self::ProofTarget | Self::Scored)
    }
}

impl Default for SchemaVariant {
    fn default() -> Self {
        Self::Scored
    }
}

impl std::fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProofTarget => write!(f, "proof_target"),
            Self::Scored => write!(f, "scored"),
            Self::ChainAgnostic => write!(f, "chain_agnostic"),
        }
    }
}

//! Instruction templates for structured extraction
//!
//! One template per schema variant. Each fully specifies the reply shape
//! and forbids markdown wrapping; the guard still tolerates fenced replies
//! from models that ignore the instruction.

use blockvault_types::{SchemaVariant, TxRecord, WalletAddress};

const SCORED_TEMPLATE: &str = r#"You are a Web3 Risk Analyst for an under-collateralized lending protocol.
I will provide you with a raw array of transactions for a specific wallet address.

Your job is to analyze their ENTIRE history and calculate a "BlockVault Financial Reliability Score" (0 to 1000).

Scoring Rules:
1. Base Score: Start at 500.
2. Liquidations (-500): If the user was ever liquidated on Aave, Compound, Maker, etc., subtract 500. This is severe.
3. Repayments (+300): If the user successfully repaid a DeFi loan, add 300.
4. Consistent Yield (+100): If the user provided liquidity (LPing) or supplied assets for a long time, add 100.
5. Wallet Age/Activity (+50): If the wallet has sustained activity over months, add 50.

Once you calculate the score, find EXACTLY ONE transaction that best demonstrates their positive financial reliability.
This will be used to generate a ZK-SNARK Merkle Storage Proof.

Return ONLY a strict JSON payload. Do NOT include markdown blocks (```json). Do NOT include any explanations.

The JSON MUST have this exact structure:
{
  "reliabilityScore": 850,
  "riskLevel": "Low",
  "proofTargetBlock": "0x123abc...",
  "proofStorageSlot": "0x0000...",
  "reasoningSummary": "User repaid a 500 USDC loan on Aave and has no history of liquidations."
}

Address: {ADDRESS}
Transactions:
{TRANSACTIONS}
"#;

const PROOF_TARGET_TEMPLATE: &str = r#"Analyze these transactions for wallet {ADDRESS}.
Find exactly 1 transaction indicating positive financial health (e.g., successful loan repayment).

Return ONLY a JSON object with strictly:
{ "blockNumber": "0x...", "storageSlot": "0x..." }

Do NOT return markdown or explanation.

Transactions:
{TRANSACTIONS}
"#;

const CHAIN_AGNOSTIC_TEMPLATE: &str = r#"You are a Chain-Agnostic Web3 Risk Analyst for an under-collateralized lending protocol.
I am providing you with a raw array of transactions for a specific wallet address.

You must:
1. Filter out all irrelevant or "normal" transactions (like a simple token transfer to a random wallet).
2. Identify ONLY the legitimate "Protocol Transactions" (DeFi interactions, Loan Repayments, Liquidations, Staking).
3. Calculate their "BlockVault Financial Reliability Score" (0 to 1000). Base score is 500. Repays = +300. Liquidations = -500.

Return ONLY a strict JSON payload. Do NOT include markdown blocks (```json). Do NOT include any explanations.

The JSON MUST have this EXACT structure:
{
  "reliabilityScore": 850,
  "totalRepays": 5,
  "liquidations": 0,
  "legitimateTransactions": [
    {
      "transactionHash": "0x123abc...",
      "protocol": "Aave",
      "action": "Loan Repayment",
      "impact": "+300"
    }
  ],
  "sbtUpdateMetadata": {
    "scoreToMint": 850,
    "repaysToAdd": 5,
    "liquidationsToAdd": 0,
    "summaryLogs": "User repaid 5 loans and had 0 liquidations over 20 transactions."
  }
}

Address: {ADDRESS}
Transactions:
{TRANSACTIONS}
"#;

/// Render the instruction for a schema variant, wallet, and history
pub fn render_instruction(
    variant: SchemaVariant,
    address: &WalletAddress,
    transactions: &[TxRecord],
) -> String {
    let template = match variant {
        SchemaVariant::ProofTarget => PROOF_TARGET_TEMPLATE,
        SchemaVariant::Scored => SCORED_TEMPLATE,
        SchemaVariant::ChainAgnostic => CHAIN_AGNOSTIC_TEMPLATE,
    };

    let serialized = serde_json::to_string_pretty(transactions)
        .unwrap_or_else(|_| "[]".to_string());

    template
        .replace("{ADDRESS}", address.as_str())
        .replace("{TRANSACTIONS}", &serialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> (WalletAddress, Vec<TxRecord>) {
        let address = WalletAddress::new("0x123abc456def78901234567890abcdef12345678").unwrap();
        let records = vec![TxRecord::new(json!({
            "hash": "0x3e1f",
            "method": "repayLoan",
            "to": "0xAavePool"
        }))];
        (address, records)
    }

    #[test]
    fn test_placeholders_substituted() {
        let (address, records) = fixture();

        for variant in [
            SchemaVariant::ProofTarget,
            SchemaVariant::Scored,
            SchemaVariant::ChainAgnostic,
        ] {
            let rendered = render_instruction(variant, &address, &records);
            assert!(rendered.contains(address.as_str()), "{variant}: address missing");
            assert!(rendered.contains("repayLoan"), "{variant}: transactions missing");
            assert!(!rendered.contains("{ADDRESS}"), "{variant}: placeholder left");
            assert!(!rendered.contains("{TRANSACTIONS}"), "{variant}: placeholder left");
        }
    }

    #[test]
    fn test_scored_instruction_names_required_fields() {
        let (address, records) = fixture();
        let rendered = render_instruction(SchemaVariant::Scored, &address, &records);

        assert!(rendered.contains("reliabilityScore"));
        assert!(rendered.contains("proofTargetBlock"));
        assert!(rendered.contains("proofStorageSlot"));
    }

    #[test]
    fn test_empty_history_renders_empty_array() {
        let (address, _) = fixture();
        let rendered = render_instruction(SchemaVariant::ProofTarget, &address, &[]);
        assert!(rendered.contains("[]"));
    }
}

//! Terminal output for extraction reports

use blockvault_extraction::ExtractionReport;
use blockvault_types::ExtractionResult;
use colored::*;

/// Print a full report to the terminal
pub fn print_report(report: &ExtractionReport) {
    println!();
    println!("┌─ Extraction {} ─┐", report.trace_id.dimmed());
    println!("│ Wallet:   {}", report.wallet);
    println!("│ Provider: {}", report.provider);
    println!(
        "│ Attempts: {} ({} ms)",
        report.attempts, report.duration_ms
    );
    println!("├────────────────────────────────────────┤");

    match &report.result {
        ExtractionResult::ProofTarget(p) => {
            println!("│ Proof block: {}", p.block_number.cyan());
            println!("│ Storage slot: {}", p.storage_slot.cyan());
        }
        ExtractionResult::Scored(a) => {
            println!("│ Score: {}", score_colored(a.reliability_score));
            if let Some(risk) = a.risk_level {
                println!("│ Risk:  {}", risk);
            }
            println!("│ Proof block: {}", a.proof_target_block.cyan());
            println!("│ Storage slot: {}", a.proof_storage_slot.cyan());
            if let Some(ref summary) = a.reasoning_summary {
                for line in summary.lines() {
                    println!("│   {}", line.dimmed());
                }
            }
        }
        ExtractionResult::ChainAgnostic(a) => {
            println!("│ Score: {}", score_colored(a.reliability_score));
            println!(
                "│ Repays: {}  Liquidations: {}",
                a.total_repays, a.liquidations
            );
            for tx in &a.legitimate_transactions {
                println!(
                    "│   {} {} {} ({})",
                    tx.impact.green(),
                    tx.protocol,
                    tx.action,
                    tx.transaction_hash.dimmed()
                );
            }
        }
    }

    println!("└────────────────────────────────────────┘");

    // Raw payload for piping into downstream tools
    if let Ok(json) = serde_json::to_string_pretty(&report.result) {
        println!("{json}");
    }
}

fn score_colored(score: u32) -> ColoredString {
    let text = score.to_string();
    if score >= 700 {
        text.green().bold()
    } else if score >= 400 {
        text.yellow()
    } else {
        text.red().bold()
    }
}

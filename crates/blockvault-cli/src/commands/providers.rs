//! `blockvault providers` - credential/availability check

use blockvault_llm::ProviderPair;
use colored::*;

pub async fn run() -> anyhow::Result<()> {
    let pair = ProviderPair::from_env();
    let (primary_ok, fallback_ok) = pair.availability().await;

    println!("Configured providers:");
    print_status("primary", pair.primary().name(), primary_ok);
    print_status("fallback", pair.fallback().name(), fallback_ok);

    if !primary_ok && !fallback_ok {
        println!(
            "\n{}",
            "Neither provider is available. Set GEMINI_API_KEY / GROQ_API_KEY.".yellow()
        );
    }

    Ok(())
}

fn print_status(role: &str, name: &str, available: bool) {
    let marker = if available {
        "✓".green()
    } else {
        "✗".red()
    };
    println!("  {marker} {role}: {name}");
}

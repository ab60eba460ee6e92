//! BlockVault CLI - reliability extractions from the terminal
//!
//! # Quick Start
//!
//! ```bash
//! # Offline run against the fixture history
//! blockvault analyze --mock
//!
//! # Live run: discover an active wallet on the public indexer
//! GEMINI_API_KEY=... GROQ_API_KEY=... blockvault analyze
//!
//! # Specific wallet, specific schema
//! blockvault analyze --wallet ZW3I...W754 --schema chain_agnostic
//!
//! # Check provider credentials without spending tokens
//! blockvault providers
//! ```

use clap::{Parser, Subcommand};

mod commands;
mod display;

/// BlockVault CLI - AI reliability oracle for under-collateralized lending
#[derive(Parser)]
#[command(name = "blockvault")]
#[command(author = "BlockVault Contributors")]
#[command(version)]
#[command(about = "Extract validated financial-reliability assessments from wallet history", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an extraction for a wallet
    Analyze {
        /// Wallet address (discovered from the indexer when omitted)
        #[arg(short, long)]
        wallet: Option<String>,

        /// Use the built-in fixture history instead of a live indexer
        #[arg(long)]
        mock: bool,

        /// Maximum transactions to feed to the model
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Schema variant override (proof_target, scored, chain_agnostic)
        #[arg(long)]
        schema: Option<String>,
    },

    /// Check availability of the configured providers
    Providers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads provider configuration
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            wallet,
            mock,
            limit,
            schema,
        } => commands::analyze::run(wallet, mock, limit, schema).await,
        Commands::Providers => commands::providers::run().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_parsing() {
        let cli = Cli::parse_from(["blockvault", "analyze", "--mock", "--limit", "5"]);
        match cli.command {
            Commands::Analyze { mock, limit, wallet, .. } => {
                assert!(mock);
                assert_eq!(limit, 5);
                assert!(wallet.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_providers_parsing() {
        let cli = Cli::parse_from(["blockvault", "providers"]);
        assert!(matches!(cli.command, Commands::Providers));
    }
}

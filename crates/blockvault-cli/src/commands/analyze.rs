//! `blockvault analyze` - run one extraction end to end

use anyhow::{bail, Context};
use blockvault_extraction::{Extractor, ExtractorConfig};
use blockvault_history::{HistorySource, IndexerHistorySource, MockHistorySource};
use blockvault_llm::ProviderPair;
use blockvault_types::{SchemaVariant, WalletAddress};
use colored::*;

use crate::display;

/// Demo wallet used when running against the fixture history
const DEMO_WALLET: &str = "0x123abc456def78901234567890abcdef12345678";

pub async fn run(
    wallet: Option<String>,
    mock: bool,
    limit: usize,
    schema: Option<String>,
) -> anyhow::Result<()> {
    let mut config = ExtractorConfig::from_env();
    if let Some(ref name) = schema {
        config.schema = match SchemaVariant::from_str(name) {
            Some(variant) => variant,
            None => bail!("unknown schema variant: {name}"),
        };
    }

    let (address, records) = if mock {
        let source = MockHistorySource::new();
        let address = WalletAddress::new(wallet.as_deref().unwrap_or(DEMO_WALLET))?;
        let records = source.recent_transactions(&address, limit).await?;
        (address, records)
    } else {
        let source = IndexerHistorySource::from_env();
        let address = match wallet {
            Some(w) => WalletAddress::new(w)?,
            None => {
                println!("{}", "No wallet given, discovering an active address...".dimmed());
                source.latest_active_address().await?
            }
        };
        let records = source.recent_transactions(&address, limit).await?;
        (address, records)
    };

    println!(
        "Analyzing {} with {} transactions ({} schema)...",
        address.to_string().cyan(),
        records.len(),
        config.schema
    );

    let pipeline = Extractor::from_pair(ProviderPair::from_env(), config);
    let report = pipeline
        .extract(&address, &records)
        .await
        .context("extraction failed")?;

    display::print_report(&report);

    Ok(())
}

use std::{fs::File, io, sync::Arc};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wallet_ledger::config::Cli;
use wallet_ledger::dlq::TracingDLQ;
use wallet_ledger::ingestion::CsvReader;
use wallet_ledger::processor::Processor;
use wallet_ledger::service::WalletService;
use wallet_ledger::store::InMemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the report, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let file = File::open(&cli.file)?;

    let ingestion = CsvReader::new(file)?;
    let service = WalletService::new(Arc::new(InMemoryStore::new()), cli.ledger_config());
    let mut processor = Processor::new(ingestion, service, TracingDLQ::default());

    processor.process().await?;
    processor.write_report(io::stdout().lock()).await?;

    Ok(())
}

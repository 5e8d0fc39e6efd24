use std::path::PathBuf;

use clap::Parser;

/// Tunables for the coordination layer around the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// How many times a mutation is recomputed against a fresh snapshot after
    /// the store reports a version conflict.
    pub max_conflict_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
        }
    }
}

/// Apply a CSV batch of wallet commands and print the resulting balances.
#[derive(Debug, Parser)]
#[command(name = "wallet_ledger", version)]
pub struct Cli {
    /// CSV file with `type, wallet, customer, amount` rows
    pub file: PathBuf,

    /// Reload-and-retry budget on version conflicts
    #[arg(long, default_value_t = LedgerConfig::default().max_conflict_retries)]
    pub max_conflict_retries: u32,
}

impl Cli {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            max_conflict_retries: self.max_conflict_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_ledger_defaults() {
        let cli = Cli::try_parse_from(["wallet_ledger", "batch.csv"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("batch.csv"));
        assert_eq!(cli.ledger_config(), LedgerConfig::default());
    }

    #[test]
    fn retry_budget_is_configurable() {
        let cli =
            Cli::try_parse_from(["wallet_ledger", "b.csv", "--max-conflict-retries", "0"]).unwrap();
        assert_eq!(cli.ledger_config().max_conflict_retries, 0);
    }
}

use std::io::Read;
use std::pin::Pin;

use futures::stream::{self, Stream};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::traits::CommandStream;
use crate::domain::{Command, CommandKind, Error, RequestType, TransactionKind, WalletType};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Ok(Self { reader: Some(rdr) })
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    kind: String,
    wallet: String,
    #[serde(default)]
    customer: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    wallet_type: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<CsvRow> for Command {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let wallet = row.wallet.trim().to_string();
        if wallet.is_empty() {
            return Err(Error::Ingestion("Missing wallet label".to_string()));
        }

        let amount = non_empty(row.amount)
            .map(|raw| {
                raw.parse::<Decimal>()
                    .map_err(|_| Error::Ingestion(format!("Invalid amount: {}", raw)))
            })
            .transpose()?;

        let kind = match (row.kind.trim().to_ascii_lowercase().as_str(), amount) {
            ("create", balance) => {
                let customer_id = non_empty(row.customer).ok_or_else(|| {
                    Error::Ingestion(format!("Missing customer for wallet {}", wallet))
                })?;
                let wallet_type = non_empty(row.wallet_type)
                    .map(|t| t.parse::<WalletType>())
                    .transpose()?
                    .unwrap_or_default();
                CommandKind::Create {
                    customer_id,
                    wallet_type,
                    balance: balance.unwrap_or(Decimal::ZERO),
                }
            }
            (kind @ ("credit" | "debit"), Some(amount)) => CommandKind::Mutate {
                kind: kind.parse::<RequestType>()?.kind(),
                amount,
            },
            (kind @ ("hold" | "release"), Some(amount)) => CommandKind::Mutate {
                kind: kind.parse::<TransactionKind>()?,
                amount,
            },
            ("delete", None) => CommandKind::Delete,
            (kind @ ("credit" | "debit" | "hold" | "release"), None) => {
                return Err(Error::Ingestion(format!("Missing amount for {}", kind)));
            }
            (other, _) => {
                return Err(Error::Ingestion(format!("Invalid command type: {}", other)));
            }
        };

        Ok(Command { wallet, kind })
    }
}

impl<R: Read + Send + 'static> CommandStream for CsvReader<R> {
    type CmdStream = Pin<Box<dyn Stream<Item = Result<Command, Error>> + Send>>;

    fn stream(&mut self) -> Self::CmdStream {
        // Take ownership of the reader so the iterator we build owns all data and is 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                return Box::pin(stream::iter(Vec::<Result<Command, Error>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => Command::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}

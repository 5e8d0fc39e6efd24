use std::collections::HashMap;
use std::io::Write;

use futures::StreamExt;
use tracing::{debug, info};

use crate::api::CreateWalletRequest;
use crate::domain::{
    Command, CommandKind, CommandStream, DeadLetterQueue, Error, WalletId, WalletRepository,
    report_precision,
};
use crate::service::WalletService;

/// Batch driver: feeds a command stream through the wallet service, sending
/// every rejected command to the dead-letter queue, then reports balances.
pub struct Processor<I, R, D>
where
    I: CommandStream,
    R: WalletRepository + ?Sized,
    D: DeadLetterQueue,
{
    ingestion: I,
    service: WalletService<R>,
    dlq: D,
    labels: HashMap<String, WalletId>,
}

impl<I, R, D> Processor<I, R, D>
where
    I: CommandStream,
    R: WalletRepository + ?Sized,
    D: DeadLetterQueue,
{
    pub fn new(ingestion: I, service: WalletService<R>, dlq: D) -> Self {
        Self {
            ingestion,
            service,
            dlq,
            labels: HashMap::new(),
        }
    }

    pub fn dlq(&self) -> &D {
        &self.dlq
    }

    pub fn service(&self) -> &WalletService<R> {
        &self.service
    }

    pub fn wallet_id(&self, label: &str) -> Option<WalletId> {
        self.labels.get(label).copied()
    }

    pub async fn process(&mut self) -> Result<(), Error> {
        let mut commands = self.ingestion.stream();
        let mut applied = 0usize;
        let mut rejected = 0usize;

        while let Some(cmd) = commands.next().await {
            let outcome = match cmd {
                Ok(cmd) => self.apply(cmd).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => applied += 1,
                Err(e) => {
                    rejected += 1;
                    self.dlq.report(&e);
                }
            }
        }

        info!(applied, rejected, "batch processed");
        Ok(())
    }

    async fn apply(&mut self, cmd: Command) -> Result<(), Error> {
        debug!(command = %cmd, "applying command");
        match cmd.kind {
            CommandKind::Create {
                customer_id,
                wallet_type,
                balance,
            } => {
                if self.labels.contains_key(&cmd.wallet) {
                    return Err(Error::Ingestion(format!(
                        "Wallet label {} already in use",
                        cmd.wallet
                    )));
                }
                let id = self
                    .service
                    .create_wallet(CreateWalletRequest {
                        customer_id,
                        balance,
                        wallet_type: Some(wallet_type),
                    })
                    .await?;
                self.labels.insert(cmd.wallet, id);
            }
            CommandKind::Mutate { kind, amount } => {
                let id = self.resolve(&cmd.wallet)?;
                self.service.mutate(id, None, kind, amount).await?;
            }
            CommandKind::Delete => {
                let id = self.resolve(&cmd.wallet)?;
                self.service.delete_wallet(id).await?;
                self.labels.remove(&cmd.wallet);
            }
        }
        Ok(())
    }

    fn resolve(&self, label: &str) -> Result<WalletId, Error> {
        self.wallet_id(label)
            .ok_or_else(|| Error::NotFound(format!("Virtual wallet {}", label)))
    }

    /// Writes one line per live wallet, then per-customer available totals.
    pub async fn write_report<W: Write>(&self, mut out: W) -> Result<(), Error> {
        let names: HashMap<WalletId, &str> = self
            .labels
            .iter()
            .map(|(label, id)| (*id, label.as_str()))
            .collect();
        let wallets = self.service.list_wallets().await?;

        writeln!(out, "wallet,customer,type,available,held,total,transactions")?;
        let mut customers: Vec<&str> = Vec::new();
        for wallet in &wallets {
            let name = names
                .get(&wallet.id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| wallet.id.to_string());
            writeln!(
                out,
                "{},{},{},{},{},{},{}",
                name,
                wallet.customer_id,
                wallet.wallet_type,
                report_precision(wallet.available_balance),
                report_precision(wallet.held_balance),
                report_precision(wallet.total()?),
                wallet.transactions.len()
            )?;
            if !customers.contains(&wallet.customer_id.as_str()) {
                customers.push(&wallet.customer_id);
            }
        }

        writeln!(out, "customer,available")?;
        for customer in customers {
            let total = self.service.total_available_balance(customer).await?;
            writeln!(out, "{},{}", customer, report_precision(total))?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::dlq::MemoryDLQ;
    use crate::ingestion::CsvReader;
    use crate::store::InMemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn processor(
        input: &'static str,
    ) -> Processor<CsvReader<&'static [u8]>, InMemoryStore, MemoryDLQ> {
        let service = WalletService::new(Arc::new(InMemoryStore::new()), LedgerConfig::default());
        Processor::new(
            CsvReader::new(input.as_bytes()).unwrap(),
            service,
            MemoryDLQ::default(),
        )
    }

    #[tokio::test]
    async fn rejected_commands_are_dead_lettered_and_skipped() {
        let mut p = processor(
            "type, wallet, customer, amount\n\
             create, w1, alice, 10\n\
             debit, w1, , 20\n\
             release, w1, , 1\n\
             credit, nope, , 1\n\
             create, w1, bob, 1\n\
             credit, w1, , 5\n",
        );
        p.process().await.unwrap();

        let messages = p.dlq().messages();
        assert_eq!(messages.len(), 4);
        assert!(messages[0].starts_with("Insufficient funds"));
        assert!(messages[1].starts_with("Invalid amount to release"));
        assert!(messages[2].contains("not found"));
        assert!(messages[3].contains("already in use"));

        let id = p.wallet_id("w1").unwrap();
        let wallet = p.service().get_wallet(id, None).await.unwrap();
        assert_eq!(wallet.available_balance, dec!(15));
        assert_eq!(wallet.transactions.len(), 1);
    }

    #[tokio::test]
    async fn report_lists_wallets_and_customer_totals() {
        let mut p = processor(
            "type, wallet, customer, amount\n\
             create, main, alice, 100\n\
             hold, main, , 40\n\
             create, gone, carol, 1\n\
             delete, gone, ,\n",
        );
        p.process().await.unwrap();

        let mut out = Vec::new();
        p.write_report(&mut out).await.unwrap();
        let report = String::from_utf8(out).unwrap();

        assert!(report.contains("main,alice,cash,60.0000,40.0000,100.0000,1"));
        assert!(report.contains("alice,60.0000"));
        assert!(!report.contains("carol"));
    }
}

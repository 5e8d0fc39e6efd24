use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::aggregator;
use crate::api::{AmountRequest, CreateWalletRequest, TransactionRequest, UpdateWalletRequest};
use crate::config::LedgerConfig;
use crate::domain::wallet::validate_owner;
use crate::domain::{
    Amount, Error, Transaction, TransactionKind, Wallet, WalletId, WalletRepository,
};
use crate::engine::apply_mutation;
use crate::history::{TransactionFilter, filter_transactions};
use crate::locks::KeyedLocks;

/// Coordinates the engine with the wallet store.
///
/// Every write to a wallet runs inside that wallet's exclusive section and is
/// saved against the version it was computed from. Version conflicts are
/// retried against a fresh snapshot; engine rejections never are.
#[derive(Debug)]
pub struct WalletService<R>
where
    R: WalletRepository + ?Sized,
{
    repository: Arc<R>,
    locks: KeyedLocks,
    config: LedgerConfig,
}

impl<R> WalletService<R>
where
    R: WalletRepository + ?Sized,
{
    pub fn new(repository: Arc<R>, config: LedgerConfig) -> Self {
        Self {
            repository,
            locks: KeyedLocks::new(),
            config,
        }
    }

    pub async fn create_wallet(&self, request: CreateWalletRequest) -> Result<WalletId, Error> {
        let wallet = Wallet::new(
            request.customer_id,
            request.wallet_type.unwrap_or_default(),
            request.balance,
        )?;
        let id = self.repository.insert_wallet(wallet).await?;
        info!(wallet_id = %id, "virtual wallet created");
        Ok(id)
    }

    /// Loads a wallet; a non-empty `customer_id` must match its owner.
    pub async fn get_wallet(
        &self,
        id: WalletId,
        customer_id: Option<&str>,
    ) -> Result<Wallet, Error> {
        let wallet = self.repository.load_wallet(id).await?;
        match customer_id.filter(|c| !c.is_empty()) {
            Some(customer) if !wallet.belongs_to(customer) => {
                Err(Error::NotFound(format!("Virtual wallet {}", id)))
            }
            _ => Ok(wallet),
        }
    }

    pub async fn list_wallets(&self) -> Result<Vec<Wallet>, Error> {
        self.repository.load_all_wallets().await
    }

    /// Replaces owner and available balance. Holds and history are kept.
    pub async fn update_wallet(
        &self,
        id: WalletId,
        request: UpdateWalletRequest,
    ) -> Result<Wallet, Error> {
        validate_owner(&request.customer_id, request.balance)?;

        let (wallet, ()) = self
            .commit(id, None, |current| {
                let mut next = current.clone();
                next.customer_id = request.customer_id.clone();
                next.available_balance = request.balance;
                if let Some(wallet_type) = request.wallet_type {
                    next.wallet_type = wallet_type;
                }
                next.modified_at = Utc::now().max(current.modified_at);
                next.check_invariants()?;
                Ok((next, ()))
            })
            .await?;
        info!(wallet_id = %id, "virtual wallet updated");
        Ok(wallet)
    }

    pub async fn delete_wallet(&self, id: WalletId) -> Result<(), Error> {
        let _guard = self.locks.acquire(id).await;
        self.repository.delete_wallet(id).await?;
        info!(wallet_id = %id, "virtual wallet deleted");
        Ok(())
    }

    /// Applies a client `debit`/`credit` request.
    pub async fn apply_transaction(
        &self,
        id: WalletId,
        request: TransactionRequest,
    ) -> Result<Wallet, Error> {
        let kind = request.kind()?;
        Amount::new(request.amount)?;
        let (wallet, _) = self.mutate(id, None, kind, request.amount).await?;
        Ok(wallet)
    }

    pub async fn hold(&self, id: WalletId, request: AmountRequest) -> Result<Wallet, Error> {
        Amount::new(request.amount)?;
        let (wallet, _) = self
            .mutate(id, None, TransactionKind::Hold, request.amount)
            .await?;
        Ok(wallet)
    }

    pub async fn release_hold(
        &self,
        id: WalletId,
        customer_id: Option<&str>,
        request: AmountRequest,
    ) -> Result<Wallet, Error> {
        Amount::new(request.amount)?;
        let (wallet, _) = self
            .mutate(id, customer_id, TransactionKind::Release, request.amount)
            .await?;
        Ok(wallet)
    }

    /// Runs one engine mutation against the latest stored state of a wallet.
    pub async fn mutate(
        &self,
        id: WalletId,
        customer_id: Option<&str>,
        kind: TransactionKind,
        amount: Decimal,
    ) -> Result<(Wallet, Transaction), Error> {
        let result = self
            .commit(id, customer_id, |current| apply_mutation(current, kind, amount))
            .await;

        match &result {
            Ok((wallet, transaction)) => debug!(
                wallet_id = %id,
                %kind,
                %amount,
                available = %wallet.available_balance,
                held = %wallet.held_balance,
                transaction_id = %transaction.id,
                "mutation applied"
            ),
            Err(error) => warn!(wallet_id = %id, %kind, %amount, %error, "mutation rejected"),
        }
        result
    }

    pub async fn total_available_balance(&self, customer_id: &str) -> Result<Decimal, Error> {
        aggregator::total_available_balance(self.repository.as_ref(), customer_id).await
    }

    pub async fn transactions(
        &self,
        id: WalletId,
        customer_id: Option<&str>,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, Error> {
        let wallet = self.get_wallet(id, customer_id).await?;
        Ok(filter_transactions(&wallet, filter))
    }

    async fn commit<T, F>(
        &self,
        id: WalletId,
        customer_id: Option<&str>,
        compute: F,
    ) -> Result<(Wallet, T), Error>
    where
        F: Fn(&Wallet) -> Result<(Wallet, T), Error>,
    {
        let _guard = self.locks.acquire(id).await;
        let mut attempt = 0;

        loop {
            let snapshot = self.get_wallet(id, customer_id).await?;
            let (next, output) = compute(&snapshot)?;

            match self.repository.save_wallet(&next).await {
                Ok(saved) => return Ok((saved, output)),
                Err(Error::Conflict {
                    expected, found, ..
                }) if attempt < self.config.max_conflict_retries => {
                    attempt += 1;
                    warn!(wallet_id = %id, expected, found, attempt, "stale wallet snapshot, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

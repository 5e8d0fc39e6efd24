use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::api::{AmountRequest, CreateAccountRequest};
use crate::config::LedgerConfig;
use crate::domain::{Account, AccountId, AccountRepository, Amount, Error, TransactionKind};
use crate::engine::apply_account_mutation_at;
use crate::locks::KeyedLocks;

/// Account create/read plus funded holds.
///
/// Account holds go through the same transition table as wallet holds: the
/// held amount must be covered by `balance` and is moved out of it.
#[derive(Debug)]
pub struct AccountService<R>
where
    R: AccountRepository + ?Sized,
{
    repository: Arc<R>,
    locks: KeyedLocks,
    config: LedgerConfig,
}

impl<R> AccountService<R>
where
    R: AccountRepository + ?Sized,
{
    pub fn new(repository: Arc<R>, config: LedgerConfig) -> Self {
        Self {
            repository,
            locks: KeyedLocks::new(),
            config,
        }
    }

    pub async fn create_account(&self, request: CreateAccountRequest) -> Result<AccountId, Error> {
        let account = Account::new(request.email, request.account_type, request.balance)?;

        match self.repository.load_account_by_email(&account.email).await {
            Ok(_) => {
                return Err(Error::InvalidRequest(format!(
                    "Account already exists for {}",
                    account.email
                )));
            }
            Err(Error::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let id = self.repository.insert_account(account).await?;
        info!(account_id = %id, "account created");
        Ok(id)
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Account, Error> {
        self.repository.load_account(id).await
    }

    pub async fn get_account_by_email(&self, email: &str) -> Result<Account, Error> {
        self.repository.load_account_by_email(email.trim()).await
    }

    pub async fn hold(&self, id: AccountId, request: AmountRequest) -> Result<Account, Error> {
        self.mutate(id, TransactionKind::Hold, request.amount).await
    }

    pub async fn release(&self, id: AccountId, request: AmountRequest) -> Result<Account, Error> {
        self.mutate(id, TransactionKind::Release, request.amount).await
    }

    async fn mutate(
        &self,
        id: AccountId,
        kind: TransactionKind,
        amount: Decimal,
    ) -> Result<Account, Error> {
        Amount::new(amount)?;
        let _guard = self.locks.acquire(id).await;
        let mut attempt = 0;

        loop {
            let snapshot = self.repository.load_account(id).await?;
            let (next, _) = apply_account_mutation_at(&snapshot, kind, amount, Utc::now())
                .inspect_err(|error| {
                    warn!(account_id = %id, %kind, %amount, %error, "account mutation rejected")
                })?;

            match self.repository.save_account(&next).await {
                Ok(saved) => return Ok(saved),
                Err(Error::Conflict {
                    expected, found, ..
                }) if attempt < self.config.max_conflict_retries => {
                    attempt += 1;
                    warn!(account_id = %id, expected, found, attempt, "stale account snapshot, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

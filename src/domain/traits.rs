use async_trait::async_trait;
use futures::Stream;

use crate::domain::{Account, AccountId, Command, Error, Wallet, WalletId};

pub trait CommandStream {
    type CmdStream: Stream<Item = Result<Command, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::CmdStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// Document-store port for wallets.
///
/// Each call is atomic for the one document it touches; nothing spans
/// documents. `save_wallet` must reject a wallet whose `version` differs from
/// the stored one with [`Error::Conflict`], and on success returns the stored
/// document with its bumped version.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn load_wallet(&self, id: WalletId) -> Result<Wallet, Error>;

    async fn load_wallets_by_customer(&self, customer_id: &str) -> Result<Vec<Wallet>, Error>;

    async fn load_all_wallets(&self) -> Result<Vec<Wallet>, Error>;

    async fn insert_wallet(&self, wallet: Wallet) -> Result<WalletId, Error>;

    async fn save_wallet(&self, wallet: &Wallet) -> Result<Wallet, Error>;

    async fn delete_wallet(&self, id: WalletId) -> Result<(), Error>;
}

/// Document-store port for accounts. Same versioning contract as wallets.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn load_account(&self, id: AccountId) -> Result<Account, Error>;

    async fn load_account_by_email(&self, email: &str) -> Result<Account, Error>;

    async fn insert_account(&self, account: Account) -> Result<AccountId, Error>;

    async fn save_account(&self, account: &Account) -> Result<Account, Error>;
}

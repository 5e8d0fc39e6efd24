use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    Account, AccountId, AccountRepository, Error, Wallet, WalletId, WalletRepository,
};

/// In-process document store backing both repository ports.
///
/// Documents are replaced whole on save, guarded by their `version`.
#[derive(Default, Debug)]
pub struct InMemoryStore {
    wallets: RwLock<HashMap<WalletId, Wallet>>,
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            wallets: RwLock::new(HashMap::new()),
            accounts: RwLock::new(HashMap::new()),
        }
    }
}

fn by_creation(mut wallets: Vec<Wallet>) -> Vec<Wallet> {
    wallets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    wallets
}

#[async_trait]
impl WalletRepository for InMemoryStore {
    async fn load_wallet(&self, id: WalletId) -> Result<Wallet, Error> {
        self.wallets
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Virtual wallet {}", id)))
    }

    async fn load_wallets_by_customer(&self, customer_id: &str) -> Result<Vec<Wallet>, Error> {
        let wallets = self.wallets.read().await;
        Ok(by_creation(
            wallets
                .values()
                .filter(|w| w.belongs_to(customer_id))
                .cloned()
                .collect(),
        ))
    }

    async fn load_all_wallets(&self) -> Result<Vec<Wallet>, Error> {
        let wallets = self.wallets.read().await;
        Ok(by_creation(wallets.values().cloned().collect()))
    }

    async fn insert_wallet(&self, wallet: Wallet) -> Result<WalletId, Error> {
        match self.wallets.write().await.entry(wallet.id) {
            Entry::Vacant(e) => {
                let id = wallet.id;
                e.insert(Wallet { version: 0, ..wallet });
                Ok(id)
            }
            Entry::Occupied(_) => Err(Error::Persistence(format!(
                "Wallet ID {} already exists",
                wallet.id
            ))),
        }
    }

    async fn save_wallet(&self, wallet: &Wallet) -> Result<Wallet, Error> {
        let mut wallets = self.wallets.write().await;
        let stored = wallets
            .get_mut(&wallet.id)
            .ok_or_else(|| Error::NotFound(format!("Virtual wallet {}", wallet.id)))?;

        if stored.version != wallet.version {
            return Err(Error::Conflict {
                id: wallet.id,
                expected: wallet.version,
                found: stored.version,
            });
        }

        let mut next = wallet.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_wallet(&self, id: WalletId) -> Result<(), Error> {
        match self.wallets.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("Virtual wallet {}", id))),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn load_account(&self, id: AccountId) -> Result<Account, Error> {
        self.accounts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Account {}", id)))
    }

    async fn load_account_by_email(&self, email: &str) -> Result<Account, Error> {
        self.accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Account with email {}", email)))
    }

    async fn insert_account(&self, account: Account) -> Result<AccountId, Error> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(Error::InvalidRequest(format!(
                "Account already exists for {}",
                account.email
            )));
        }
        match accounts.entry(account.id) {
            Entry::Vacant(e) => {
                let id = account.id;
                e.insert(Account {
                    version: 0,
                    ..account
                });
                Ok(id)
            }
            Entry::Occupied(_) => Err(Error::Persistence(format!(
                "Account ID {} already exists",
                account.id
            ))),
        }
    }

    async fn save_account(&self, account: &Account) -> Result<Account, Error> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get_mut(&account.id)
            .ok_or_else(|| Error::NotFound(format!("Account {}", account.id)))?;

        if stored.version != account.version {
            return Err(Error::Conflict {
                id: account.id,
                expected: account.version,
                found: stored.version,
            });
        }

        let mut next = account.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountType, WalletType};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn stale_save_is_a_conflict() {
        let store = InMemoryStore::new();
        let wallet = Wallet::new("cust-1", WalletType::Cash, dec!(10)).unwrap();
        let id = store.insert_wallet(wallet).await.unwrap();

        let snapshot = store.load_wallet(id).await.unwrap();
        let mut first = snapshot.clone();
        first.available_balance = dec!(20);
        let saved = store.save_wallet(&first).await.unwrap();
        assert_eq!(saved.version, 1);

        let mut second = snapshot;
        second.available_balance = dec!(30);
        assert!(matches!(
            store.save_wallet(&second).await,
            Err(Error::Conflict { expected: 0, found: 1, .. })
        ));
        assert_eq!(
            store.load_wallet(id).await.unwrap().available_balance,
            dec!(20)
        );
    }

    #[tokio::test]
    async fn customer_query_only_returns_owned_wallets() {
        let store = InMemoryStore::new();
        for (customer, balance) in [("alice", dec!(1)), ("bob", dec!(2)), ("alice", dec!(3))] {
            let w = Wallet::new(customer, WalletType::Cash, balance).unwrap();
            store.insert_wallet(w).await.unwrap();
        }

        let alice = store.load_wallets_by_customer("alice").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|w| w.customer_id == "alice"));
        assert!(store.load_wallets_by_customer("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_missing_wallet_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.delete_wallet(WalletId::new_v4()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn account_emails_are_unique() {
        let store = InMemoryStore::new();
        let first = Account::new("a@b.c", AccountType::Retail, dec!(0)).unwrap();
        let id = store.insert_account(first).await.unwrap();
        assert_eq!(store.load_account_by_email("a@b.c").await.unwrap().id, id);

        let dup = Account::new("a@b.c", AccountType::Traders, dec!(5)).unwrap();
        assert!(matches!(
            store.insert_account(dup).await,
            Err(Error::InvalidRequest(_))
        ));
    }
}

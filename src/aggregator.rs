use rust_decimal::Decimal;

use crate::domain::{Error, WalletRepository};

/// Sum of spendable funds across every wallet a customer owns.
///
/// Held funds are excluded. A customer without wallets totals zero. A sum
/// that leaves the decimal range is an error, not a saturated value.
pub async fn total_available_balance<R>(repository: &R, customer_id: &str) -> Result<Decimal, Error>
where
    R: WalletRepository + ?Sized,
{
    let wallets = repository.load_wallets_by_customer(customer_id).await?;
    wallets.iter().try_fold(Decimal::ZERO, |total, wallet| {
        total.checked_add(wallet.available_balance).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "total available balance of customer {} overflows",
                customer_id
            ))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TransactionKind, Wallet, WalletType};
    use crate::engine::apply_mutation;
    use crate::store::InMemoryStore;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn sums_only_matching_available_balances() {
        let store = InMemoryStore::new();
        let held = {
            let w = Wallet::new("alice", WalletType::Cash, dec!(100)).unwrap();
            apply_mutation(&w, TransactionKind::Hold, dec!(30)).unwrap().0
        };
        store.insert_wallet(held).await.unwrap();
        store
            .insert_wallet(Wallet::new("alice", WalletType::Reward, dec!(5.5)).unwrap())
            .await
            .unwrap();
        store
            .insert_wallet(Wallet::new("bob", WalletType::Cash, dec!(1000)).unwrap())
            .await
            .unwrap();

        assert_eq!(
            total_available_balance(&store, "alice").await.unwrap(),
            dec!(75.5)
        );
    }

    #[tokio::test]
    async fn overflowing_total_is_an_error() {
        let store = InMemoryStore::new();
        for _ in 0..2 {
            store
                .insert_wallet(Wallet::new("big", WalletType::Cash, Decimal::MAX).unwrap())
                .await
                .unwrap();
        }

        assert!(matches!(
            total_available_balance(&store, "big").await,
            Err(Error::InvariantViolation(_))
        ));
    }

    #[tokio::test]
    async fn unknown_customer_totals_zero() {
        let store = InMemoryStore::new();
        assert_eq!(
            total_available_balance(&store, "nobody").await.unwrap(),
            Decimal::ZERO
        );
    }
}

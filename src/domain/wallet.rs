use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Transaction};

pub type WalletId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletType {
    #[default]
    Cash,
    Credit,
    Reward,
    Trade,
    Transit,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::Cash => "cash",
            WalletType::Credit => "credit",
            WalletType::Reward => "reward",
            WalletType::Trade => "trade",
            WalletType::Transit => "transit",
        }
    }
}

impl FromStr for WalletType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().trim_end_matches("wallet") {
            "cash" => Ok(WalletType::Cash),
            "credit" => Ok(WalletType::Credit),
            "reward" => Ok(WalletType::Reward),
            "trade" => Ok(WalletType::Trade),
            "transit" => Ok(WalletType::Transit),
            _ => Err(Error::InvalidRequest(format!("Unknown wallet type: {}", s))),
        }
    }
}

impl core::fmt::Display for WalletType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer sub-ledger. The unit of consistency for the ledger engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub customer_id: String,
    pub wallet_type: WalletType,
    pub available_balance: Decimal, // spendable funds
    pub held_balance: Decimal,      // earmarked by holds, not spendable
    pub transactions: Vec<Transaction>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Store-assigned revision, bumped on every successful save.
    pub version: u64,
}

impl Wallet {
    pub fn new(
        customer_id: impl Into<String>,
        wallet_type: WalletType,
        available_balance: Decimal,
    ) -> Result<Self, Error> {
        let customer_id = customer_id.into();
        validate_owner(&customer_id, available_balance)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            customer_id,
            wallet_type,
            available_balance,
            held_balance: Decimal::ZERO,
            transactions: Vec::new(),
            created_at: now,
            modified_at: now,
            version: 0,
        })
    }

    pub fn total(&self) -> Result<Decimal, Error> {
        self.available_balance
            .checked_add(self.held_balance)
            .ok_or_else(|| {
                Error::InvariantViolation(format!("wallet {} total overflows", self.id))
            })
    }

    pub fn belongs_to(&self, customer_id: &str) -> bool {
        self.customer_id == customer_id
    }

    pub fn check_invariants(&self) -> Result<(), Error> {
        if self.available_balance < Decimal::ZERO {
            return Err(Error::InvariantViolation(format!(
                "wallet {} has negative available balance {}",
                self.id, self.available_balance
            )));
        }
        if self.held_balance < Decimal::ZERO {
            return Err(Error::InvariantViolation(format!(
                "wallet {} has negative held balance {}",
                self.id, self.held_balance
            )));
        }
        self.total()?;
        Ok(())
    }
}

/// Validation shared by wallet create and replace.
pub fn validate_owner(customer_id: &str, available_balance: Decimal) -> Result<(), Error> {
    if customer_id.trim().is_empty() {
        return Err(Error::InvalidRequest("Customer ID is required".to_string()));
    }
    if available_balance < Decimal::ZERO {
        return Err(Error::InvalidRequest(
            "Balance cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_wallet_starts_without_holds_or_history() {
        let wallet = Wallet::new("cust-1", WalletType::Trade, dec!(25)).unwrap();
        assert_eq!(wallet.available_balance, dec!(25));
        assert_eq!(wallet.held_balance, Decimal::ZERO);
        assert!(wallet.transactions.is_empty());
        assert_eq!(wallet.created_at, wallet.modified_at);
        assert_eq!(wallet.version, 0);
    }

    #[test]
    fn creation_requires_owner_and_non_negative_balance() {
        assert!(matches!(
            Wallet::new("  ", WalletType::Cash, dec!(1)),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            Wallet::new("cust-1", WalletType::Cash, dec!(-0.01)),
            Err(Error::InvalidRequest(_))
        ));
        assert!(Wallet::new("cust-1", WalletType::Cash, Decimal::ZERO).is_ok());
    }

    #[test]
    fn wallet_type_accepts_legacy_suffix() {
        assert_eq!(
            "RewardWallet".parse::<WalletType>().unwrap(),
            WalletType::Reward
        );
        assert_eq!("transit".parse::<WalletType>().unwrap(), WalletType::Transit);
        assert!("gold".parse::<WalletType>().is_err());
    }

    #[test]
    fn negative_balances_are_invariant_violations() {
        let mut wallet = Wallet::new("cust-1", WalletType::Cash, dec!(1)).unwrap();
        wallet.held_balance = dec!(-1);
        assert!(matches!(
            wallet.check_invariants(),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn total_reports_overflow_instead_of_panicking() {
        let mut wallet = Wallet::new("cust-1", WalletType::Cash, Decimal::MAX).unwrap();
        assert_eq!(wallet.total().unwrap(), Decimal::MAX);

        wallet.held_balance = dec!(1);
        assert!(matches!(wallet.total(), Err(Error::InvariantViolation(_))));
        assert!(wallet.check_invariants().is_err());
    }
}

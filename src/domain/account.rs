use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Transaction, WalletId};

pub type AccountId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    #[default]
    Retail,
    Corporate,
    ChannelPartner,
    Traders,
    PrimeCorporate,
}

/// Owner record above the wallets. Identified externally by a unique email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub account_type: AccountType,
    pub balance: Decimal,      // funds not on hold
    pub hold_balance: Decimal, // funds moved aside by holds
    pub transactions: Vec<Transaction>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub virtual_wallets: Vec<WalletId>,
    pub version: u64,
}

impl Account {
    pub fn new(
        email: impl Into<String>,
        account_type: AccountType,
        balance: Decimal,
    ) -> Result<Self, Error> {
        let email = email.into().trim().to_string();
        if email.is_empty() {
            return Err(Error::InvalidRequest("Email is required".to_string()));
        }
        if balance < Decimal::ZERO {
            return Err(Error::InvalidRequest(
                "Balance cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email,
            account_type,
            balance,
            hold_balance: Decimal::ZERO,
            transactions: Vec::new(),
            created_at: now,
            modified_at: now,
            virtual_wallets: Vec::new(),
            version: 0,
        })
    }

    pub fn total(&self) -> Result<Decimal, Error> {
        self.balance.checked_add(self.hold_balance).ok_or_else(|| {
            Error::InvariantViolation(format!("account {} total overflows", self.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_account_trims_email_and_starts_unheld() {
        let account = Account::new(" ops@example.com ", AccountType::Corporate, dec!(10)).unwrap();
        assert_eq!(account.email, "ops@example.com");
        assert_eq!(account.hold_balance, Decimal::ZERO);
        assert_eq!(account.total().unwrap(), dec!(10));
        assert!(account.virtual_wallets.is_empty());
    }

    #[test]
    fn rejects_missing_email_and_negative_balance() {
        assert!(matches!(
            Account::new("", AccountType::Retail, dec!(1)),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            Account::new("a@b.c", AccountType::Retail, dec!(-1)),
            Err(Error::InvalidRequest(_))
        ));
    }
}

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Amount, Error};

pub type TransactionId = Uuid;

/// The four balance movements the engine knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Hold,
    Release,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Hold => "hold",
            TransactionKind::Release => "release",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdraw" => Ok(TransactionKind::Withdraw),
            "hold" => Ok(TransactionKind::Hold),
            "release" => Ok(TransactionKind::Release),
            other => Err(Error::InvalidTransactionKind(other.to_string())),
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction type as exposed to clients: `debit` or `credit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Debit,
    Credit,
}

impl RequestType {
    pub fn kind(self) -> TransactionKind {
        match self {
            RequestType::Debit => TransactionKind::Withdraw,
            RequestType::Credit => TransactionKind::Deposit,
        }
    }
}

impl FromStr for RequestType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debit" => Ok(RequestType::Debit),
            "credit" => Ok(RequestType::Credit),
            other => Err(Error::InvalidTransactionKind(format!(
                "{} (must be 'debit' or 'credit')",
                other
            ))),
        }
    }
}

/// Immutable history record appended on every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: Amount, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            created_at,
        }
    }
}

impl core::fmt::Display for Transaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{},id={},amount={},at={}",
            self.kind,
            self.id,
            self.amount,
            self.created_at.to_rfc3339()
        )
    }
}

use rust_decimal::Decimal;

use crate::domain::{TransactionKind, WalletType};

/// One row of a batch input, addressed to a wallet by its batch label.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub wallet: String,
    pub kind: CommandKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Create {
        customer_id: String,
        wallet_type: WalletType,
        balance: Decimal,
    },
    Mutate {
        kind: TransactionKind,
        amount: Decimal,
    },
    Delete,
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            CommandKind::Create {
                customer_id,
                balance,
                ..
            } => write!(
                f,
                "create,wallet={},customer={},balance={}",
                self.wallet, customer_id, balance
            ),
            CommandKind::Mutate { kind, amount } => {
                write!(f, "{},wallet={},amount={}", kind, self.wallet, amount)
            }
            CommandKind::Delete => write!(f, "delete,wallet={}", self.wallet),
        }
    }
}

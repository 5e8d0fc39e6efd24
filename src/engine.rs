//! The ledger engine: validates a requested balance movement against a
//! snapshot and computes the next state. No I/O happens here; callers load the
//! snapshot, call in, and persist whatever comes back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{Account, Amount, Error, Transaction, TransactionKind, Wallet};

/// The available/held pair every movement operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub available: Decimal,
    pub held: Decimal,
}

impl Balances {
    pub fn of_wallet(wallet: &Wallet) -> Self {
        Self {
            available: wallet.available_balance,
            held: wallet.held_balance,
        }
    }

    pub fn of_account(account: &Account) -> Self {
        Self {
            available: account.balance,
            held: account.hold_balance,
        }
    }
}

/// Transition table shared by wallets and accounts.
///
/// | kind     | precondition         | available | held |
/// |----------|----------------------|-----------|------|
/// | Deposit  | none                 | +amount   | =    |
/// | Withdraw | available >= amount  | -amount   | =    |
/// | Hold     | available >= amount  | -amount   | +amount |
/// | Release  | held >= amount       | +amount   | -amount |
pub fn transition(
    balances: Balances,
    kind: TransactionKind,
    amount: Amount,
) -> Result<Balances, Error> {
    let Balances { available, held } = balances;
    let value = amount.value();
    let overflow = || Error::InvalidAmount(value);

    match kind {
        TransactionKind::Deposit => {
            let available = available.checked_add(value).ok_or_else(overflow)?;
            // available + held must stay representable
            available.checked_add(held).ok_or_else(overflow)?;
            Ok(Balances { available, held })
        }
        TransactionKind::Withdraw => {
            ensure_available(available, value)?;
            Ok(Balances {
                available: available - value,
                held,
            })
        }
        TransactionKind::Hold => {
            ensure_available(available, value)?;
            Ok(Balances {
                available: available - value,
                held: held.checked_add(value).ok_or_else(overflow)?,
            })
        }
        TransactionKind::Release => {
            if held < value {
                return Err(Error::InvalidReleaseAmount {
                    held,
                    requested: value,
                });
            }
            Ok(Balances {
                available: available.checked_add(value).ok_or_else(overflow)?,
                held: held - value,
            })
        }
    }
}

fn ensure_available(available: Decimal, requested: Decimal) -> Result<(), Error> {
    if available < requested {
        return Err(Error::InsufficientFunds {
            available,
            requested,
        });
    }
    Ok(())
}

/// Applies `kind` to a wallet snapshot, stamped with the current time.
pub fn apply_mutation(
    wallet: &Wallet,
    kind: TransactionKind,
    amount: Decimal,
) -> Result<(Wallet, Transaction), Error> {
    apply_mutation_at(wallet, kind, amount, Utc::now())
}

/// Same as [`apply_mutation`] with an explicit clock reading.
///
/// The produced transaction is never dated before the snapshot's
/// `modified_at`, so history stays chronological even if the clock steps back.
pub fn apply_mutation_at(
    wallet: &Wallet,
    kind: TransactionKind,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<(Wallet, Transaction), Error> {
    let amount = Amount::new(amount)?;
    wallet.check_invariants()?;

    let balances = transition(Balances::of_wallet(wallet), kind, amount)?;
    let created_at = now.max(wallet.modified_at);
    let transaction = Transaction::new(kind, amount, created_at);

    let mut next = wallet.clone();
    next.available_balance = balances.available;
    next.held_balance = balances.held;
    next.transactions.push(transaction.clone());
    next.modified_at = created_at;
    next.check_invariants()?;

    Ok((next, transaction))
}

/// Account-level counterpart of [`apply_mutation_at`], sharing its table.
pub fn apply_account_mutation_at(
    account: &Account,
    kind: TransactionKind,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<(Account, Transaction), Error> {
    let amount = Amount::new(amount)?;
    if account.balance < Decimal::ZERO || account.hold_balance < Decimal::ZERO {
        return Err(Error::InvariantViolation(format!(
            "account {} has a negative balance",
            account.id
        )));
    }

    let balances = transition(Balances::of_account(account), kind, amount)?;
    let created_at = now.max(account.modified_at);
    let transaction = Transaction::new(kind, amount, created_at);

    let mut next = account.clone();
    next.balance = balances.available;
    next.hold_balance = balances.held;
    next.transactions.push(transaction.clone());
    next.modified_at = created_at;

    Ok((next, transaction))
}

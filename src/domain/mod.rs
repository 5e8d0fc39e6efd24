pub mod account;
pub mod command;
pub mod error;
pub mod money;
pub mod traits;
pub mod transaction;
pub mod wallet;

pub use account::{Account, AccountId, AccountType};
pub use command::{Command, CommandKind};
pub use error::Error;
pub use money::{Amount, report_precision};
pub use traits::{AccountRepository, CommandStream, DeadLetterQueue, WalletRepository};
pub use transaction::{RequestType, Transaction, TransactionId, TransactionKind};
pub use wallet::{Wallet, WalletId, WalletType};

pub mod account;
pub mod wallet;

pub use account::AccountService;
pub use wallet::WalletService;

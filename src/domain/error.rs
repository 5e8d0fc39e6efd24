use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error("Transaction amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Invalid transaction type: {0}")]
    InvalidTransactionKind(String),

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Invalid amount to release: held {held}, requested {requested}")]
    InvalidReleaseAmount { held: Decimal, requested: Decimal },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Version conflict on {id}: expected {expected}, found {found}")]
    Conflict {
        id: uuid::Uuid,
        expected: u64,
        found: u64,
    },

    #[error("Balance invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Persistence failed with: {0}")]
    Persistence(String),
}

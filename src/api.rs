//! Request contracts the transport layer hands to the services, and the
//! classification of service errors into transport status codes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountType, Error, RequestType, TransactionKind, WalletType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWalletRequest {
    pub customer_id: String,
    pub balance: Decimal,
    #[serde(default)]
    pub wallet_type: Option<WalletType>,
}

/// Body of a wallet update; replaces owner and available balance.
pub type UpdateWalletRequest = CreateWalletRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(rename = "type")]
    pub request_type: String,
    pub amount: Decimal,
}

impl TransactionRequest {
    pub fn kind(&self) -> Result<TransactionKind, Error> {
        Ok(self.request_type.parse::<RequestType>()?.kind())
    }
}

/// Body of hold and release calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    #[serde(rename = "type", default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub balance: Decimal,
}

pub fn status_code(error: &Error) -> u16 {
    match error {
        Error::InvalidAmount(_)
        | Error::InvalidTransactionKind(_)
        | Error::InsufficientFunds { .. }
        | Error::InvalidReleaseAmount { .. }
        | Error::InvalidRequest(_)
        | Error::Ingestion(_) => 400,
        Error::NotFound(_) => 404,
        Error::Conflict { .. } => 409,
        Error::InvariantViolation(_) | Error::Persistence(_) | Error::IO(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn transaction_request_decodes_numeric_amounts() {
        let req: TransactionRequest =
            serde_json::from_str(r#"{"type":"debit","amount":12.5}"#).unwrap();
        assert_eq!(req.amount, dec!(12.5));
        assert_eq!(req.kind().unwrap(), TransactionKind::Withdraw);

        let bad: TransactionRequest =
            serde_json::from_str(r#"{"type":"transfer","amount":1}"#).unwrap();
        assert!(matches!(bad.kind(), Err(Error::InvalidTransactionKind(_))));
    }

    #[test]
    fn wallet_type_is_optional_on_create() {
        let req: CreateWalletRequest =
            serde_json::from_str(r#"{"customer_id":"c-9","balance":0}"#).unwrap();
        assert_eq!(req.wallet_type, None);
        assert_eq!(req.balance, Decimal::ZERO);
    }

    #[test]
    fn errors_map_to_client_or_server_statuses() {
        assert_eq!(status_code(&Error::InvalidAmount(dec!(0))), 400);
        assert_eq!(
            status_code(&Error::InsufficientFunds {
                available: dec!(1),
                requested: dec!(2)
            }),
            400
        );
        assert_eq!(status_code(&Error::NotFound("Virtual wallet".into())), 404);
        assert_eq!(status_code(&Error::Persistence("down".into())), 500);
    }
}

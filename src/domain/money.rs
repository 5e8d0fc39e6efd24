use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::Error;

/// A strictly positive quantity of funds.
///
/// Every recorded transaction carries one of these, so a zero or negative
/// movement cannot be represented once it has passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const REPORT_DECIMALS: u32 = 4;

    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value <= Decimal::ZERO {
            return Err(Error::InvalidAmount(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Rounds with banker's rounding and pads to exactly the report precision.
pub fn report_precision(value: Decimal) -> Decimal {
    let mut value = value.round_dp(Amount::REPORT_DECIMALS);
    value.rescale(Amount::REPORT_DECIMALS);
    value
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Amount::new(value).map_err(serde::de::Error::custom)
    }
}

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::domain::{Error, Transaction, TransactionKind, Wallet};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Selection over a wallet's history.
///
/// The window is half-open: `start <= created_at < end`. A missing start means
/// the epoch, a missing end means the moment the filter is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    /// Builds a filter from raw query parameters. Empty strings count as absent.
    pub fn from_query(
        kind: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, Error> {
        let kind = present(kind).map(str::parse::<TransactionKind>).transpose()?;
        let start = present(start_date).map(parse_date).transpose()?;
        let end = present(end_date).map(parse_date).transpose()?;
        Ok(Self { kind, start, end })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parses `YYYY-MM-DD` as midnight UTC.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, Error> {
    let date = NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| Error::InvalidRequest(format!("Invalid date: {} (expected YYYY-MM-DD)", s)))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::InvalidRequest(format!("Invalid date: {}", s)))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

pub fn filter_transactions(wallet: &Wallet, filter: &TransactionFilter) -> Vec<Transaction> {
    filter_transactions_at(wallet, filter, Utc::now())
}

/// Stored order is preserved; nothing is re-sorted.
pub fn filter_transactions_at(
    wallet: &Wallet,
    filter: &TransactionFilter,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let start = filter.start.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let end = filter.end.unwrap_or(now);

    wallet
        .transactions
        .iter()
        .filter(|tx| filter.kind.is_none_or(|kind| tx.kind == kind))
        .filter(|tx| start <= tx.created_at && tx.created_at < end)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Amount, WalletType};
    use rust_decimal_macros::dec;

    fn at(date: &str) -> DateTime<Utc> {
        parse_date(date).unwrap()
    }

    fn wallet_with(history: &[(TransactionKind, &str)]) -> Wallet {
        let mut wallet = Wallet::new("cust-1", WalletType::Cash, dec!(0)).unwrap();
        for (kind, date) in history {
            let amount = Amount::new(dec!(1)).unwrap();
            wallet.transactions.push(Transaction::new(*kind, amount, at(date)));
        }
        wallet
    }

    #[test]
    fn window_is_inclusive_start_exclusive_end() {
        let wallet = wallet_with(&[
            (TransactionKind::Deposit, "2024-01-01"),
            (TransactionKind::Deposit, "2024-01-02"),
            (TransactionKind::Withdraw, "2024-01-03"),
        ]);
        let filter = TransactionFilter::from_query(None, Some("2024-01-01"), Some("2024-01-03"))
            .unwrap();

        let picked = filter_transactions(&wallet, &filter);
        let dates: Vec<_> = picked.iter().map(|t| t.created_at).collect();
        assert_eq!(dates, vec![at("2024-01-01"), at("2024-01-02")]);
    }

    #[test]
    fn kind_filter_is_exact_and_keeps_order() {
        let wallet = wallet_with(&[
            (TransactionKind::Hold, "2024-03-01"),
            (TransactionKind::Deposit, "2024-03-02"),
            (TransactionKind::Hold, "2024-03-03"),
        ]);
        let filter = TransactionFilter::from_query(Some("hold"), None, None).unwrap();

        let picked = filter_transactions(&wallet, &filter);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0], wallet.transactions[0]);
        assert_eq!(picked[1], wallet.transactions[2]);
    }

    #[test]
    fn open_end_stops_at_now() {
        let wallet = wallet_with(&[
            (TransactionKind::Deposit, "2024-05-01"),
            (TransactionKind::Deposit, "2099-01-01"),
        ]);
        let picked = filter_transactions_at(
            &wallet,
            &TransactionFilter::default(),
            at("2024-06-01"),
        );
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn malformed_query_values_are_rejected() {
        assert!(matches!(
            TransactionFilter::from_query(None, Some("01/02/2024"), None),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            TransactionFilter::from_query(Some("bonus"), None, None),
            Err(Error::InvalidTransactionKind(_))
        ));
        assert_eq!(
            TransactionFilter::from_query(Some(""), Some(" "), None).unwrap(),
            TransactionFilter::default()
        );
    }
}

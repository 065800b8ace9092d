//! Normalization of join keys.
//!
//! - `date`: `dd-Mon-yy` statement dates to canonical calendar dates
//! - `currency`: blank currency codes to absent, present codes trimmed
//!
//! Both normalizers are total: malformed input becomes `None`, never an error.

pub mod currency;
pub mod date;

pub use currency::cleanse_currency;
pub use date::{format_value_date, normalize_value_date, CENTURY_PIVOT};

use crate::models::{RawTransaction, Transaction};

/// Normalize the join keys of one transaction. Amounts and extra columns
/// pass through untouched.
pub fn normalize_transaction(raw: RawTransaction) -> Transaction {
    Transaction {
        value_date: normalize_value_date(&raw.value_date),
        withdrawal_currency: cleanse_currency(&raw.withdrawal_currency),
        deposit_currency: cleanse_currency(&raw.deposit_currency),
        withdrawal_amt: raw.withdrawal_amt,
        deposit_amt: raw.deposit_amt,
        extra: raw.extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_normalize_transaction() {
        let raw = RawTransaction {
            value_date: "05-Jan-23".to_string(),
            withdrawal_currency: " USD ".to_string(),
            deposit_currency: "".to_string(),
            withdrawal_amt: "100".to_string(),
            deposit_amt: "0".to_string(),
            extra: Default::default(),
        };

        let txn = normalize_transaction(raw);

        assert_eq!(txn.value_date, NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(txn.withdrawal_currency.as_deref(), Some("USD"));
        assert_eq!(txn.deposit_currency, None);
        assert_eq!(txn.withdrawal_amt, "100");
        assert_eq!(txn.deposit_amt, "0");
    }
}

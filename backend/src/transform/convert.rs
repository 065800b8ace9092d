//! SGD amount conversion.
//!
//! `*_sgd_amt = rate * amount` when the side found a rate, else `0`. Both
//! operands are `f64`; no rounding is applied. The conversion is total: a
//! missing rate or an unparseable amount yields `0`, never an error.

use crate::models::{EnrichedTransaction, JoinedTransaction};

/// Parse a statement amount (`"1,250.50"`, `" 100 "`).
///
/// Returns `None` for blank or non-numeric text.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converted amount for one side.
pub fn convert_amount(rate: Option<f64>, raw_amount: &str) -> f64 {
    match rate {
        Some(rate) => rate * parse_amount(raw_amount).unwrap_or(0.0),
        None => 0.0,
    }
}

/// Compute both SGD amounts for a joined row.
pub fn convert(joined: JoinedTransaction) -> EnrichedTransaction {
    let withdrawal_sgd_amt = convert_amount(joined.withdrawal_sgd, &joined.transaction.withdrawal_amt);
    let deposit_sgd_amt = convert_amount(joined.deposit_sgd, &joined.transaction.deposit_amt);

    EnrichedTransaction {
        transaction: joined.transaction,
        withdrawal_sgd: joined.withdrawal_sgd,
        deposit_sgd: joined.deposit_sgd,
        withdrawal_sgd_amt,
        deposit_sgd_amt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;

    fn joined(withdrawal_sgd: Option<f64>, withdrawal_amt: &str, deposit_sgd: Option<f64>, deposit_amt: &str) -> JoinedTransaction {
        JoinedTransaction {
            transaction: Transaction {
                value_date: None,
                withdrawal_currency: None,
                deposit_currency: None,
                withdrawal_amt: withdrawal_amt.to_string(),
                deposit_amt: deposit_amt.to_string(),
                extra: Default::default(),
            },
            withdrawal_sgd,
            deposit_sgd,
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100"), Some(100.0));
        assert_eq!(parse_amount(" 1,250.50 "), Some(1250.5));
        assert_eq!(parse_amount("-3.5"), Some(-3.5));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("  "), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_rate_times_amount() {
        let out = convert(joined(Some(1.35), "100", None, "0"));
        assert!((out.withdrawal_sgd_amt - 135.0).abs() < 1e-9);
        assert_eq!(out.deposit_sgd_amt, 0.0);
        assert!(out.withdrawal_rate_found());
        assert!(!out.deposit_rate_found());
    }

    #[test]
    fn test_both_sides_independent() {
        let out = convert(joined(Some(2.0), "10", Some(0.5), "8"));
        assert_eq!(out.withdrawal_sgd_amt, 20.0);
        assert_eq!(out.deposit_sgd_amt, 4.0);
    }

    #[test]
    fn test_no_rate_is_zero() {
        let out = convert(joined(None, "100", None, "250"));
        assert_eq!(out.withdrawal_sgd_amt, 0.0);
        assert_eq!(out.deposit_sgd_amt, 0.0);
        assert!(!out.withdrawal_rate_found());
    }

    #[test]
    fn test_zero_rate_distinguishable_from_missing() {
        let zero_rate = convert(joined(Some(0.0), "100", None, ""));
        let no_rate = convert(joined(None, "100", None, ""));
        assert_eq!(zero_rate.withdrawal_sgd_amt, no_rate.withdrawal_sgd_amt);
        assert!(zero_rate.withdrawal_rate_found());
        assert!(!no_rate.withdrawal_rate_found());
    }

    #[test]
    fn test_unparseable_amount_with_rate_is_zero() {
        let out = convert(joined(Some(1.35), "", Some(1.2), "n/a"));
        assert_eq!(out.withdrawal_sgd_amt, 0.0);
        assert_eq!(out.deposit_sgd_amt, 0.0);
        assert_eq!(out.withdrawal_sgd, Some(1.35));
    }
}

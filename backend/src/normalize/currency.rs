//! Currency key cleansing.

/// Trim a currency code; blank or whitespace-only means absent.
///
/// Applied to both transaction currencies and rate currencies, so
/// `" USD "` on one side matches `"USD"` on the other.
pub fn cleanse_currency(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_code() {
        assert_eq!(cleanse_currency(" USD "), Some("USD".to_string()));
        assert_eq!(cleanse_currency("EUR"), Some("EUR".to_string()));
        assert_eq!(cleanse_currency("\tINR\n"), Some("INR".to_string()));
    }

    #[test]
    fn test_blank_is_absent() {
        assert_eq!(cleanse_currency(""), None);
        assert_eq!(cleanse_currency("   "), None);
        assert_eq!(cleanse_currency("\t"), None);
    }

    #[test]
    fn test_idempotent() {
        for raw in [" USD ", "", "  ", "SGD", " e u r "] {
            let once = cleanse_currency(raw);
            let twice = once.as_deref().and_then(cleanse_currency);
            assert_eq!(once, twice);
        }
    }
}

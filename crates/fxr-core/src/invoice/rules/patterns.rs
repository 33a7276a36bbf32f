//! Recognition patterns for invoice rate and total lines.

use lazy_static::lazy_static;
use regex::Regex;

/// USD/EUR rate line, e.g. `1 USD = 0.9200 EUR`.
/// Rates are never digit-grouped, so a decimal comma (`0,92`) does not match.
pub const DEFAULT_RATE_PATTERN: &str = r"\b1\s*USD\s*=\s*(\d+(?:\.\d+)?)\s*EUR";

/// USD total line, e.g. `Total 1,250.00 USD` or `TOTAL: $100.00 USD`.
/// Word boundaries keep `Subtotal` lines out.
pub const DEFAULT_TOTAL_PATTERN: &str = r"(?i)\btotal\b\D*?(\d[\d,]*(?:\.\d+)?)\s*USD\b";

lazy_static! {
    pub static ref USD_EUR_RATE: Regex = Regex::new(DEFAULT_RATE_PATTERN).unwrap();

    pub static ref TOTAL_USD: Regex = Regex::new(DEFAULT_TOTAL_PATTERN).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
        re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str())
    }

    #[test]
    fn test_rate_pattern() {
        assert_eq!(capture(&USD_EUR_RATE, "1 USD = 0.9200 EUR"), Some("0.9200"));
        assert_eq!(capture(&USD_EUR_RATE, "Exchange rate: 1 USD=0.92 EUR (ECB)"), Some("0.92"));
        assert_eq!(capture(&USD_EUR_RATE, "11 USD = 10.12 EUR"), None);
        assert_eq!(capture(&USD_EUR_RATE, "1 EUR = 1.08 USD"), None);
        assert_eq!(capture(&USD_EUR_RATE, "1 USD = 0,92 EUR"), None);
        assert_eq!(capture(&USD_EUR_RATE, "1 USD = 1,000.5 EUR"), None);
    }

    #[test]
    fn test_total_pattern() {
        assert_eq!(capture(&TOTAL_USD, "Total 100.00 USD"), Some("100.00"));
        assert_eq!(capture(&TOTAL_USD, "TOTAL DUE: $1,234.50 USD"), Some("1,234.50"));
        assert_eq!(capture(&TOTAL_USD, "Subtotal 90.00 USD"), None);
        assert_eq!(capture(&TOTAL_USD, "Total 100.00 EUR"), None);
    }
}

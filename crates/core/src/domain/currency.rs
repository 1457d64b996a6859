pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

/// Currencies offered in the settings dialog, in display order.
pub const SUPPORTED_CURRENCIES: &[Currency] = &[
    Currency {
        code: "USD",
        name: "US Dollar",
        symbol: "$",
    },
    Currency {
        code: "PKR",
        name: "Pakistani Rupee",
        symbol: "Rs",
    },
    Currency {
        code: "EUR",
        name: "Euro",
        symbol: "€",
    },
    Currency {
        code: "GBP",
        name: "British Pound",
        symbol: "£",
    },
    Currency {
        code: "INR",
        name: "Indian Rupee",
        symbol: "₹",
    },
    Currency {
        code: "CAD",
        name: "Canadian Dollar",
        symbol: "C$",
    },
    Currency {
        code: "AUD",
        name: "Australian Dollar",
        symbol: "A$",
    },
    Currency {
        code: "JPY",
        name: "Japanese Yen",
        symbol: "¥",
    },
    Currency {
        code: "AED",
        name: "UAE Dirham",
        symbol: "dh",
    },
    Currency {
        code: "SAR",
        name: "Saudi Riyal",
        symbol: "SR",
    },
];

pub fn find_currency(code: &str) -> Option<&'static Currency> {
    let code = code.trim();
    SUPPORTED_CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Prefix used by en-US currency formatting. Codes without a dedicated
/// en-US symbol are written as the ISO code plus a non-breaking space.
fn en_us_prefix(code: &str) -> String {
    match code {
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        "INR" => "₹".to_string(),
        "CAD" => "CA$".to_string(),
        "AUD" => "A$".to_string(),
        other => format!("{}\u{a0}", other.trim().to_ascii_uppercase()),
    }
}

/// Formats an amount the way `Intl.NumberFormat('en-US', {style: 'currency',
/// maximumFractionDigits: 0})` does: rounded to whole units, grouped by
/// thousands.
pub fn format_price(amount: f64, currency: &str) -> String {
    let prefix = en_us_prefix(currency.trim());
    if !amount.is_finite() {
        return format!("{prefix}NaN");
    }

    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}{prefix}{}", group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_usd_without_fraction_digits() {
        assert_eq!(format_price(999.49, "USD"), "$999");
        assert_eq!(format_price(999.5, "USD"), "$1,000");
        assert_eq!(format_price(0.0, "USD"), "$0");
    }

    #[test]
    fn groups_large_amounts() {
        assert_eq!(format_price(1_234_567.0, "EUR"), "€1,234,567");
        assert_eq!(format_price(250_000.0, "JPY"), "¥250,000");
    }

    #[test]
    fn uses_en_us_prefixes_for_dollar_variants() {
        assert_eq!(format_price(20.0, "CAD"), "CA$20");
        assert_eq!(format_price(20.0, "AUD"), "A$20");
    }

    #[test]
    fn falls_back_to_code_for_other_currencies() {
        assert_eq!(format_price(1500.0, "PKR"), "PKR\u{a0}1,500");
        assert_eq!(format_price(12.0, "sar"), "SAR\u{a0}12");
    }

    #[test]
    fn find_currency_is_case_insensitive() {
        assert_eq!(find_currency("gbp").map(|c| c.symbol), Some("£"));
        assert!(find_currency("XYZ").is_none());
    }

    #[test]
    fn default_currency_is_supported() {
        assert!(find_currency(DEFAULT_CURRENCY).is_some());
    }
}

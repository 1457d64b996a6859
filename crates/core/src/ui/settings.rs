use crate::domain::currency::{find_currency, SUPPORTED_CURRENCIES};
use crate::ui::Action;
use std::fmt::Write;

/// Currency picker. Visibility is owned by the shell; picking an entry
/// yields a currency change and the shell closes the dialog.
#[derive(Debug, Clone, Copy)]
pub struct SettingsDialog<'a> {
    pub current: &'a str,
}

impl SettingsDialog<'_> {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Settings: Preferred Currency");
        for (i, c) in SUPPORTED_CURRENCIES.iter().enumerate() {
            let marker = if c.code.eq_ignore_ascii_case(self.current) {
                "✓"
            } else {
                " "
            };
            let _ = writeln!(
                out,
                " {marker} {:>2}. {:<3} {:<4} {}",
                i + 1,
                c.code,
                c.symbol,
                c.name
            );
        }
        let _ = writeln!(out, "Prices will be estimated in this currency for future searches.");
        let _ = writeln!(out, "Pick a number or code (empty line to close).");
        out
    }

    /// Accepts a 1-based list position or a currency code.
    pub fn select(&self, input: &str) -> Option<Action> {
        let input = input.trim();
        let currency = match input.parse::<usize>() {
            Ok(n) => SUPPORTED_CURRENCIES.get(n.checked_sub(1)?)?,
            Err(_) => find_currency(input)?,
        };
        Some(Action::ChangeCurrency(currency.code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_current_currency() {
        let text = SettingsDialog { current: "EUR" }.render();
        assert!(text.contains("✓  3. EUR"));
        assert!(text.contains("10. SAR"));
    }

    #[test]
    fn selects_by_index_or_code() {
        let dialog = SettingsDialog { current: "USD" };
        assert_eq!(
            dialog.select("2"),
            Some(Action::ChangeCurrency("PKR".to_string()))
        );
        assert_eq!(
            dialog.select(" jpy "),
            Some(Action::ChangeCurrency("JPY".to_string()))
        );
    }

    #[test]
    fn rejects_out_of_range_and_unknown() {
        let dialog = SettingsDialog { current: "USD" };
        assert_eq!(dialog.select("0"), None);
        assert_eq!(dialog.select("11"), None);
        assert_eq!(dialog.select("BTC"), None);
    }
}

use crate::domain::currency::format_price;
use crate::domain::product::Product;
use crate::storage::export::EXPORT_FILE_NAME;
use std::fmt::Write;

/// Estimated total of the saved list.
///
/// Amounts are summed as raw numbers even when the list mixes currencies,
/// and the result is labelled with the first item's currency. With an empty
/// list the active preference is used.
pub fn saved_total(saved: &[Product], fallback_currency: &str) -> (f64, String) {
    let total = saved.iter().map(|p| p.estimated_price).sum();
    let currency = saved
        .first()
        .map(|p| p.currency.clone())
        .unwrap_or_else(|| fallback_currency.to_string());
    (total, currency)
}

/// Side panel listing the saved products.
#[derive(Debug, Clone, Copy)]
pub struct SavedPanel<'a> {
    pub saved: &'a [Product],
    pub currency: &'a str,
}

impl SavedPanel<'_> {
    pub fn formatted_total(&self) -> String {
        let (total, currency) = saved_total(self.saved, self.currency);
        format_price(total, &currency)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Your List ({})", self.saved.len());
        if self.saved.is_empty() {
            let _ = writeln!(out, "Your list is empty.");
            let _ = writeln!(out, "Start adding products from your search results!");
            return out;
        }

        for p in self.saved {
            let _ = writeln!(
                out,
                "  - {}  {}  [{}]  (:rm {})",
                p.name,
                format_price(p.estimated_price, &p.currency),
                p.category,
                p.id
            );
        }
        let _ = writeln!(out, "Total Est. {}", self.formatted_total());
        let _ = writeln!(out, "Download with :export ({EXPORT_FILE_NAME})");
        out
    }
}

use crate::domain::currency::format_price;
use crate::domain::product::Product;
use crate::ui::category::CategoryTag;
use crate::ui::Action;
use std::fmt::Write;

/// A single result tile. `index` is the 1-based handle the user types to add it.
#[derive(Debug, Clone, Copy)]
pub struct ProductCard<'a> {
    pub index: usize,
    pub product: &'a Product,
    pub is_saved: bool,
}

impl ProductCard<'_> {
    pub fn formatted_price(&self) -> String {
        format_price(self.product.estimated_price, &self.product.currency)
    }

    pub fn render(&self) -> String {
        let p = self.product;
        let tag = CategoryTag::for_category(&p.category);

        let mut out = String::new();
        let _ = writeln!(out, "[{}] {}  {}", self.index, p.name, self.formatted_price());
        let _ = writeln!(out, "    {} {}", tag.icon(), p.category);
        if !p.description.is_empty() {
            let _ = writeln!(out, "    {}", p.description);
        }
        if !p.reason.is_empty() {
            let _ = writeln!(out, "    ℹ {}", p.reason);
        }
        if self.is_saved {
            let _ = writeln!(out, "    ✓ Saved to List");
        } else {
            let _ = writeln!(out, "    + Add to List  (:add {})", self.index);
        }
        out
    }

    /// The add button; disabled once the product is in the saved list.
    pub fn on_add(&self) -> Option<Action> {
        (!self.is_saved).then(|| Action::AddToSaved(self.product.id.clone()))
    }
}

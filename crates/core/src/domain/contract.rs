use crate::domain::product::{product_id, Product};
use anyhow::ensure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recommendation batches are requested with this many entries.
pub const MIN_BATCH: usize = 6;
pub const MAX_BATCH: usize = 8;

/// One entry exactly as the model emits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmProductItem {
    pub name: String,
    pub description: String,
    pub estimated_price: f64,
    pub category: String,
    pub reason: String,
}

/// Validates a decoded batch and stamps ids and the requested currency.
///
/// The model is never trusted to echo the currency, so any currency-looking
/// field it adds is ignored and `currency` is applied to every entry.
pub fn validate_and_into_products(
    items: Vec<LlmProductItem>,
    currency: &str,
    issued_at: DateTime<Utc>,
) -> anyhow::Result<Vec<Product>> {
    ensure!(!items.is_empty(), "LLM output must contain at least one product");

    if !(MIN_BATCH..=MAX_BATCH).contains(&items.len()) {
        tracing::warn!(
            count = items.len(),
            min = MIN_BATCH,
            max = MAX_BATCH,
            "LLM returned an unexpected number of products; keeping all"
        );
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| item.validate_and_into_product(index, currency, issued_at))
        .collect()
}

impl LlmProductItem {
    fn validate_and_into_product(
        self,
        index: usize,
        currency: &str,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<Product> {
        let name = self.name.trim().to_string();
        ensure!(!name.is_empty(), "product {index}: name must be non-empty");

        ensure!(
            self.estimated_price.is_finite() && self.estimated_price >= 0.0,
            "product {index}: estimatedPrice must be a non-negative number (got {})",
            self.estimated_price
        );

        Ok(Product {
            id: product_id(issued_at, index),
            name,
            description: self.description.trim().to_string(),
            estimated_price: self.estimated_price,
            currency: currency.to_string(),
            category: self.category.trim().to_string(),
            reason: self.reason.trim().to_string(),
        })
    }
}

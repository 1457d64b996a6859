use crate::domain::currency::DEFAULT_CURRENCY;
use crate::domain::product::Product;

pub mod error;
pub mod gemini;
pub mod json;

/// A validated search: trimmed non-empty query plus the currency prices
/// should be quoted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub query: String,
    pub currency: String,
}

impl RecommendationRequest {
    pub fn try_new(query: &str, currency: &str) -> anyhow::Result<Self> {
        let query = query.trim();
        anyhow::ensure!(!query.is_empty(), "query must be non-empty");

        let currency = match currency.trim() {
            "" => DEFAULT_CURRENCY.to_string(),
            c => c.to_ascii_uppercase(),
        };

        Ok(Self {
            query: query.to_string(),
            currency,
        })
    }
}

#[async_trait::async_trait]
pub trait RecommendationClient: Send + Sync {
    /// Model name reported in logs and diagnostics.
    fn model(&self) -> &str;

    async fn generate_recommendations(
        &self,
        request: RecommendationRequest,
    ) -> anyhow::Result<Vec<Product>>;
}

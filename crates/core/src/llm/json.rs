use crate::domain::contract::{validate_and_into_products, LlmProductItem};
use crate::domain::product::Product;
use anyhow::Context;
use chrono::{DateTime, Utc};

/// Pulls the JSON array out of model text. Schema-constrained responses are
/// usually bare, but fenced or prefixed output is tolerated.
pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

pub fn parse_products(
    text: &str,
    currency: &str,
    issued_at: DateTime<Utc>,
) -> anyhow::Result<Vec<Product>> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());
    anyhow::ensure!(!json_str.is_empty(), "LLM output is empty");

    let parsed = serde_json::from_str::<Vec<LlmProductItem>>(&json_str)
        .with_context(|| format!("LLM output is not valid JSON for product schema: {json_str}"))?;
    validate_and_into_products(parsed, currency, issued_at)
}

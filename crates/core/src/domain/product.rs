use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recommended item, as held in results and in the saved list.
///
/// Serialized with the same camelCase keys the export file uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub estimated_price: f64,
    pub currency: String,
    pub category: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadingStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// One completed search: what was asked, what came back, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingSession {
    pub query: String,
    pub products: Vec<Product>,
    pub timestamp: DateTime<Utc>,
}

pub fn product_id(issued_at: DateTime<Utc>, index: usize) -> String {
    format!("prod-{}-{index}", issued_at.timestamp_millis())
}

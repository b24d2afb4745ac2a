//! Browsing types for the storefront front page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use fitment_forge_core::{CategoryId, ProductId};

/// A product category. Top-level categories have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<CategoryId>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Name of a related row, as embedded in a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameRef {
    pub name: String,
}

/// A product as listed on the front page, with its brand and category
/// names joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock: i32,
    /// Image URLs. A stored value that is not a list of strings reads as
    /// empty.
    pub images: Vec<String>,
    pub rating: Decimal,
    pub rating_count: i32,
    pub is_featured: bool,
    pub is_active: bool,
    pub brand: Option<NameRef>,
    pub category: Option<NameRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read an `images` JSON value as a list of URLs.
#[must_use]
pub fn image_urls(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

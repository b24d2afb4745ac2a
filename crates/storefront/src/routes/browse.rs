//! Front page browsing handlers.
//!
//! Both lists degrade to empty when the catalog cannot be read; the front
//! page still renders without them.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::models::{Category, Product};
use crate::state::AppState;

/// Featured products shown on the front page.
const FEATURED_PRODUCT_LIMIT: u32 = 8;

/// Top-level categories shown on the front page.
const TOP_CATEGORY_LIMIT: u32 = 6;

#[derive(Debug, Serialize)]
pub struct ProductsBody {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesBody {
    pub categories: Vec<Category>,
}

/// List featured, active products with their brand and category names.
#[instrument(skip(state))]
pub async fn featured_products(State(state): State<AppState>) -> Json<ProductsBody> {
    let products = state
        .stores()
        .catalog
        .featured_products(FEATURED_PRODUCT_LIMIT)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load featured products");
            Vec::new()
        });

    Json(ProductsBody { products })
}

/// List top-level categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Json<CategoriesBody> {
    let categories = state
        .stores()
        .catalog
        .top_level_categories(TOP_CATEGORY_LIMIT)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load categories");
            Vec::new()
        });

    Json(CategoriesBody { categories })
}

//! Product catalog repository.
//!
//! Read-only from the storefront's side: the front page lists featured
//! products and the top-level categories. Rows are maintained by staff
//! tooling outside this crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use fitment_forge_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::catalog::image_urls;
use crate::models::{Category, NameRef, Product};

/// Catalog rows in `products`, `brands` and `categories`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Active products flagged as featured, at most `limit` of them.
    async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, RepositoryError>;

    /// Categories without a parent, at most `limit` of them.
    async fn top_level_categories(&self, limit: u32) -> Result<Vec<Category>, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    title: String,
    slug: String,
    sku: String,
    description: Option<String>,
    price: Decimal,
    sale_price: Option<Decimal>,
    stock: i32,
    images: Option<serde_json::Value>,
    rating: Option<Decimal>,
    rating_count: Option<i32>,
    is_featured: Option<bool>,
    is_active: Option<bool>,
    brand_name: Option<String>,
    category_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id.to_string()),
            title: row.title,
            slug: row.slug,
            sku: row.sku,
            description: row.description,
            price: row.price,
            sale_price: row.sale_price,
            stock: row.stock,
            images: image_urls(row.images.as_ref()),
            rating: row.rating.unwrap_or_default(),
            rating_count: row.rating_count.unwrap_or_default(),
            is_featured: row.is_featured.unwrap_or_default(),
            is_active: row.is_active.unwrap_or_default(),
            brand: row.brand_name.map(|name| NameRef { name }),
            category: row.category_name.map(|name| NameRef { name }),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    parent_id: Option<Uuid>,
    description: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            parent_id: row.parent_id.map(CategoryId::new),
            description: row.description,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL`-backed catalog store.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a new catalog store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.title, p.slug, p.sku, p.description, p.price, p.sale_price,
                   p.stock, p.images, p.rating, p.rating_count, p.is_featured, p.is_active,
                   b.name AS brand_name, c.name AS category_name,
                   p.created_at, p.updated_at
            FROM storefront.products p
            LEFT JOIN storefront.brands b ON b.id = p.brand_id
            LEFT JOIN storefront.categories c ON c.id = p.category_id
            WHERE p.is_featured AND p.is_active
            ORDER BY p.created_at DESC
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn top_level_categories(&self, limit: u32) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, slug, parent_id, description, image_url, created_at, updated_at
            FROM storefront.categories
            WHERE parent_id IS NULL
            ORDER BY name
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }
}

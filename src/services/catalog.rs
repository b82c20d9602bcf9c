use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::clients::{MediaKind, MediaStorageClient};
use crate::entities::{product, Category, Product, ProductImage, ProductModel};
use crate::errors::ServiceError;

/// Default page size for the public catalog listing
pub const PUBLIC_PAGE_SIZE: u64 = 12;
/// Default page size for administrative listings
pub const ADMIN_PAGE_SIZE: u64 = 10;

/// Sentinel upper bound applied when no maximum price is given
pub fn max_price_sentinel() -> Decimal {
    Decimal::from(999_999)
}

/// `total pages = ceil(total / limit)`
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if total == 0 || limit == 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

/// Fully resolved catalog query: every field carries its default already.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
    /// Raw category value; an unknown category matches nothing
    pub category: Option<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Tri-state: `None` means no featured filter
    pub featured: Option<bool>,
    pub is_active: bool,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: PUBLIC_PAGE_SIZE,
            search: None,
            category: None,
            min_price: Decimal::ZERO,
            max_price: max_price_sentinel(),
            featured: None,
            is_active: true,
        }
    }
}

/// One page of catalog results plus pagination metadata.
#[derive(Debug)]
pub struct CatalogPage {
    pub products: Vec<ProductModel>,
    pub current: u64,
    pub pages: u64,
    pub total: u64,
}

impl CatalogPage {
    fn empty(query: &CatalogQuery) -> Self {
        Self {
            products: Vec::new(),
            current: query.page,
            pages: 0,
            total: 0,
        }
    }
}

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub stock: i32,
    pub tags: Vec<String>,
    pub featured: bool,
    pub images: Vec<ProductImage>,
    pub created_by: Uuid,
}

/// Input for updating a product: a full replace of the mutable fields,
/// with an optional replacement image set.
#[derive(Debug, Clone)]
pub struct UpdateProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub stock: i32,
    pub tags: Vec<String>,
    pub featured: bool,
    pub is_active: bool,
    pub images: Option<Vec<ProductImage>>,
    pub updated_by: Uuid,
}

/// Catalog service: the filtered/paginated view over the product
/// collection plus admin mutations.
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DatabaseConnection>,
    media: Arc<MediaStorageClient>,
}

impl ProductCatalogService {
    pub fn new(db: Arc<DatabaseConnection>, media: Arc<MediaStorageClient>) -> Self {
        Self { db, media }
    }

    /// Run the catalog query contract: filter, count, then fetch one page
    /// ordered newest first.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: CatalogQuery) -> Result<CatalogPage, ServiceError> {
        let mut db_query = Product::find().filter(product::Column::IsActive.eq(query.is_active));

        if let Some(raw) = query.category.as_deref().filter(|raw| !raw.is_empty()) {
            match Category::parse(raw) {
                Some(category) => {
                    db_query = db_query.filter(product::Column::Category.eq(category));
                }
                // An unknown category is an exact-match miss, not an error.
                None => return Ok(CatalogPage::empty(&query)),
            }
        }

        if let Some(featured) = query.featured {
            db_query = db_query.filter(product::Column::Featured.eq(featured));
        }

        db_query = db_query
            .filter(product::Column::Price.gte(query.min_price))
            .filter(product::Column::Price.lte(query.max_price));

        if let Some(needle) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        {
            let pattern = format!("%{}%", needle.to_lowercase());
            db_query = db_query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            product::Entity,
                            product::Column::Name,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            product::Entity,
                            product::Column::Description,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            product::Entity,
                            product::Column::Tags,
                        ))))
                        .like(pattern),
                    ),
            );
        }

        let total = db_query.clone().count(&*self.db).await?;
        let pages = total_pages(total, query.limit);

        let products = db_query
            .order_by_desc(product::Column::CreatedAt)
            .limit(query.limit)
            .offset(query.page.saturating_sub(1) * query.limit)
            .all(&*self.db)
            .await?;

        Ok(CatalogPage {
            products,
            current: query.page,
            pages,
            total,
        })
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    /// Distinct category values among currently active products, used to
    /// populate the filter UI.
    #[instrument(skip(self))]
    pub async fn active_categories(&self) -> Result<Vec<String>, ServiceError> {
        Product::find()
            .select_only()
            .column(product::Column::Category)
            .filter(product::Column::IsActive.eq(true))
            .distinct()
            .into_tuple::<String>()
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Create a new product
    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let product_id = Uuid::new_v4();
        let now = Utc::now();

        let model = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            category: Set(input.category),
            stock: Set(input.stock),
            tags: Set(product::join_tags(&input.tags)),
            featured: Set(input.featured),
            images: Set(serde_json::to_value(&input.images)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            is_active: Set(true),
            created_by: Set(input.created_by),
            updated_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(&*self.db).await?;
        info!("Created product: {}", product_id);
        Ok(created)
    }

    /// Update a product: full replace of the mutable fields; the stored
    /// image set is only replaced when a new one was uploaded.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let existing = self.get_product(product_id).await?;
        let mut active: product::ActiveModel = existing.into();

        active.name = Set(input.name);
        active.description = Set(input.description);
        active.price = Set(input.price);
        active.category = Set(input.category);
        active.stock = Set(input.stock);
        active.tags = Set(product::join_tags(&input.tags));
        active.featured = Set(input.featured);
        active.is_active = Set(input.is_active);
        if let Some(images) = input.images {
            active.images = Set(serde_json::to_value(&images)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?);
        }
        active.updated_by = Set(Some(input.updated_by));
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        info!("Updated product: {}", product_id);
        Ok(updated)
    }

    /// Delete a product and its stored images. Image deletion is issued
    /// concurrently and is best-effort: a CDN failure is logged, never
    /// surfaced, and never blocks removal of the record.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_product(product_id).await?;

        let images = existing.image_refs();
        if !images.is_empty() {
            let deletions = images
                .iter()
                .map(|image| self.media.destroy(MediaKind::Image, &image.public_id));
            for (image, result) in images.iter().zip(join_all(deletions).await) {
                if let Err(err) = result {
                    warn!(public_id = %image.public_id, error = %err, "failed to delete stored image");
                }
            }
        }

        existing.delete(&*self.db).await?;
        info!("Deleted product: {}", product_id);
        Ok(())
    }
}

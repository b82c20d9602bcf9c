use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, CurrentUser};
use crate::clients::MediaKind;
use crate::entities::{Category, ProductImage, ProductModel};
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, MessageResponse, PaginationMeta};
use crate::handlers::common::{parse_limit, parse_or, parse_page};
use crate::handlers::uploads::{self, IMAGE_POLICY, PRODUCT_BODY_LIMIT};
use crate::services::catalog::{
    max_price_sentinel, CatalogQuery, CreateProductInput, UpdateProductInput, PUBLIC_PAGE_SIZE,
};
use crate::services::users::UserBrief;
use crate::AppState;

/// Creates the router for product endpoints
pub fn products_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_products))
        .route("/categories", get(list_categories))
        .route("/:id", get(get_product))
        .with_optional_auth(state.clone());

    let admin = Router::new()
        .route("/", post(create_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
        .layer(DefaultBodyLimit::max(PRODUCT_BODY_LIMIT))
        .with_admin(state);

    public.merge(admin)
}

// Request/Response DTOs

/// Catalog listing filters. Numeric fields arrive as raw strings so a
/// malformed value can fall back to its default instead of failing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(default, rename = "maxPrice")]
    pub max_price: Option<String>,
    #[serde(default)]
    pub featured: Option<String>,
    #[serde(default, rename = "isActive")]
    pub is_active: Option<String>,
}

impl ProductListParams {
    /// Resolve raw parameters into the catalog query contract.
    pub fn into_query(self) -> CatalogQuery {
        CatalogQuery {
            page: parse_page(self.page.as_deref()),
            limit: parse_limit(self.limit.as_deref(), PUBLIC_PAGE_SIZE),
            search: self.search.filter(|s| !s.trim().is_empty()),
            category: self.category.filter(|c| !c.trim().is_empty()),
            min_price: parse_or(self.min_price.as_deref(), Decimal::ZERO),
            max_price: parse_or(self.max_price.as_deref(), max_price_sentinel()),
            featured: self
                .featured
                .as_deref()
                .map(str::trim)
                .filter(|raw| !raw.is_empty())
                .map(|raw| raw == "true"),
            is_active: parse_or(self.is_active.as_deref(), true),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "550e8400-e29b-41d4-a716-446655440000",
    "name": "Widget",
    "description": "A dependable widget.",
    "price": "9.99",
    "category": "Electronics",
    "stock": 3,
    "tags": ["gadget", "sale"],
    "featured": false,
    "images": [{ "url": "https://cdn.example.com/widget.jpg", "public_id": "vendora/products/widget", "alt": "Widget" }],
    "is_active": true,
    "created_at": "2024-12-09T10:30:00Z",
    "updated_at": "2024-12-09T10:30:00Z"
}))]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub stock: i32,
    pub tags: Vec<String>,
    pub featured: bool,
    pub images: Vec<ProductImage>,
    pub is_active: bool,
    /// Creator display name, joined at response time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserBrief>,
    /// Updater display name, only joined on detail views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserBrief>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    fn from_model(
        model: ProductModel,
        briefs: &HashMap<Uuid, UserBrief>,
        include_updater: bool,
    ) -> Self {
        let created_by = briefs.get(&model.created_by).cloned();
        let updated_by = if include_updater {
            model.updated_by.and_then(|id| briefs.get(&id).cloned())
        } else {
            None
        };

        Self {
            id: model.id,
            name: model.name.clone(),
            description: model.description.clone(),
            price: model.price,
            category: model.category,
            stock: model.stock,
            tags: model.tag_list(),
            featured: model.featured,
            images: model.image_refs(),
            is_active: model.is_active,
            created_by,
            updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub pagination: PaginationMeta,
}

/// Mutable product fields extracted from a multipart form.
#[derive(Debug)]
struct ProductFormFields {
    name: String,
    description: String,
    price: Decimal,
    category: Category,
    stock: i32,
    tags: Vec<String>,
    featured: bool,
    is_active: bool,
}

fn parse_product_form(form: &uploads::ParsedForm) -> Result<ProductFormFields, ServiceError> {
    let name = form.require_field("name")?.to_string();
    let description = form.require_field("description")?.to_string();

    let price_raw = form.require_field("price")?;
    let price: Decimal = price_raw
        .parse()
        .map_err(|_| ServiceError::ValidationError("price must be a number".to_string()))?;
    if price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "price cannot be negative".to_string(),
        ));
    }

    let category_raw = form.require_field("category")?;
    let category = Category::parse(category_raw).ok_or_else(|| {
        ServiceError::ValidationError(format!("Unknown category: {category_raw}"))
    })?;

    let stock = parse_or(form.field("stock"), 0);
    if stock < 0 {
        return Err(ServiceError::ValidationError(
            "stock cannot be negative".to_string(),
        ));
    }

    let tags = form
        .field("tags")
        .map(crate::entities::product::split_tags)
        .unwrap_or_default();

    let featured = form.field("featured").map(str::trim) == Some("true");
    let is_active = form
        .field("isActive")
        .map(|raw| raw.trim() != "false")
        .unwrap_or(true);

    Ok(ProductFormFields {
        name,
        description,
        price,
        category,
        stock,
        tags,
        featured,
        is_active,
    })
}

// Handler functions

/// Filtered, paginated catalog listing
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Catalog page", body = ProductListResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<axum::response::Response, ServiceError> {
    let page = state.services.catalog.search_products(params.into_query()).await?;

    let creator_ids: Vec<Uuid> = page.products.iter().map(|p| p.created_by).collect();
    let briefs = state.services.users.display_briefs(&creator_ids).await?;

    let products = page
        .products
        .into_iter()
        .map(|model| ProductResponse::from_model(model, &briefs, false))
        .collect();

    Ok(success_response(ProductListResponse {
        products,
        pagination: PaginationMeta {
            current: page.current,
            pages: page.pages,
            total: page.total,
        },
    }))
}

/// Distinct categories among active products
#[utoipa::path(
    get,
    path = "/api/products/categories",
    responses(
        (status = 200, description = "Active category values", body = Vec<String>)
    ),
    tag = "Products"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<axum::response::Response, ServiceError> {
    let categories = state.services.catalog.active_categories().await?;
    Ok(success_response(categories))
}

/// Single product detail
#[utoipa::path(
    get,
    path = "/api/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product detail", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, ServiceError> {
    let product = state.services.catalog.get_product(id).await?;

    let mut ids = vec![product.created_by];
    ids.extend(product.updated_by);
    let briefs = state.services.users.display_briefs(&ids).await?;

    Ok(success_response(ProductResponse::from_model(
        product, &briefs, true,
    )))
}

/// Create a product from a multipart form with up to 5 images
#[utoipa::path(
    post,
    path = "/api/products",
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn create_product(
    user: CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<axum::response::Response, ServiceError> {
    let form = uploads::read_form(&mut multipart, &IMAGE_POLICY).await?;
    let fields = parse_product_form(&form)?;

    // Files are uploaded sequentially; a CDN failure aborts the create.
    let mut images = Vec::with_capacity(form.files.len());
    for file in &form.files {
        let stored = state
            .media
            .upload(
                MediaKind::Image,
                &file.filename,
                &file.content_type,
                file.data.clone(),
            )
            .await?;
        images.push(ProductImage {
            url: stored.url,
            public_id: stored.public_id,
            alt: fields.name.clone(),
        });
    }

    let product = state
        .services
        .catalog
        .create_product(CreateProductInput {
            name: fields.name,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            stock: fields.stock,
            tags: fields.tags,
            featured: fields.featured,
            images,
            created_by: user.id(),
        })
        .await?;

    let briefs = state
        .services
        .users
        .display_briefs(&[product.created_by])
        .await?;

    Ok(created_response(ProductResponse::from_model(
        product, &briefs, false,
    )))
}

/// Update a product; the image set is replaced only when new files are sent
#[utoipa::path(
    put,
    path = "/api/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn update_product(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<axum::response::Response, ServiceError> {
    let form = uploads::read_form(&mut multipart, &IMAGE_POLICY).await?;
    let fields = parse_product_form(&form)?;

    let images = if form.files.is_empty() {
        None
    } else {
        let mut uploaded = Vec::with_capacity(form.files.len());
        for file in &form.files {
            let stored = state
                .media
                .upload(
                    MediaKind::Image,
                    &file.filename,
                    &file.content_type,
                    file.data.clone(),
                )
                .await?;
            uploaded.push(ProductImage {
                url: stored.url,
                public_id: stored.public_id,
                alt: fields.name.clone(),
            });
        }
        Some(uploaded)
    };

    let product = state
        .services
        .catalog
        .update_product(
            id,
            UpdateProductInput {
                name: fields.name,
                description: fields.description,
                price: fields.price,
                category: fields.category,
                stock: fields.stock,
                tags: fields.tags,
                featured: fields.featured,
                is_active: fields.is_active,
                images,
                updated_by: user.id(),
            },
        )
        .await?;

    let mut ids = vec![product.created_by];
    ids.extend(product.updated_by);
    let briefs = state.services.users.display_briefs(&ids).await?;

    Ok(success_response(ProductResponse::from_model(
        product, &briefs, true,
    )))
}

/// Delete a product and its stored images
#[utoipa::path(
    delete,
    path = "/api/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, ServiceError> {
    state.services.catalog.delete_product(id).await?;
    Ok(success_response(MessageResponse::new(
        "Product deleted successfully",
    )))
}

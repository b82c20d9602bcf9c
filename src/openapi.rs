use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vendora API",
        version = "0.1.0",
        description = r#"
# Vendora Administration API

REST backend for the Vendora e-commerce administration system: product
catalog, user directory, and promotional hero video management.

## Authentication

Authentication is delegated to the identity provider. Include its bearer
token in the Authorization header:

```
Authorization: Bearer <token>
```

The local user record is materialized on first sight of a verified token.
Admin-only endpoints require the bound user to carry the `admin` role and
an active account.

## Errors

Every error response is a JSON object with an `error` string:

```json
{ "error": "Product not found" }
```

## Pagination

List endpoints accept `page` and `limit` query parameters and return a
`pagination` object with `current`, `pages` (ceil(total / limit)) and
`total`. Malformed numeric parameters fall back to their defaults.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Catalog listing and product management"),
        (name = "Users", description = "User directory and identity binding"),
        (name = "HeroVideos", description = "Promotional hero video management"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::list_categories,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Users
        crate::handlers::users::current_user,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,

        // Hero videos
        crate::handlers::hero_videos::get_active_video,
        crate::handlers::hero_videos::list_videos,
        crate::handlers::hero_videos::create_video,
        crate::handlers::hero_videos::update_video,
        crate::handlers::hero_videos::toggle_video,
        crate::handlers::hero_videos::delete_video,

        // Health
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            // Common types
            crate::handlers::common::MessageResponse,
            crate::handlers::common::PaginationMeta,
            crate::errors::ErrorResponse,

            // Product types
            crate::handlers::products::ProductResponse,
            crate::handlers::products::ProductListResponse,
            crate::entities::Category,
            crate::entities::ProductImage,

            // User types
            crate::handlers::users::UserResponse,
            crate::handlers::users::UserListResponse,
            crate::handlers::users::UpdateUserRequest,
            crate::entities::UserRole,
            crate::services::users::UserBrief,

            // Hero video types
            crate::handlers::hero_videos::HeroVideoResponse,
            crate::handlers::hero_videos::VideoListResponse,
            crate::handlers::hero_videos::ToggleVideoRequest,
            crate::entities::OverlayText,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
